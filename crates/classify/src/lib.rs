//! deptscan-classify: deterministic role/department classification over
//! short biography snippets.
//!
//! Pure engine crate. Rule tables ([`RuleSet`]) and the precision whitelist
//! ([`DepartmentWhitelist`]) are built once and injected by reference into
//! [`Classifier`]; classification itself does no I/O and never fails.

pub mod engine;
pub mod error;
pub mod model;
pub mod rules;
pub mod whitelist;

pub use engine::Classifier;
pub use error::ClassifyError;
pub use model::{
    Classification, KeywordMatch, PatternTier, RoleFlag, RoleFlags, TextualMatch,
    DERIVED_COLUMNS, MISSING,
};
pub use rules::RuleSet;
pub use whitelist::DepartmentWhitelist;
