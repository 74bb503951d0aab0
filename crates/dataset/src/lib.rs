//! deptscan-dataset: keyed string tables over CSV, with the two write
//! disciplines the pipeline relies on.
//!
//! [`safe_merge`] appends and refuses key collisions (conflicts are
//! reported, never silently resolved); [`update_in_place`] overwrites and
//! refuses insertion. The asymmetry is deliberate: merges grow the dataset,
//! updates enrich rows that already exist.

pub mod batch;
pub mod error;
pub mod merge;
pub mod store;
pub mod table;
pub mod update;

pub use batch::pending_rows;
pub use error::DatasetError;
pub use merge::{safe_merge, MergeOutcome};
pub use store::{read_table, write_conflicts, write_table, RunLock};
pub use table::Table;
pub use update::{update_in_place, UpdateStats};
