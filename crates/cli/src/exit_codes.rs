//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                                  |
//! |---------|-----------|----------------------------------------------|
//! | 0       | Universal | Success                                      |
//! | 1       | Universal | General error (unspecified)                  |
//! | 2       | Universal | CLI usage error (bad args, missing file)     |
//! | 3-9     | dataset   | Table/merge/update/store codes               |
//! | 10-19   | classify  | Rules and whitelist codes                    |
//! | 20-29   | pipeline  | Config-driven run codes                      |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use deptscan_classify::ClassifyError;
use deptscan_dataset::DatasetError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Dataset (3-9)
// =============================================================================

/// The key column is absent from an input table.
pub const EXIT_DATA_MISSING_KEY: u8 = 3;

/// CSV parse error reading or writing a table.
pub const EXIT_DATA_PARSE: u8 = 4;

/// File IO error (missing file, permission, disk).
pub const EXIT_DATA_IO: u8 = 5;

/// Lock file held - another run is in progress.
pub const EXIT_DATA_LOCKED: u8 = 6;

// =============================================================================
// Classify (10-19)
// =============================================================================

/// Rules file failed to parse or validate (bad regex, wrong group count).
pub const EXIT_RULES_INVALID: u8 = 10;

/// Whitelist side file missing, unreadable, or malformed.
pub const EXIT_WHITELIST_INVALID: u8 = 11;

// =============================================================================
// Pipeline (20-29)
// =============================================================================

/// Pipeline config failed to parse or validate.
pub const EXIT_PIPELINE_CONFIG: u8 = 20;

/// Pipeline step failed at runtime.
pub const EXIT_PIPELINE_RUNTIME: u8 = 21;

/// Map a DatasetError to its exit code.
pub fn dataset_exit_code(err: &DatasetError) -> u8 {
    match err {
        DatasetError::MissingKeyColumn { .. } => EXIT_DATA_MISSING_KEY,
        DatasetError::Csv(_) => EXIT_DATA_PARSE,
        DatasetError::Io { .. } => EXIT_DATA_IO,
        DatasetError::Locked { .. } => EXIT_DATA_LOCKED,
    }
}

/// Map a ClassifyError to its exit code.
pub fn classify_exit_code(err: &ClassifyError) -> u8 {
    match err {
        ClassifyError::ConfigParse(_)
        | ClassifyError::ConfigValidation(_)
        | ClassifyError::PatternCompile { .. }
        | ClassifyError::PatternCaptures { .. } => EXIT_RULES_INVALID,
        ClassifyError::WhitelistRead { .. } | ClassifyError::WhitelistParse(_) => {
            EXIT_WHITELIST_INVALID
        }
    }
}
