use std::fmt;

#[derive(Debug)]
pub enum DatasetError {
    /// The key column is absent from one of the tables.
    MissingKeyColumn { table: String, column: String },
    /// CSV read/parse/write error.
    Csv(String),
    /// IO error with path context.
    Io { path: String, message: String },
    /// Another run holds the lock file.
    Locked { path: String },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKeyColumn { table, column } => {
                write!(f, "table '{table}': missing key column '{column}'")
            }
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Io { path, message } => write!(f, "IO error at '{path}': {message}"),
            Self::Locked { path } => {
                write!(
                    f,
                    "lock file '{path}' exists; another run is in progress (delete it if stale)"
                )
            }
        }
    }
}

impl std::error::Error for DatasetError {}
