use std::fmt;

#[derive(Debug)]
pub enum ClassifyError {
    /// TOML parse / deserialization error in a rules file.
    ConfigParse(String),
    /// Rules validation error (empty tier, empty keyword list, unknown flag).
    ConfigValidation(String),
    /// A regex in a rules file failed to compile.
    PatternCompile { pattern: String, message: String },
    /// A pattern must carry exactly one capturing group.
    PatternCaptures { pattern: String, groups: usize },
    /// Whitelist side file could not be read.
    WhitelistRead { path: String, message: String },
    /// Whitelist side file is not valid, or the curated import is malformed.
    WhitelistParse(String),
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "rules parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "rules validation error: {msg}"),
            Self::PatternCompile { pattern, message } => {
                write!(f, "pattern '{pattern}' does not compile: {message}")
            }
            Self::PatternCaptures { pattern, groups } => {
                write!(
                    f,
                    "pattern '{pattern}' has {groups} capturing group(s), expected exactly 1"
                )
            }
            Self::WhitelistRead { path, message } => {
                write!(f, "cannot read whitelist '{path}': {message}")
            }
            Self::WhitelistParse(msg) => write!(f, "whitelist error: {msg}"),
        }
    }
}

impl std::error::Error for ClassifyError {}
