use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty store list, duplicate store, etc.).
    ConfigValidation(String),
    /// No row in the grid contains the anchor token.
    LayoutNotFound { anchor: String },
    /// A report was requested for an empty suggestion set.
    EmptyReport,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::LayoutNotFound { anchor } => write!(
                f,
                "store layout not found: no row contains '{anchor}' (expected the store header row)"
            ),
            Self::EmptyReport => {
                write!(f, "no suggestions available to export; process a spreadsheet first")
            }
        }
    }
}

impl std::error::Error for EngineError {}
