use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A modality token that is neither position nor symbol.
    InvalidModality(String),
    /// Configuration that would make generation or scoring degenerate.
    InvalidConfig(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidModality(token) => write!(f, "invalid modality: {token:?}"),
            EngineError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

pub type Result<T> = std::result::Result<T, EngineError>;
