use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Action must have {expected} elements, got {got}")]
    ActionLength { expected: usize, got: usize },
    #[error("Expected {expected} actions (one per agent), got {got}")]
    ActionCount { expected: usize, got: usize },
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
