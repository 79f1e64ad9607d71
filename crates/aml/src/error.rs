//! Flag register errors

use thiserror::Error;

/// Errors from the flag register
#[derive(Debug, Error)]
pub enum FlagError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Flag type cannot be empty")]
    EmptyFlagType,
}
