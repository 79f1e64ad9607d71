//! Mirror errors

use thiserror::Error;

/// Errors from reading the mirrored log files
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed log line: {0}")]
    Malformed(#[from] serde_json::Error),
}
