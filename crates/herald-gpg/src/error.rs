//! Error types for the control socket client

use thiserror::Error;

/// Result type alias for control socket operations
pub type Result<T> = std::result::Result<T, GpgError>;

/// Errors that can occur talking to a gpg-style agent
#[derive(Debug, Error)]
pub enum GpgError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected or truncated reply
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The agent answered a command with an ERR line
    #[error("agent error {code}: {reason}")]
    Agent { code: u32, reason: String },
}
