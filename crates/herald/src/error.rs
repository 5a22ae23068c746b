//! Error types for client operations

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced to the invoking shell. None of these are retried
/// internally; each one ends the invocation with a diagnostic.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The broker could not be reached or answered out of contract
    #[error("broker transport error: {0}")]
    Transport(String),

    /// The broker refused this principal
    #[error("connection rejected, user is unauthorized to use this agent")]
    Unauthorized,

    /// The broker could not bring up an agent; detail stays in its own log
    #[error("agent failed to start, check the broker's log")]
    AgentStartFailed,

    /// A passphrase preset was rejected; remaining fingerprints are skipped
    #[error("failed to unlock key '{fingerprint}'")]
    UnlockRejected { fingerprint: String },

    /// The external tool could not be executed
    #[error("failed to launch {program}: {source}")]
    DelegateLaunchFailed {
        program: String,
        source: std::io::Error,
    },

    /// Terminal mode change or password read failed
    #[error("prompt failed: {0}")]
    PromptFailed(String),

    /// The requested operation needs a gpg-style agent
    #[error("only the gpg agent supports this operation")]
    GpgOnly,

    /// Signaling the agent process failed
    #[error("failed to signal agent {pid}: {source}")]
    SignalFailed { pid: u32, source: std::io::Error },

    /// Home directory lookup failed while resolving key paths
    #[error("failed to determine the home directory")]
    NoHomeDir,

    /// Core error
    #[error("{0}")]
    Core(#[from] herald_core::HeraldError),

    /// Control socket error
    #[error("gpg agent: {0}")]
    Gpg(#[from] herald_gpg::GpgError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
