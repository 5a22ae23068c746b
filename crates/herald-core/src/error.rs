//! Error types for the herald core library

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HeraldError>;

#[derive(Error, Debug)]
pub enum HeraldError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("unknown agent kind: {0}")]
    UnknownAgent(String),

    #[error("malformed session descriptor: {0}")]
    MalformedDescriptor(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("abstract socket names are not supported on this platform")]
    AbstractUnsupported,
}
