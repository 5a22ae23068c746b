//! Herald Core - Shared types, broker wire protocol, and client configuration
//!
//! This crate provides the data model and the versioned wire contract spoken
//! between the `herald` client and the session broker daemon, plus the pure
//! shell-export formatting used to project a session into an environment.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod exports;
pub mod protocol;
pub mod types;

pub use config::Config;
pub use endpoint::Endpoint;
pub use error::HeraldError as Error;
pub use error::{HeraldError, Result};
pub use exports::{fish_exports, sh_exports};
pub use protocol::{BrokerRequest, BrokerResponse, PROTOCOL_VERSION};
pub use types::{AgentKind, FingerprintRecord, SessionDescriptor, SessionStatus};

/// Environment variable overriding the broker endpoint.
pub const SOCKET_ENV: &str = "HERALD_SOCKET";

/// Environment variable overriding the client config file path.
pub const CONFIG_ENV: &str = "HERALD_CONFIG";
