//! Herald GPG - Control socket client for gpg-style agents
//!
//! A gpg-style agent exposes a control socket next to its authentication
//! socket, speaking a line-oriented assuan-like protocol. This crate talks
//! to that socket directly (never through the broker) to notify the agent
//! of the controlling terminal, enumerate loaded key fingerprints, and
//! preset cached passphrases.

mod assuan;
mod client;
mod error;

pub use client::GpgClient;
pub use error::{GpgError, Result};
