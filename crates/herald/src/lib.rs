//! Herald - client for the shared authentication agent broker
//!
//! One long-lived ssh-agent or gpg-agent per user, owned by a broker
//! daemon; every shell session attaches to it through this client instead
//! of spawning and re-authenticating its own agent.

pub mod broker;
pub mod env;
pub mod error;
pub mod keys;
pub mod prompt;
pub mod signal;
pub mod unlock;

pub use broker::BrokerClient;
pub use error::{ClientError, Result};
