//! Broker wire protocol
//!
//! One JSON-encoded request line out, one JSON-encoded response line back,
//! then the connection is dropped. The byte layout is a versioned contract
//! between client and broker builds: every request carries
//! [`PROTOCOL_VERSION`] and a broker built against a different version
//! refuses the conversation with an error reply.

use serde::{Deserialize, Serialize};

use crate::types::{AgentKind, SessionDescriptor};

/// Version of the request/response encoding defined in this module.
pub const PROTOCOL_VERSION: u32 = 1;

/// Requests sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BrokerRequest {
    /// Obtain the session for `kind`, starting an agent if `start` is set
    /// and none is running.
    AcquireSession {
        version: u32,
        kind: AgentKind,
        start: bool,
    },
}

impl BrokerRequest {
    /// Build an acquire request for the current protocol version.
    pub fn acquire(kind: AgentKind, start: bool) -> Self {
        BrokerRequest::AcquireSession {
            version: PROTOCOL_VERSION,
            kind,
            start,
        }
    }
}

/// Replies sent by the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BrokerResponse {
    /// The session descriptor for this request; failures the broker can
    /// attribute to the session itself travel in the descriptor status.
    Session(SessionDescriptor),

    /// The broker refused the conversation (protocol mismatch, malformed
    /// request). Distinct from a `Failed` session status.
    Error { message: String },
}
