//! Core session types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HeraldError, Result};

/// Which flavour of authentication agent a session is backed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentKind {
    /// ssh-agent style: exposes only an authentication socket.
    Ssh,

    /// gpg-agent style: additionally exposes a control socket supporting
    /// passphrase caching and presetting.
    Gpg,

    /// Let the broker pick its configured default.
    Unspecified,
}

impl AgentKind {
    /// Human-readable name, matching the strings accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            AgentKind::Ssh => "ssh-agent",
            AgentKind::Gpg => "gpg-agent",
            AgentKind::Unspecified => "default",
        }
    }
}

impl FromStr for AgentKind {
    type Err = HeraldError;

    /// Parse an agent name as given on the command line or in the config
    /// file. Unrecognized names are rejected here, before any I/O happens.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ssh" | "ssh-agent" => Ok(AgentKind::Ssh),
            "gpg" | "gpg-agent" => Ok(AgentKind::Gpg),
            "default" => Ok(AgentKind::Unspecified),
            other => Err(HeraldError::UnknownAgent(other.to_string())),
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Authoritative session status shared by client and broker.
///
/// This is the single enumeration both sides are built against; the wire
/// encoding below is part of the versioned protocol contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// An agent is already running and the session is usable as-is.
    Running,

    /// A fresh agent was just started for this request.
    FirstRun,

    /// The requesting user is not entitled to this agent.
    BadUser,

    /// No session exists and the client asked the broker not to start one.
    Stopped,

    /// The broker could not bring up an agent.
    Failed,
}

impl SessionStatus {
    /// True for the statuses that come with a usable authentication socket.
    pub fn is_usable(&self) -> bool {
        matches!(self, SessionStatus::Running | SessionStatus::FirstRun)
    }
}

/// One agent session as reported by the broker.
///
/// Constructed fresh from a single request/response round trip and never
/// cached; the `pid` refers to the long-running shared agent and routinely
/// outlives the client process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescriptor {
    /// Process id of the backing agent, used only for signaling.
    pub pid: u32,

    /// Session status as decided by the broker.
    pub status: SessionStatus,

    /// The agent kind the broker actually resolved.
    pub kind: AgentKind,

    /// Path to the ssh-agent-compatible authentication socket.
    pub auth_sock: String,

    /// Path to the gpg-agent-compatible control socket; present only for
    /// gpg-style sessions.
    pub control_sock: Option<String>,
}

impl SessionDescriptor {
    /// Check the descriptor invariants for a decoded broker reply.
    ///
    /// A usable status must carry an authentication socket, and a control
    /// socket is only meaningful on a gpg-style session.
    pub fn validate(&self) -> Result<()> {
        if self.status.is_usable() && self.auth_sock.is_empty() {
            return Err(HeraldError::MalformedDescriptor(format!(
                "{:?} session without an authentication socket",
                self.status
            )));
        }
        if self.control_sock.is_some() && self.kind != AgentKind::Gpg {
            return Err(HeraldError::MalformedDescriptor(format!(
                "control socket on a {} session",
                self.kind
            )));
        }
        Ok(())
    }
}

/// Fingerprint of one key currently loaded in a gpg-style agent.
///
/// Produced fresh per unlock invocation; the inventory is an owned sequence
/// released when the caller drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintRecord(String);

impl FingerprintRecord {
    pub fn new(fingerprint: impl Into<String>) -> Self {
        Self(fingerprint.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FingerprintRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
