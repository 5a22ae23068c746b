//! Broker client with the session status policy

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use herald_core::{
    AgentKind, BrokerRequest, BrokerResponse, Config, Endpoint, SessionDescriptor, SessionStatus,
};

use crate::error::{ClientError, Result};

/// Client for the session broker.
///
/// One instance performs one request/response round trip per call; there is
/// no connection reuse and no retry. The broker is always-reachable
/// infrastructure, so a transport failure is surfaced immediately rather
/// than masked by fallbacks.
pub struct BrokerClient {
    endpoint: Endpoint,
}

impl BrokerClient {
    /// Create a client for an explicit endpoint.
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    /// Create a client for the endpoint resolved from environment and config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Endpoint::resolve(config))
    }

    /// Fetch the session for `kind`, asking the broker to start an agent if
    /// `start` is set and none is running.
    ///
    /// Status policy:
    /// - `Running` / `FirstRun` are returned for use; `FirstRun` tells the
    ///   caller a fresh agent was just started.
    /// - `Stopped` is returned so the caller can finish as a clean no-op.
    /// - `BadUser` fails with [`ClientError::Unauthorized`].
    /// - `Failed` fails with [`ClientError::AgentStartFailed`]; the broker
    ///   keeps the startup detail in its own log.
    pub async fn acquire(&self, kind: AgentKind, start: bool) -> Result<SessionDescriptor> {
        let session = self.round_trip(BrokerRequest::acquire(kind, start)).await?;
        debug!(status = ?session.status, kind = %session.kind, pid = session.pid, "session reply");

        match session.status {
            SessionStatus::BadUser => Err(ClientError::Unauthorized),
            SessionStatus::Failed => Err(ClientError::AgentStartFailed),
            SessionStatus::Running | SessionStatus::FirstRun => {
                session
                    .validate()
                    .map_err(|e| ClientError::Transport(e.to_string()))?;
                Ok(session)
            }
            SessionStatus::Stopped => Ok(session),
        }
    }

    /// One request line out, one response line back.
    async fn round_trip(&self, request: BrokerRequest) -> Result<SessionDescriptor> {
        let stream = self.endpoint.connect().await.map_err(|e| {
            ClientError::Transport(format!("cannot reach broker at {}: {e}", self.endpoint))
        })?;
        let (reader, mut writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(reader);

        let json = serde_json::to_string(&request)
            .map_err(|e| ClientError::Transport(format!("encode request: {e}")))?;
        writer
            .write_all(json.as_bytes())
            .await
            .map_err(transport_io)?;
        writer.write_all(b"\n").await.map_err(transport_io)?;
        writer.flush().await.map_err(transport_io)?;

        let mut line = String::new();
        let read = reader.read_line(&mut line).await.map_err(transport_io)?;
        if read == 0 {
            return Err(ClientError::Transport(
                "broker closed the connection without replying".to_string(),
            ));
        }

        match serde_json::from_str(&line) {
            Ok(BrokerResponse::Session(session)) => Ok(session),
            Ok(BrokerResponse::Error { message }) => {
                Err(ClientError::Transport(format!("broker refused: {message}")))
            }
            Err(e) => Err(ClientError::Transport(format!("malformed reply: {e}"))),
        }
    }
}

fn transport_io(e: std::io::Error) -> ClientError {
    ClientError::Transport(e.to_string())
}
