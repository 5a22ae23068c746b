//! Broker endpoint resolution and transport
//!
//! The broker listens on a unix-domain socket. The endpoint is written as a
//! filesystem path, or with a leading `@` to name a socket in the Linux
//! abstract namespace. Resolution order: `HERALD_SOCKET` environment
//! variable, then the config file, then the runtime-dir default.

use std::fmt;
use std::path::PathBuf;

use tokio::net::UnixStream;

use crate::config::Config;
use crate::error::Result;
use crate::SOCKET_ENV;

/// A broker listening endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// A socket bound to a filesystem path.
    Path(PathBuf),

    /// A socket in the Linux abstract namespace, spelled `@name`.
    Abstract(String),
}

impl Endpoint {
    /// Parse an endpoint spec; a leading `@` selects the abstract namespace.
    pub fn parse(spec: &str) -> Self {
        match spec.strip_prefix('@') {
            Some(name) => Endpoint::Abstract(name.to_string()),
            None => Endpoint::Path(PathBuf::from(spec)),
        }
    }

    /// Resolve the endpoint for this invocation: `HERALD_SOCKET` overrides
    /// the configured spec.
    pub fn resolve(config: &Config) -> Self {
        match std::env::var(SOCKET_ENV) {
            Ok(spec) if !spec.is_empty() => Endpoint::parse(&spec),
            _ => Endpoint::parse(&config.broker_socket),
        }
    }

    /// Default endpoint spec: the user runtime dir, falling back to /tmp.
    pub fn default_spec() -> String {
        std::env::var_os("XDG_RUNTIME_DIR")
            .map(|dir| {
                PathBuf::from(dir)
                    .join("herald.sock")
                    .to_string_lossy()
                    .into_owned()
            })
            .unwrap_or_else(|| "/tmp/herald.sock".to_string())
    }

    /// Open a connection to the broker.
    pub async fn connect(&self) -> Result<UnixStream> {
        match self {
            Endpoint::Path(path) => Ok(UnixStream::connect(path).await?),
            Endpoint::Abstract(name) => connect_abstract(name).await,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Path(path) => write!(f, "{}", path.display()),
            Endpoint::Abstract(name) => write!(f, "@{name}"),
        }
    }
}

#[cfg(target_os = "linux")]
async fn connect_abstract(name: &str) -> Result<UnixStream> {
    use std::os::linux::net::SocketAddrExt;

    let addr = std::os::unix::net::SocketAddr::from_abstract_name(name.as_bytes())?;
    let stream = std::os::unix::net::UnixStream::connect_addr(&addr)?;
    stream.set_nonblocking(true)?;
    Ok(UnixStream::from_std(stream)?)
}

#[cfg(not(target_os = "linux"))]
async fn connect_abstract(_name: &str) -> Result<UnixStream> {
    Err(crate::error::HeraldError::AbstractUnsupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_at_selects_abstract_namespace() {
        assert_eq!(
            Endpoint::parse("@herald"),
            Endpoint::Abstract("herald".to_string())
        );
        assert_eq!(
            Endpoint::parse("/run/user/1000/herald.sock"),
            Endpoint::Path(PathBuf::from("/run/user/1000/herald.sock"))
        );
    }

    #[test]
    fn display_round_trips_the_spec() {
        for spec in ["@herald", "/tmp/herald.sock"] {
            assert_eq!(Endpoint::parse(spec).to_string(), spec);
        }
    }

    #[test]
    fn default_spec_names_a_herald_socket() {
        assert!(Endpoint::default_spec().ends_with("herald.sock"));
    }
}
