//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::endpoint::Endpoint;
use crate::error::{HeraldError, Result};
use crate::types::AgentKind;
use crate::CONFIG_ENV;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Broker endpoint spec; a leading `@` names an abstract socket.
    pub broker_socket: String,

    /// Agent kind requested when none is given on the command line.
    pub default_agent: AgentKind,

    /// ssh-add-compatible program used for key adding and listing.
    pub ssh_add_program: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            broker_socket: Endpoint::default_spec(),
            default_agent: AgentKind::Unspecified,
            ssh_add_program: PathBuf::from("ssh-add"),
        }
    }
}

impl Config {
    /// Default config file location, honoring the `HERALD_CONFIG` override.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("/etc"))
                    .join("herald")
                    .join("client.json")
            })
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| HeraldError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load the config at the default location, falling back to defaults
    /// when no file exists.
    pub fn load_or_default() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Helper module for dirs crate functionality
mod dirs {
    use std::path::PathBuf;

    pub fn config_dir() -> Option<PathBuf> {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_runtime_socket() {
        let config = Config::default();
        assert!(config.broker_socket.ends_with("herald.sock"));
        assert_eq!(config.default_agent, AgentKind::Unspecified);
        assert_eq!(config.ssh_add_program, PathBuf::from("ssh-add"));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");

        let mut config = Config::default();
        config.broker_socket = "@herald-test".to_string();
        config.default_agent = AgentKind::Gpg;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.broker_socket, "@herald-test");
        assert_eq!(loaded.default_agent, AgentKind::Gpg);
    }

    #[test]
    fn malformed_config_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");
        std::fs::write(&path, "not json").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, HeraldError::Config(_)));
    }
}
