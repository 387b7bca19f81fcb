//! Mediator configuration loaded from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediatorConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Session identity and networking settings.
///
/// Values pass through the same sanitization as the programmatic setters
/// when applied, so a config file may carry a raw room name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub peer_name: Option<String>,
    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            service_type: None,
            peer_name: None,
            server_port: default_server_port(),
        }
    }
}

/// Native log forwarding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_true")]
    pub forward_native: bool,
    #[serde(default)]
    pub verbose: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            forward_native: true,
            verbose: false,
        }
    }
}

/// Configuration loading failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl MediatorConfig {
    /// Load configuration from the given path, or the default location.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path(),
        };

        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
                    path: config_path.clone(),
                    source,
                })?;
            let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: config_path.clone(),
                source,
            })?;
            info!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            info!("no config file found, using defaults");
            Ok(Self::default())
        }
    }
}

/// The default config directory path.
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("nearplay")
}

fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn default_server_port() -> u16 {
    7777
}

fn default_true() -> bool {
    true
}
