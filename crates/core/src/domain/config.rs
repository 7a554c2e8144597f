//! Client configuration
//!
//! This module provides:
//! - Daemon address (host/port) with the historical `localhost:56065` default
//! - Accepted ranges for volume and balance values
//! - Extra alias tokens per operation
//! - Loading from `~/.config/jmctl/config.toml` or an explicit path

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::domain::grammar::Limits;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 56065;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where the mixer daemon listens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub host: String,
    pub port: u16,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl DaemonConfig {
    /// `host:port` string for connecting
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Complete client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub daemon: DaemonConfig,
    pub limits: Limits,
    /// Extra tokens keyed by canonical operation name (`volume`, `is-mono`, ...)
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl ClientConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    #[instrument(skip(path))]
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = fs::read_to_string(path).await.map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents)?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Reject values the grammar could never satisfy
    pub fn validate(&self) -> Result<()> {
        if self.daemon.host.trim().is_empty() {
            return Err(ConfigError::Invalid("daemon.host must not be empty".to_string()));
        }
        if self.daemon.port == 0 {
            return Err(ConfigError::Invalid("daemon.port must not be 0".to_string()));
        }
        for (key, range) in [("volume", self.limits.volume), ("balance", self.limits.balance)] {
            if !range.is_valid() {
                return Err(ConfigError::Invalid(format!(
                    "limits.{key} must be [min, max] with finite min <= max"
                )));
            }
        }
        Ok(())
    }
}

/// Locates and loads the configuration file
pub struct ConfigManager {
    config_path: PathBuf,
    explicit: bool,
}

impl ConfigManager {
    /// Manager for the default location, `<config_dir>/jmctl/config.toml`
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_path: config_dir.join("config.toml"),
            explicit: false,
        }
    }

    /// Manager for a file the user named; a missing file is an error
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            explicit: true,
        }
    }

    /// Default config directory
    ///
    /// Returns `~/.config/jmctl` on Linux
    /// Returns `%APPDATA%\jmctl` on Windows
    pub fn default_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("jmctl"))
            .ok_or_else(|| ConfigError::Invalid("Could not determine config directory".to_string()))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the configuration.
    ///
    /// A missing file at the default location yields the defaults. A missing
    /// explicit file and any unreadable or invalid file are errors.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<ClientConfig> {
        if !self.explicit && !self.config_path.exists() {
            debug!(
                path = %self.config_path.display(),
                "Config file not found, using defaults"
            );
            return Ok(ClientConfig::default());
        }

        ClientConfig::load_from_file(&self.config_path).await
    }
}
