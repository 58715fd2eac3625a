//! Startup configuration: built-in defaults, an optional toml file from the
//! user config directory, and CLI/environment overrides on top. Immutable
//! once the session starts.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default EventServer UDP port.
pub const DEFAULT_PORT: u16 = 9777;
pub const DEFAULT_DEADZONE_PERCENT: u8 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Deadzone must be between 0 and 100 percent, got {0}")]
    DeadzoneOutOfRange(u8),
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub deadzone_percent: u8,
    pub device_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            deadzone_percent: DEFAULT_DEADZONE_PERCENT,
            device_name: format!("kodipad@{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Loads the config file if one exists, falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let Some(path) = Self::config_path() else {
            debug!("No config directory available, using defaults");
            return Ok(Self::default());
        };
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: Config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        info!("Loaded config from {:?}", path);
        config.validate()
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kodipad").join("config.toml"))
    }

    /// Applies CLI overrides. Explicit flags always win over the file.
    pub fn merge_cli(
        mut self,
        deadzone: Option<u8>,
        host: Option<String>,
        port: Option<u16>,
    ) -> Result<Self, ConfigError> {
        if let Some(deadzone) = deadzone {
            self.deadzone_percent = deadzone;
        }
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.deadzone_percent > 100 {
            return Err(ConfigError::DeadzoneOutOfRange(self.deadzone_percent));
        }
        Ok(self)
    }
}
