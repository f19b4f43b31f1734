use serde::{Deserialize, Serialize};
use std::path::Path;

use super::cache::CacheConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::upstream::UpstreamConfig;

const LOCAL_CONFIG_PATH: &str = "cachedns.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/cachedns/config.toml";

/// Main configuration structure for cachedns
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listening socket
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream resolver and forwarding timeout
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Cache lifetime and snapshot location
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. cachedns.toml in current directory
    /// 3. /etc/cachedns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else if Path::new(SYSTEM_CONFIG_PATH).exists() {
            Self::from_file(SYSTEM_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(upstream) = overrides.upstream {
            self.upstream.server = upstream;
        }
        if let Some(timeout_ms) = overrides.upstream_timeout_ms {
            self.upstream.timeout_ms = timeout_ms;
        }
        if let Some(ttl) = overrides.cache_ttl_secs {
            self.cache.ttl_secs = ttl;
        }
        if let Some(path) = overrides.snapshot_path {
            self.cache.snapshot_path = path;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }
        self.server.listen_addr()?;
        self.upstream.server_addr()?;

        if self.upstream.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Upstream timeout must be greater than 0".to_string(),
            ));
        }
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "Cache TTL must be greater than 0".to_string(),
            ));
        }
        if self.cache.snapshot_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Snapshot path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub upstream: Option<String>,
    pub upstream_timeout_ms: Option<u64>,
    pub cache_ttl_secs: Option<u64>,
    pub snapshot_path: Option<String>,
    pub log_level: Option<String>,
}
