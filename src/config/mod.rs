//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calculate::DEFAULT_CONSISTENCY_MIN_GAMES;
use crate::shaper::DEFAULT_VALUE_DECIMALS;

/// Prefix of environment overrides, e.g. `LEAGUE_STATS__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "LEAGUE_STATS";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to load layered config: {0}")]
    LayerError(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Stat computation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Minimum completed games for the consistency stat
    #[serde(default = "default_consistency_min_games")]
    pub consistency_min_games: u32,

    /// Rank anonymous seats as individual players
    #[serde(default)]
    pub include_anonymous: bool,

    /// Decimal places in formatted values
    #[serde(default = "default_value_decimals")]
    pub value_decimals: u32,
}

fn default_consistency_min_games() -> u32 {
    DEFAULT_CONSISTENCY_MIN_GAMES
}

fn default_value_decimals() -> u32 {
    DEFAULT_VALUE_DECIMALS
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            consistency_min_games: default_consistency_min_games(),
            include_anonymous: false,
            value_decimals: default_value_decimals(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub stats: StatsConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            server: ServerConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load an optional TOML file with `LEAGUE_STATS__*` environment overrides on top.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_layered(path, None)
    }

    /// `env` replaces the process environment when given.
    fn load_layered(
        path: &Path,
        env: Option<::config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let layered = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: AppConfig = layered.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.stats.consistency_min_games < 2 {
            return Err(ConfigError::ValidationError(
                "Consistency needs at least 2 games for a standard deviation".to_string(),
            ));
        }

        if self.stats.value_decimals > 10 {
            return Err(ConfigError::ValidationError(
                "Value decimals must be at most 10".to_string(),
            ));
        }

        Ok(())
    }
}
