//! Runtime Configuration
//!
//! Where catalogs are read from, where events are published, and how the
//! pipeline logs. Defaults match the fixed locations of a standard node
//! deployment; each can be overridden from the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Directory holding the catalog and wallet files
pub const DEFAULT_CONFIG_DIR: &str = "~/workspace/arbitrage-config";

/// Local broker endpoint events are published to
pub const DEFAULT_ENDPOINT: &str = "redis+unix:///dev/shm/terracore.sock";

/// Frames buffered between the check path and the writer task
pub const DEFAULT_CHANNEL_CAPACITY: usize = 4096;

/// Maximum number of connection attempts at startup
pub const MAX_CONNECT_ATTEMPTS: u32 = 10;

/// Initial backoff delay between connection attempts
pub const INITIAL_BACKOFF_MS: u64 = 100;

/// Maximum backoff delay between connection attempts
pub const MAX_BACKOFF_MS: u64 = 30000;

pub const ENV_CONFIG_DIR: &str = "SENTINEL_CONFIG_DIR";
pub const ENV_ENDPOINT: &str = "SENTINEL_ENDPOINT";
pub const ENV_CHANNEL_CAPACITY: &str = "SENTINEL_CHANNEL_CAPACITY";
pub const ENV_LOG_LEVEL: &str = "SENTINEL_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "SENTINEL_LOG_JSON";

/// Errors that can occur while reading configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelConfig {
    /// Catalog directory, `~` allowed
    pub config_dir: String,
    /// Broker URL
    pub endpoint: String,
    pub channel_capacity: usize,
    pub max_connect_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub log: LogConfig,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            config_dir: DEFAULT_CONFIG_DIR.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_connect_attempts: MAX_CONNECT_ATTEMPTS,
            initial_backoff_ms: INITIAL_BACKOFF_MS,
            max_backoff_ms: MAX_BACKOFF_MS,
            log: LogConfig::default(),
        }
    }
}

impl SentinelConfig {
    /// Defaults with a different catalog directory
    pub fn with_config_dir(config_dir: impl Into<String>) -> Self {
        Self {
            config_dir: config_dir.into(),
            ..Default::default()
        }
    }

    /// Defaults overridden by `SENTINEL_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(dir) = lookup(ENV_CONFIG_DIR) {
            config.config_dir = dir;
        }
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            config.endpoint = endpoint;
        }
        if let Some(capacity) = lookup(ENV_CHANNEL_CAPACITY) {
            config.channel_capacity = parse(ENV_CHANNEL_CAPACITY, &capacity)?;
            if config.channel_capacity == 0 {
                return Err(ConfigError::InvalidValue {
                    key: ENV_CHANNEL_CAPACITY,
                    value: capacity,
                });
            }
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.log.level = level;
        }
        if let Some(json) = lookup(ENV_LOG_JSON) {
            config.log.json = parse_flag(ENV_LOG_JSON, &json)?;
        }
        Ok(config)
    }

    /// Catalog directory with `~` expanded
    pub fn config_path(&self) -> PathBuf {
        PathBuf::from(expand_path(&self.config_dir))
    }

    /// Calculate backoff delay for a given attempt number
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let delay_ms = self.initial_backoff_ms * 2u64.pow(attempt.min(10));
        Duration::from_millis(delay_ms.min(self.max_backoff_ms))
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

/// Expand ~ to home directory in path
pub fn expand_path(path: &str) -> String {
    if path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
