//! # Service Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TILL_PORT=8080                                                     │
//! │     TILL_TIMEZONE=Europe/Lisbon                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/till/till.toml (Linux)                                   │
//! │     ~/Library/Application Support/com.till.pos/till.toml (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "/var/lib/till/till.db"
//! max_connections = 5
//!
//! [business]
//! timezone = "Asia/Kolkata"   # decides what "today" is
//! denominations = [500, 200, 100, 50, 20, 10, 5, 2, 1]
//!
//! [history]
//! default_limit = 30
//! max_limit = 100
//!
//! [logging]
//! filter = "info,till=debug,sqlx=warn"
//! ```

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use till_core::denomination::{DenominationSet, STANDARD_FACE_VALUES};
use till_core::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use till_db::DbConfig;

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("com", "till", "pos")
        .map(|dirs| dirs.data_dir().join("till.db"))
        .unwrap_or_else(|| PathBuf::from("./till.db"))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessConfig {
    /// IANA timezone name; the business date is the calendar date here.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Accepted face values in major units.
    #[serde(default = "default_denominations")]
    pub denominations: Vec<u32>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_denominations() -> Vec<u32> {
    STANDARD_FACE_VALUES.to_vec()
}

impl Default for BusinessConfig {
    fn default() -> Self {
        BusinessConfig {
            timezone: default_timezone(),
            denominations: default_denominations(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_limit")]
    pub default_limit: i64,

    #[serde(default = "default_history_max")]
    pub max_limit: i64,
}

fn default_history_limit() -> i64 {
    DEFAULT_HISTORY_LIMIT
}

fn default_history_max() -> i64 {
    MAX_HISTORY_LIMIT
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            default_limit: default_history_limit(),
            max_limit: default_history_max(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info,till=debug,sqlx=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TillConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub business: BusinessConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TillConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`till.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses a config file body.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `TILL_*` overrides from `lookup`. Unparseable numbers are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("TILL_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Some(port) = lookup("TILL_PORT").and_then(|p| p.parse().ok()) {
            debug!(port, "Overriding port from environment");
            self.server.port = port;
        }

        if let Some(path) = lookup("TILL_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }

        if let Some(tz) = lookup("TILL_TIMEZONE") {
            debug!(timezone = %tz, "Overriding timezone from environment");
            self.business.timezone = tz;
        }

        if let Some(filter) = lookup("TILL_LOG_FILTER") {
            self.logging.filter = filter;
        }

        if let Some(max) = lookup("TILL_HISTORY_MAX_LIMIT").and_then(|m| m.parse().ok()) {
            self.history.max_limit = max;
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.timezone()?;
        self.denomination_set()?;
        self.socket_addr()?;

        if self.history.max_limit < 1 {
            return Err(ConfigError::Invalid(
                "history.max_limit must be at least 1".into(),
            ));
        }

        if self.history.default_limit < 1 {
            return Err(ConfigError::Invalid(
                "history.default_limit must be at least 1".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Business timezone.
    pub fn timezone(&self) -> ConfigResult<Tz> {
        self.business.timezone.parse::<Tz>().map_err(|_| {
            ConfigError::Invalid(format!("unknown timezone '{}'", self.business.timezone))
        })
    }

    /// Accepted denominations.
    pub fn denomination_set(&self) -> ConfigResult<DenominationSet> {
        DenominationSet::new(self.business.denominations.iter().copied())
            .map_err(|e| ConfigError::Invalid(format!("business.denominations: {}", e)))
    }

    /// Listen address.
    pub fn socket_addr(&self) -> ConfigResult<SocketAddr> {
        format!("{}:{}", self.server.bind_addr, self.server.port)
            .parse()
            .map_err(|_| {
                ConfigError::Invalid(format!(
                    "invalid bind address '{}:{}'",
                    self.server.bind_addr, self.server.port
                ))
            })
    }

    /// Database pool settings.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "till", "pos")
            .map(|dirs| dirs.config_dir().join("till.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = TillConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history.default_limit, 30);
        assert_eq!(config.history.max_limit, 100);
        assert_eq!(config.timezone().unwrap(), Tz::UTC);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TillConfig::from_toml(
            r#"
            [server]
            port = 9090

            [business]
            timezone = "Asia/Kolkata"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.bind_addr, "127.0.0.1");
        assert_eq!(config.timezone().unwrap(), chrono_tz::Asia::Kolkata);
        assert_eq!(config.business.denominations, STANDARD_FACE_VALUES.to_vec());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TILL_PORT", "3000"),
            ("TILL_TIMEZONE", "Europe/Lisbon"),
            ("TILL_HISTORY_MAX_LIMIT", "50"),
            ("TILL_DB_PATH", "/tmp/till-test.db"),
        ]
        .into_iter()
        .collect();

        let mut config = TillConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.business.timezone, "Europe/Lisbon");
        assert_eq!(config.history.max_limit, 50);
        assert_eq!(config.database.path, PathBuf::from("/tmp/till-test.db"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = TillConfig::default();
        config.business.timezone = "Mars/Olympus".to_string();
        assert!(config.validate().is_err());

        let mut config = TillConfig::default();
        config.business.denominations = vec![];
        assert!(config.validate().is_err());

        let mut config = TillConfig::default();
        config.history.max_limit = 0;
        assert!(config.validate().is_err());
    }
}
