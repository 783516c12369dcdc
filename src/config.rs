//! Application configuration
//!
//! Loaded from an optional TOML file, then overridden from the
//! environment (a `.env` file is honoured). `MONGODB_URI` is mandatory
//! when the MongoDB backend is selected.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::DatabaseConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("MONGODB_URI is not set in environment variables")]
    MissingDatabaseUri,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds allowed for in-flight requests to drain on shutdown.
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Mongo,
    /// Non-persistent, for local development.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub backend: StorageBackend,
    pub uri: Option<String>,
    pub name: String,
    pub collection: String,
    pub operation_timeout_secs: u64,
    pub server_selection_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Mongo,
            uri: None,
            name: "easyprofind".to_string(),
            collection: "ratings".to_string(),
            operation_timeout_secs: 5,
            server_selection_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub logging: LoggingConfig,
    /// Expose raw error text in generic 500 responses.
    pub debug: bool,
}

impl AppConfig {
    /// Read `path` if it exists, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str(&raw)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Defaults plus environment overrides, without a config file.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(uri) = lookup("MONGODB_URI") {
            self.database.uri = Some(uri);
        }
        if let Some(name) = lookup("MONGODB_DATABASE") {
            self.database.name = name;
        }
        if let Some(host) = lookup("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("API_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "API_PORT",
                value: port.clone(),
            })?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(debug) = lookup("APP_DEBUG") {
            self.debug = parse_bool("APP_DEBUG", &debug)?;
        }
        Ok(())
    }

    /// Checks that must pass before the server starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.backend == StorageBackend::Mongo {
            self.database_uri()?;
        }
        for (key, secs) in [
            ("database.operation_timeout_secs", self.database.operation_timeout_secs),
            (
                "database.server_selection_timeout_secs",
                self.database.server_selection_timeout_secs,
            ),
        ] {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key,
                    value: secs.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn database_uri(&self) -> Result<&str, ConfigError> {
        self.database
            .uri
            .as_deref()
            .filter(|uri| !uri.trim().is_empty())
            .ok_or(ConfigError::MissingDatabaseUri)
    }

    pub fn database_config(&self) -> Result<DatabaseConfig, ConfigError> {
        Ok(DatabaseConfig {
            uri: self.database_uri()?.to_string(),
            name: self.database.name.clone(),
            collection: self.database.collection.clone(),
            operation_timeout: Duration::from_secs(self.database.operation_timeout_secs),
            server_selection_timeout: Duration::from_secs(
                self.database.server_selection_timeout_secs,
            ),
        })
    }

    pub fn api_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

/// `~/.config/rating-service/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rating-service")
        .join("config.toml")
}
