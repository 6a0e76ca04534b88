//! Configuration management for adminview
//!
//! This module handles loading, validation, and management of
//! adminview configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Record source files, one JSON envelope per screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the screen snapshots
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    #[serde(default = "default_fees_file")]
    pub fees_file: String,
    #[serde(default = "default_history_fees_file")]
    pub history_fees_file: String,
    #[serde(default = "default_stores_file")]
    pub stores_file: String,
    /// Stores still waiting for verification
    #[serde(default = "default_store_requests_file")]
    pub store_requests_file: String,
    #[serde(default = "default_payouts_file")]
    pub payouts_file: String,
    #[serde(default = "default_transactions_file")]
    pub transactions_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            fees_file: default_fees_file(),
            history_fees_file: default_history_fees_file(),
            stores_file: default_stores_file(),
            store_requests_file: default_store_requests_file(),
            payouts_file: default_payouts_file(),
            transactions_file: default_transactions_file(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_fees_file() -> String {
    "fees.json".to_string()
}

fn default_history_fees_file() -> String {
    "history-fees.json".to_string()
}

fn default_stores_file() -> String {
    "stores.json".to_string()
}

fn default_store_requests_file() -> String {
    "store-requests.json".to_string()
}

fn default_payouts_file() -> String {
    "payouts.json".to_string()
}

fn default_transactions_file() -> String {
    "transactions.json".to_string()
}

/// Session handed to the record sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Bearer token. Empty means "not logged in".
    #[serde(default)]
    pub token: String,
    /// Role of the logged in operator
    #[serde(default = "default_role")]
    pub role: String,
    /// Display name
    #[serde(default)]
    pub name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            role: default_role(),
            name: String::new(),
        }
    }
}

fn default_role() -> String {
    "admin".to_string()
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Rows per page for every screen
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    10
}

/// Background refresh settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Poll the record sources periodically
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between two fetches of the same screen
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    10
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Data source settings
    #[serde(default)]
    pub data: DataConfig,
    /// Operator session
    #[serde(default)]
    pub session: SessionConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Refresh settings
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            },
            _ => ConfigError::IoError,
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content).map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.pagination.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.page_size".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        if self.refresh.enabled && self.refresh.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "refresh.interval_secs".to_string(),
                reason: "Refresh interval must be at least one second".to_string(),
            });
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Resolve a data file name against the data directory
    pub fn source_path(&self, file: impl AsRef<Path>) -> PathBuf {
        self.data.path.join(file)
    }

    /// Address the HTTP host binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ==================== Tests ====================
