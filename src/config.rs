//! Configuration module for VinnoDrive.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{DriveError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Metadata store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL of the metadata store.
    #[serde(default = "default_db_url")]
    pub url: String,
}

fn default_db_url() -> String {
    "sqlite://data/vinnodrive.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
        }
    }
}

/// Blob storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding uploaded blobs.
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_storage_path() -> String {
    "uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    10
}

impl StorageConfig {
    /// Upload ceiling in bytes, or `None` if it does not fit in a `u64`.
    pub fn checked_max_upload_size_bytes(&self) -> Option<u64> {
        self.max_upload_size_mb.checked_mul(1024 * 1024)
    }

    /// Upload ceiling in bytes. Saturates; `Config::validate` rejects overflowing values.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Request rate limit configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Requests allowed per client address in one window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_max_requests() -> u32 {
    100
}

fn default_window_secs() -> u64 {
    15 * 60
}

impl RateLimitSettings {
    /// Window length as a duration.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

/// Web layer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Whether to serve the embedded browser UI at `/`.
    #[serde(default = "default_serve_ui")]
    pub serve_ui: bool,
}

fn default_serve_ui() -> bool {
    true
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            serve_ui: default_serve_ui(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file. Console only when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Metadata store configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Rate limit configuration.
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    /// Web layer configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DriveError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    ///
    /// Also returns the override warnings, see [`Config::apply_env_overrides`].
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<(Self, Vec<String>)> {
        let mut config = Self::load(path)?;
        let warnings = config.apply_env_overrides();
        Ok((config, warnings))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| DriveError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `PORT`: listening port
    /// - `DATABASE_URL`: metadata store connection URL
    /// - `VINNODRIVE_STORAGE_PATH`: blob directory
    ///
    /// Empty or unparsable values are ignored. Ignored values are reported in
    /// the returned warnings, since this usually runs before logging is up.
    pub fn apply_env_overrides(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Ok(port) = std::env::var("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) if port.is_empty() => {}
                Err(e) => warnings.push(format!("Ignoring invalid PORT {port:?}: {e}")),
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.is_empty() {
                self.database.url = url;
            }
        }

        if let Ok(path) = std::env::var("VINNODRIVE_STORAGE_PATH") {
            if !path.is_empty() {
                self.storage.path = path;
            }
        }

        warnings
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(DriveError::Config("database.url must not be empty".to_string()));
        }
        if self.storage.path.trim().is_empty() {
            return Err(DriveError::Config("storage.path must not be empty".to_string()));
        }
        if self.storage.max_upload_size_mb == 0 {
            return Err(DriveError::Config(
                "storage.max_upload_size_mb must be greater than 0".to_string(),
            ));
        }
        if self.storage.checked_max_upload_size_bytes().is_none() {
            return Err(DriveError::Config(format!(
                "storage.max_upload_size_mb is too large: {}",
                self.storage.max_upload_size_mb
            )));
        }
        if self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0 {
            return Err(DriveError::Config(
                "rate_limit.max_requests and rate_limit.window_secs must be greater than 0"
                    .to_string(),
            ));
        }
        Ok(())
    }
}
