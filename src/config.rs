//! Configuration module for stowage.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, StowageError};

/// Backend API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the storage backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_base_url() -> String {
    "http://localhost:8003".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_total_timeout() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    5
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// Bearer token attached to every request. Empty means unauthenticated;
    /// the backend answers 401 where a token is required.
    #[serde(default)]
    pub access_token: String,
}

/// Upload configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Advisory client-side upload size ceiling in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_max_upload_size() -> u64 {
    100
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty keeps logging console-only.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/stowage.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Backend API configuration.
    #[serde(default)]
    pub api: ApiConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Upload configuration.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(StowageError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| StowageError::Validation(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `STOWAGE_ACCESS_TOKEN`: Override the bearer token
    /// - `STOWAGE_BASE_URL`: Override the backend base URL
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("STOWAGE_ACCESS_TOKEN") {
            if !token.is_empty() {
                self.auth.access_token = token;
            }
        }
        if let Ok(base_url) = std::env::var("STOWAGE_BASE_URL") {
            if !base_url.is_empty() {
                self.api.base_url = base_url;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The base URL is not a valid http/https URL
    /// - A timeout is zero
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.api.base_url)
            .map_err(|e| StowageError::Validation(format!("invalid base_url: {e}")))?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(StowageError::Validation(format!(
                    "unsupported base_url scheme: {scheme}"
                )));
            }
        }
        if self.api.connect_timeout_secs == 0 || self.api.total_timeout_secs == 0 {
            return Err(StowageError::Validation(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
