//! Application configuration module
//!
//! Provides the raw configuration values and their builder. Resolution of
//! environment variables and defaults lives in `app::config`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Server URL
    pub server_url: Option<String>,
    /// Upper bound on a single request before it surfaces as a transport failure
    pub request_timeout: Option<Duration>,
    /// Where the session token is persisted
    pub token_path: Option<PathBuf>,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = self.server_url.as_deref() {
            let parsed =
                reqwest::Url::parse(url).map_err(|_| ConfigError::InvalidUrl(url.to_string()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidUrl(url.to_string()));
            }
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
    request_timeout: Option<Duration>,
    token_path: Option<PathBuf>,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = Some(path.into());
        self
    }

    /// Fill any unset value from a parsed TOML file
    pub fn merge_file(mut self, file: FileConfig) -> Self {
        if self.server_url.is_none() {
            self.server_url = file.server_url;
        }
        if self.request_timeout.is_none() {
            self.request_timeout = file.timeout_secs.map(Duration::from_secs);
        }
        if self.token_path.is_none() {
            self.token_path = file.token_path;
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let config = AppConfig {
            server_url: self
                .server_url
                .map(|url| url.trim_end_matches('/').to_string()),
            request_timeout: self.request_timeout,
            token_path: self.token_path,
        };
        config.validate()?;
        Ok(config)
    }
}

/// On-disk configuration file layout
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    pub server_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub token_path: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::parse(&raw)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("request timeout must be greater than zero")]
    InvalidTimeout,
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("failed to read config: {0}")]
    Io(String),
    #[error("failed to parse config: {0}")]
    Parse(String),
}
