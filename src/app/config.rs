use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError, FileConfig};

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Default bound on a single request
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_API_URL: &str = "EPILINK_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "EPILINK_TIMEOUT_SECS";
pub const ENV_TOKEN_PATH: &str = "EPILINK_TOKEN_PATH";

/// Application configuration wrapper.
#[derive(Debug, Clone, Default)]
pub struct Config {
    app: AppConfig,
}

impl Config {
    /// Create a configuration from environment variables and defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::with_builder(AppConfig::builder())
    }

    /// Create a configuration from a TOML file, falling back to the environment
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = FileConfig::load(path)?;
        Self::with_builder(AppConfig::builder().merge_file(file))
    }

    /// Builder values win; anything left unset is read from the environment.
    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        let builder = apply_env(builder)?;
        let app = builder.build()?;
        Ok(Self { app })
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url(), path)
    }

    pub fn server_url(&self) -> &str {
        self.app.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        self.app.request_timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Location of the persisted session token
    pub fn token_path(&self) -> PathBuf {
        self.app.token_path.clone().unwrap_or_else(default_token_path)
    }
}

fn apply_env(mut builder: AppConfigBuilder) -> Result<AppConfigBuilder, ConfigError> {
    let mut file = FileConfig::default();
    if let Ok(url) = std::env::var(ENV_API_URL) {
        file.server_url = Some(url);
    }
    if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
        let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
            name: ENV_TIMEOUT_SECS,
            value: raw.clone(),
        })?;
        file.timeout_secs = Some(secs);
    }
    if let Ok(path) = std::env::var(ENV_TOKEN_PATH) {
        file.token_path = Some(PathBuf::from(path));
    }
    builder = builder.merge_file(file);
    Ok(builder)
}

fn default_token_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("epilink")
        .join("session.json")
}
