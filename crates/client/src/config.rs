//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPHUB_API_URL` - Base URL of the ShopHub backend (e.g.,
//!   `http://localhost:5000`)
//!
//! ## Optional
//! - `SHOPHUB_API_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `SHOPHUB_DATA_DIR` - Directory for the durable session store
//!   (default: `.shophub`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DATA_DIR: &str = ".shophub";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend all endpoints hang off.
    pub api_base_url: Url,
    /// Terminal timeout for every network request; identity operations in
    /// particular must fail rather than hang.
    pub request_timeout: Duration,
    /// Directory backing the [`FileStore`](crate::store::FileStore).
    pub data_dir: PathBuf,
}

impl ClientConfig {
    /// Build a config with defaults for everything but the base URL.
    #[must_use]
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when `SHOPHUB_API_URL` is missing or any variable
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = std::env::var("SHOPHUB_API_URL")
            .map_err(|_| ConfigError::MissingEnvVar("SHOPHUB_API_URL".to_owned()))?;
        let api_base_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPHUB_API_URL".to_owned(), e.to_string()))?;

        let request_timeout = match std::env::var("SHOPHUB_API_TIMEOUT_SECS") {
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Ok(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| {
                    ConfigError::InvalidEnvVar("SHOPHUB_API_TIMEOUT_SECS".to_owned(), e.to_string())
                })?,
        };

        let data_dir = std::env::var("SHOPHUB_DATA_DIR")
            .map_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        Ok(Self {
            api_base_url,
            request_timeout,
            data_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_defaults() {
        let config = ClientConfig::new(Url::parse("http://localhost:5000").expect("url"));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.data_dir, PathBuf::from(".shophub"));
    }
}
