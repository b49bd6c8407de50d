//! Client configuration.
//!
//! Loaded from environment variables with compiled defaults:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `JOBDECK_API_URL` | [`defaults::API_BASE_URL`] | Base URL of the listing API |
//! | `JOBDECK_HTTP_TIMEOUT_SECS` | `30` | Per-request timeout |

use std::env;

use thiserror::Error;
use tracing::debug;

use jobdeck_core::defaults;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for jobdeck_core::Error {
    fn from(e: ConfigError) -> Self {
        jobdeck_core::Error::Config(e.to_string())
    }
}

/// Remote API client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL; list requests go to `{base_url}?search=...`, detail
    /// requests to `{base_url}/{id}`.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_BASE_URL.to_string(),
            timeout_seconds: defaults::HTTP_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Create config with a custom base URL and default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Create config from environment variables (with defaults).
    pub fn from_env() -> Self {
        let base_url =
            env::var("JOBDECK_API_URL").unwrap_or_else(|_| defaults::API_BASE_URL.to_string());
        let timeout_seconds = env::var("JOBDECK_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::HTTP_TIMEOUT_SECS);

        debug!(base_url = %base_url, timeout_seconds, "Loaded client config from env");

        Self {
            base_url,
            timeout_seconds,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout_seconds(mut self, secs: u64) -> Self {
        self.timeout_seconds = secs;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "base_url cannot be empty".to_string(),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "timeout_seconds must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let config = ClientConfig::new("");
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_non_http_scheme() {
        let err = ClientConfig::new("ftp://jobs.example").validate().unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ClientConfig::new("http://localhost").with_timeout_seconds(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_strips_trailing_slash() {
        let config = ClientConfig::new("http://localhost:8080/api/");
        assert_eq!(config.base(), "http://localhost:8080/api");
    }

    #[test]
    fn test_config_error_converts_to_core_error() {
        let err: jobdeck_core::Error = ConfigError::Validation("bad".into()).into();
        assert!(matches!(err, jobdeck_core::Error::Config(_)));
    }
}
