//! Configuration validation rules.
//!
//! Runs after `AppConfig` has been extracted from environment, files, or
//! defaults. Any error here is fatal: nothing downstream is constructed.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the base URL or API key is absent, and
    /// `ConfigError::Invalid` if:
    /// - `base_url` or `image_base_url` is not an absolute http(s) URL
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `cache_ttl_ms` is 0
    /// - `debounce_ms` exceeds 10 seconds
    /// - `language` or `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("base_url", self.require_base_url()?)?;
        self.require_api_key()?;
        validate_http_url("image_base_url", &self.image_base_url)?;

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.cache_ttl_ms == 0 {
            return Err(ConfigError::Invalid { field: "cache_ttl_ms".into(), reason: "must be greater than 0".into() });
        }

        if self.debounce_ms > 10_000 {
            return Err(ConfigError::Invalid {
                field: "debounce_ms".into(),
                reason: "must not exceed 10 seconds (10000ms)".into(),
            });
        }

        if self.language.is_empty() {
            return Err(ConfigError::Invalid { field: "language".into(), reason: "must not be empty".into() });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.debounce_ms == 0 {
            tracing::warn!("debounce_ms is 0; every query update will be sent to the catalog");
        }

        Ok(())
    }
}

/// Check that `value` parses as an absolute http(s) URL.
pub fn validate_http_url(field: &str, value: &str) -> Result<url::Url, ConfigError> {
    let parsed =
        url::Url::parse(value).map_err(|e| ConfigError::Invalid { field: field.into(), reason: e.to_string() })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(ConfigError::Invalid { field: field.into(), reason: format!("unsupported scheme: {scheme}") }),
    }
}
