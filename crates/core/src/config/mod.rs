//! Application configuration with layered loading.
//!
//! Configuration is read once at startup using figment:
//!
//! 1. Environment variables (MARQUEE_*)
//! 2. TOML config file (if MARQUEE_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The catalog base URL and access credential have no defaults. Loading fails
//! when either is absent, which keeps the gateway from ever being built with an
//! unusable transport.

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::{ConfigError, validate_http_url};

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (MARQUEE_*)
/// 2. TOML config file (if MARQUEE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Catalog API base URL, e.g. `https://api.themoviedb.org/3`.
    ///
    /// Set via MARQUEE_BASE_URL environment variable.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Static API credential appended to every request.
    ///
    /// Set via MARQUEE_API_KEY environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for poster/backdrop/profile images.
    ///
    /// Set via MARQUEE_IMAGE_BASE_URL environment variable.
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// Per-request timeout in milliseconds.
    ///
    /// Set via MARQUEE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Response cache time-to-live in milliseconds.
    ///
    /// Set via MARQUEE_CACHE_TTL_MS environment variable.
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// Quiet period before a search query is sent, in milliseconds.
    ///
    /// Set via MARQUEE_DEBOUNCE_MS environment variable.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Response language sent with every catalog request.
    ///
    /// Set via MARQUEE_LANGUAGE environment variable.
    #[serde(default = "default_language")]
    pub language: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via MARQUEE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_cache_ttl_ms() -> u64 {
    300_000 // 5 minutes
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_language() -> String {
    "en-US".into()
}

fn default_user_agent() -> String {
    "marquee/0.1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            image_base_url: default_image_base_url(),
            timeout_ms: default_timeout_ms(),
            cache_ttl_ms: default_cache_ttl_ms(),
            debounce_ms: default_debounce_ms(),
            language: default_language(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache TTL as Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Debounce quiet period as Duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - The base URL or API key is missing
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// Build the layered figment without extracting it.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MARQUEE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("MARQUEE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into()),
        )
    }

    /// Extract and validate configuration from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// The catalog base URL, required at startup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the base URL is unset or blank.
    pub fn require_base_url(&self) -> Result<&str, ConfigError> {
        non_blank(self.base_url.as_deref()).ok_or_else(|| ConfigError::Missing {
            field: "base_url".into(),
            hint: "Set MARQUEE_BASE_URL environment variable".into(),
        })
    }

    /// The catalog credential, required at startup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the API key is unset or blank.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        non_blank(self.api_key.as_deref()).ok_or_else(|| ConfigError::Missing {
            field: "api_key".into(),
            hint: "Set MARQUEE_API_KEY environment variable".into(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> AppConfig {
        AppConfig {
            base_url: Some("https://api.themoviedb.org/3".into()),
            api_key: Some("secret".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.base_url.is_none());
        assert!(config.api_key.is_none());
        assert_eq!(config.image_base_url, "https://image.tmdb.org/t/p");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.language, "en-US");
        assert_eq!(config.user_agent, "marquee/0.1");
    }

    #[test]
    fn test_require_fields_missing() {
        let config = AppConfig::default();
        assert!(matches!(config.require_base_url(), Err(ConfigError::Missing { field, .. }) if field == "base_url"));
        assert!(matches!(config.require_api_key(), Err(ConfigError::Missing { field, .. }) if field == "api_key"));
    }

    #[test]
    fn test_require_fields_blank() {
        let config = AppConfig { api_key: Some("   ".into()), ..complete() };
        assert!(matches!(config.require_api_key(), Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_require_fields_present() {
        let config = complete();
        assert_eq!(config.require_base_url().unwrap(), "https://api.themoviedb.org/3");
        assert_eq!(config.require_api_key().unwrap(), "secret");
    }

    #[test]
    fn test_load_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MARQUEE_BASE_URL", "https://api.example.com/3");
            jail.set_env("MARQUEE_API_KEY", "k");
            jail.set_env("MARQUEE_CACHE_TTL_MS", "1000");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.base_url.as_deref(), Some("https://api.example.com/3"));
            assert_eq!(config.cache_ttl(), Duration::from_secs(1));
            assert_eq!(config.timeout_ms, 10_000);
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml_file_env_wins() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "marquee.toml",
                r#"
                base_url = "https://file.example.com/3"
                api_key = "from-file"
                debounce_ms = 250
                "#,
            )?;
            jail.set_env("MARQUEE_CONFIG_FILE", "marquee.toml");
            jail.set_env("MARQUEE_API_KEY", "from-env");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.base_url.as_deref(), Some("https://file.example.com/3"));
            assert_eq!(config.api_key.as_deref(), Some("from-env"));
            assert_eq!(config.debounce_ms, 250);
            Ok(())
        });
    }

    #[test]
    fn test_load_without_credential_is_fatal() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MARQUEE_BASE_URL", "https://api.example.com/3");

            let result = AppConfig::load();
            assert!(matches!(result, Err(ConfigError::Missing { field, .. }) if field == "api_key"));
            Ok(())
        });
    }
}
