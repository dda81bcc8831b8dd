//! Catalog HTTP transport.
//!
//! A thin wrapper over reqwest that every catalog call goes through. It has no
//! cache and no retries.
//!
//! ### Contract
//!
//! - **Authentication**: the static credential is appended as the `api_key`
//!   query parameter, ahead of the caller's own parameters.
//! - **Timeout**: every call (send + body read) is bounded by one fixed
//!   timeout. Exceeding it drops the transport future and yields `Timeout`.
//! - **Cancellation**: callers pass a `CancellationToken`. Firing it yields
//!   `Cancelled`, which is distinct from `Timeout`.
//! - **Normalization**: every failure maps onto the closed `ApiError` set.
//! - **Startup**: an empty base URL or credential is a configuration error
//!   raised by `HttpClient::new`, never a per-call error.

pub mod endpoint;
pub mod status;

pub use status::{classify_status, classify_transport};
pub use endpoint::{API_KEY_PARAM, build_url};

use std::time::{Duration, Instant};

use marquee_core::config::validate_http_url;
use marquee_core::{ApiError, AppConfig, ConfigError};
use reqwest::header;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "marquee/0.1";

/// HTTP transport configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Catalog API base URL, e.g. `https://api.themoviedb.org/3`.
    pub base_url: String,
    /// Static credential sent with every call.
    pub api_key: String,
    /// Per-call timeout (default: 10s).
    pub timeout: Duration,
    /// User-agent string (default: marquee/0.x).
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    /// Take the transport settings from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the base URL or API key is absent.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: config.require_base_url()?.to_string(),
            api_key: config.require_api_key()?.to_string(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        })
    }
}

/// Catalog HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    config: HttpConfig,
}

impl HttpClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Fails if the base URL or credential is empty, or the base URL is not an
    /// http(s) URL. These are fatal startup errors.
    pub fn new(config: HttpConfig) -> Result<Self, ConfigError> {
        if config.base_url.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "base_url".into(),
                hint: "Set MARQUEE_BASE_URL environment variable".into(),
            });
        }
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "api_key".into(),
                hint: "Set MARQUEE_API_KEY environment variable".into(),
            });
        }
        validate_http_url("base_url", &config.base_url)?;

        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| ConfigError::Invalid { field: "http_client".into(), reason: e.to_string() })?;

        Ok(Self { http, config })
    }

    /// Create a client from the application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Self::new(HttpConfig::from_app_config(config)?)
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Build the authenticated URL for `path` with `query` appended in order.
    pub fn build_url(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Url, ApiError> {
        build_url(&self.config.base_url, &self.config.api_key, path, query)
    }

    /// Issue a GET and decode the JSON body as `T`.
    ///
    /// Races the call against the configured timeout and `cancel`.
    pub async fn get<T: DeserializeOwned>(
        &self, path: &str, query: &[(&str, String)], cancel: &CancellationToken,
    ) -> Result<T, ApiError> {
        let url = self.build_url(path, query)?;
        let shown = endpoint::redacted(&url);
        let start = Instant::now();

        tracing::debug!("catalog request: {}", shown);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = tokio::time::timeout(self.config.timeout, self.send(url)) => match result {
                Ok(inner) => inner,
                Err(_) => Err(ApiError::Timeout),
            },
        };

        match &outcome {
            Ok(_) => tracing::debug!("catalog request {} completed in {:?}", shown, start.elapsed()),
            Err(ApiError::Cancelled) => tracing::debug!("catalog request {} cancelled", shown),
            Err(e) => tracing::debug!(error = %e, "catalog request {} failed after {:?}", shown, start.elapsed()),
        }

        outcome
    }

    async fn send<T: DeserializeOwned>(&self, url: reqwest::Url) -> Result<T, ApiError> {
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        tracing::debug!("catalog response status: {}", status);

        let bytes = response.bytes().await.map_err(|e| classify_transport(&e))?;

        if !status.is_success() {
            return Err(classify_status(status, &bytes));
        }

        serde_json::from_slice(&bytes).map_err(|e| ApiError::unknown(format!("invalid response body: {e}")))
    }
}
