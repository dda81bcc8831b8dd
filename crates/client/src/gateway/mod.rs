//! Catalog gateway: domain operations on top of the HTTP transport and the
//! shared response cache.
//!
//! ### Read path
//!
//! 1. Derive the operation's logical key and parameter set.
//! 2. On a cache hit, return the cached value without touching the network.
//! 3. On a miss, call the transport; store a successful result under the same
//!    key/params and return it.
//! 4. Failures propagate unchanged. They are never cached or retried.
//!
//! | operation | logical key | params |
//! |---|---|---|
//! | list | `movies:<category>` | `page` |
//! | details | `movies:detail` | `movieId` |
//! | search | `search:movies` | `query`, `page` |

pub mod images;

pub use images::{DEFAULT_IMAGE_BASE_URL, ImageUrls, sizes};

use std::sync::Arc;

use async_trait::async_trait;
use marquee_core::{ApiError, AppConfig, Category, ConfigError, ListPage, Movie, MovieDetails, RequestParams, ResponseCache};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::http::HttpClient;

/// Logical cache key for movie detail records.
pub const DETAIL_CACHE_KEY: &str = "movies:detail";

/// Logical cache key for search results.
pub const SEARCH_CACHE_KEY: &str = "search:movies";

const DETAIL_PATH: &str = "/movie";
const SEARCH_PATH: &str = "/search/movie";

/// Read operations the controllers depend on.
///
/// Implemented by `CatalogGateway`; tests substitute scripted catalogs.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// One page of a category list.
    async fn list(&self, category: Category, page: u32, cancel: &CancellationToken) -> Result<ListPage, ApiError>;

    /// One page of search results for `query`.
    async fn search(&self, query: &str, page: u32, cancel: &CancellationToken) -> Result<ListPage, ApiError>;

    /// The full record of one movie.
    async fn details(&self, movie_id: u64, cancel: &CancellationToken) -> Result<MovieDetails, ApiError>;
}

/// Value stored in the shared response cache.
#[derive(Debug, Clone)]
pub enum CachedResponse {
    Page(ListPage),
    Details(Box<MovieDetails>),
}

/// Conversion between a response type and its cached form.
trait Cacheable: Sized {
    fn into_cached(self) -> CachedResponse;
    fn from_cached(cached: CachedResponse) -> Option<Self>;
}

impl Cacheable for ListPage {
    fn into_cached(self) -> CachedResponse {
        CachedResponse::Page(self)
    }

    fn from_cached(cached: CachedResponse) -> Option<Self> {
        match cached {
            CachedResponse::Page(page) => Some(page),
            CachedResponse::Details(_) => None,
        }
    }
}

impl Cacheable for MovieDetails {
    fn into_cached(self) -> CachedResponse {
        CachedResponse::Details(Box::new(self))
    }

    fn from_cached(cached: CachedResponse) -> Option<Self> {
        match cached {
            CachedResponse::Details(details) => Some(*details),
            CachedResponse::Page(_) => None,
        }
    }
}

/// The shared cache type used by gateways.
pub type GatewayCache = ResponseCache<CachedResponse>;

/// Catalog gateway.
///
/// Construct once at startup and share by `Arc`. Clones share the same cache.
#[derive(Debug, Clone)]
pub struct CatalogGateway {
    http: HttpClient,
    cache: Arc<GatewayCache>,
    images: ImageUrls,
    language: String,
}

impl CatalogGateway {
    /// Create a gateway over an existing transport and cache.
    pub fn new(http: HttpClient, cache: Arc<GatewayCache>) -> Self {
        Self { http, cache, images: ImageUrls::default(), language: "en-US".into() }
    }

    /// Wire transport, cache, and image base from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL or credential is missing or invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let http = HttpClient::from_app_config(config)?;
        let cache = Arc::new(GatewayCache::new(config.cache_ttl()));

        Ok(Self::new(http, cache)
            .with_images(ImageUrls::new(config.image_base_url.clone()))
            .with_language(config.language.clone()))
    }

    pub fn with_images(mut self, images: ImageUrls) -> Self {
        self.images = images;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn cache(&self) -> &Arc<GatewayCache> {
        &self.cache
    }

    pub fn images(&self) -> &ImageUrls {
        &self.images
    }

    /// One page of a category list, from cache when fresh.
    pub async fn list(&self, category: Category, page: u32, cancel: &CancellationToken) -> Result<ListPage, ApiError> {
        let params = RequestParams::new().with("page", page);
        let query = [("page", page.to_string()), ("language", self.language.clone())];

        self.cached_get(category.cache_key(), &params, category.path(), &query, cancel).await
    }

    /// Full record of one movie, with credits appended.
    pub async fn details(&self, movie_id: u64, cancel: &CancellationToken) -> Result<MovieDetails, ApiError> {
        let params = RequestParams::new().with("movieId", movie_id);
        let path = format!("{DETAIL_PATH}/{movie_id}");
        let query = [("language", self.language.clone()), ("append_to_response", "credits".to_string())];

        self.cached_get(DETAIL_CACHE_KEY, &params, &path, &query, cancel).await
    }

    /// Details for a secondary view (tooltips, previews).
    ///
    /// Failures degrade to `None` instead of surfacing an error.
    pub async fn details_or_none(&self, movie_id: u64, cancel: &CancellationToken) -> Option<MovieDetails> {
        match self.details(movie_id, cancel).await {
            Ok(details) => Some(details),
            Err(ApiError::Cancelled) => None,
            Err(e) => {
                tracing::warn!(movie_id, error = %e, "detail fetch failed; continuing without details");
                None
            }
        }
    }

    /// One page of search results.
    ///
    /// A blank query returns `ListPage::empty()` without consulting the cache
    /// or the network.
    pub async fn search(&self, query: &str, page: u32, cancel: &CancellationToken) -> Result<ListPage, ApiError> {
        if query.trim().is_empty() {
            return Ok(ListPage::empty());
        }

        let params = RequestParams::new().with("query", query).with("page", page);
        let outbound = [
            ("query", query.to_string()),
            ("page", page.to_string()),
            ("language", self.language.clone()),
            ("include_adult", "false".to_string()),
        ];

        self.cached_get(SEARCH_CACHE_KEY, &params, SEARCH_PATH, &outbound, cancel).await
    }

    /// URL for an image path at `size`, `None` when there is no image.
    pub fn image_url(&self, path: Option<&str>, size: &str) -> Option<String> {
        self.images.image_url(path, size)
    }

    pub fn poster_url(&self, movie: &Movie, size: &str) -> Option<String> {
        self.images.poster_url(movie, size)
    }

    pub fn backdrop_url(&self, movie: &Movie, size: &str) -> Option<String> {
        self.images.backdrop_url(movie, size)
    }

    pub fn profile_url(&self, profile_path: Option<&str>, size: &str) -> Option<String> {
        self.images.profile_url(profile_path, size)
    }

    pub fn poster_url_default(&self, movie: &Movie) -> Option<String> {
        self.images.poster_url_default(movie)
    }

    pub fn backdrop_url_default(&self, movie: &Movie) -> Option<String> {
        self.images.backdrop_url_default(movie)
    }

    pub fn profile_url_default(&self, profile_path: Option<&str>) -> Option<String> {
        self.images.profile_url_default(profile_path)
    }

    /// Drop every cached page of `category`.
    pub fn invalidate_category(&self, category: Category) {
        self.cache.invalidate_by_prefix(category.cache_key());
    }

    /// Drop the cached record of one movie.
    pub fn invalidate_details(&self, movie_id: u64) {
        self.cache.invalidate(DETAIL_CACHE_KEY, &RequestParams::new().with("movieId", movie_id));
    }

    /// Drop every cached search result.
    pub fn invalidate_search(&self) {
        self.cache.invalidate_by_prefix(SEARCH_CACHE_KEY);
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    async fn cached_get<T>(
        &self, key: &str, params: &RequestParams, path: &str, query: &[(&str, String)], cancel: &CancellationToken,
    ) -> Result<T, ApiError>
    where
        T: Cacheable + DeserializeOwned + Clone,
    {
        if let Some(hit) = self.cache.get(key, params).and_then(T::from_cached) {
            return Ok(hit);
        }

        let value: T = self.http.get(path, query, cancel).await?;
        self.cache.set(key, params, value.clone().into_cached());

        Ok(value)
    }
}

#[async_trait]
impl Catalog for CatalogGateway {
    async fn list(&self, category: Category, page: u32, cancel: &CancellationToken) -> Result<ListPage, ApiError> {
        CatalogGateway::list(self, category, page, cancel).await
    }

    async fn search(&self, query: &str, page: u32, cancel: &CancellationToken) -> Result<ListPage, ApiError> {
        CatalogGateway::search(self, query, page, cancel).await
    }

    async fn details(&self, movie_id: u64, cancel: &CancellationToken) -> Result<MovieDetails, ApiError> {
        CatalogGateway::details(self, movie_id, cancel).await
    }
}
