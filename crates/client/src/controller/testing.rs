//! Scripted in-memory catalog for controller tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use marquee_core::{ApiError, Category, ListPage, Movie, MovieDetails};
use tokio_util::sync::CancellationToken;

use crate::gateway::Catalog;

/// Serves generated pages, with optional per-call delays and one-shot failures.
///
/// Calls are recorded as `list:<category>:<page>`, `search:<query>:<page>`
/// and `details:<id>`.
#[derive(Debug)]
pub(crate) struct ScriptedCatalog {
    total_pages: u32,
    per_page: u64,
    delays: Mutex<HashMap<String, Duration>>,
    failures: Mutex<HashMap<String, ApiError>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedCatalog {
    pub(crate) fn new(total_pages: u32, per_page: u64) -> Self {
        Self {
            total_pages,
            per_page,
            delays: Mutex::default(),
            failures: Mutex::default(),
            calls: Mutex::default(),
        }
    }

    pub(crate) fn delay(self, call: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(call.to_string(), delay);
        self
    }

    pub(crate) fn fail_once(&self, call: &str, error: ApiError) {
        self.failures.lock().unwrap().insert(call.to_string(), error);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Ids on `page` start at `base + (page - 1) * per_page`.
    fn page(&self, base: u64, page: u32) -> ListPage {
        let first = base + u64::from(page - 1) * self.per_page;
        ListPage {
            page,
            results: (first..first + self.per_page)
                .map(|id| Movie { id, title: format!("movie {id}"), ..Default::default() })
                .collect(),
            total_pages: self.total_pages,
            total_results: u64::from(self.total_pages) * self.per_page,
        }
    }

    async fn script(&self, call: String, cancel: &CancellationToken) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call.clone());

        let delay = self.delays.lock().unwrap().get(&call).copied();
        if let Some(delay) = delay {
            tokio::select! {
                _ = cancel.cancelled() => return Err(ApiError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        match self.failures.lock().unwrap().remove(&call) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Id base for a category so pages of different lists never share ids.
pub(crate) fn category_base(category: Category) -> u64 {
    match category {
        Category::NowPlaying => 0,
        Category::Popular => 10_000,
        Category::TopRated => 20_000,
        Category::Upcoming => 30_000,
    }
}

/// Id base for search results, derived from the query length.
pub(crate) fn search_base(query: &str) -> u64 {
    100_000 * query.len() as u64
}

#[async_trait]
impl Catalog for ScriptedCatalog {
    async fn list(&self, category: Category, page: u32, cancel: &CancellationToken) -> Result<ListPage, ApiError> {
        self.script(format!("list:{category}:{page}"), cancel).await?;
        Ok(self.page(category_base(category), page))
    }

    async fn search(&self, query: &str, page: u32, cancel: &CancellationToken) -> Result<ListPage, ApiError> {
        self.script(format!("search:{query}:{page}"), cancel).await?;
        Ok(self.page(search_base(query), page))
    }

    async fn details(&self, movie_id: u64, cancel: &CancellationToken) -> Result<MovieDetails, ApiError> {
        self.script(format!("details:{movie_id}"), cancel).await?;
        Ok(MovieDetails {
            movie: Movie { id: movie_id, title: format!("movie {movie_id}"), ..Default::default() },
            ..Default::default()
        })
    }
}
