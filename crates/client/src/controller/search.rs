//! Debounced search controller.
//!
//! Raw query updates are coalesced by a background task: the query is only
//! applied once it has been quiet for the configured period. Each update
//! restarts the timer.
//!
//! Applying a query:
//! - unchanged (after trimming): nothing happens
//! - empty: in-flight work is cancelled and the state returns to empty `Idle`
//! - otherwise: results are cleared and page 1 is fetched
//!
//! A request superseded by a newer query is cancelled and its late response
//! ignored.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use marquee_core::AppConfig;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::pager::{ListState, PageRequest, Pager};
use crate::gateway::Catalog;

/// Default quiet period before a query is applied.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

struct SearchInner {
    catalog: Arc<dyn Catalog>,
    active: Mutex<String>,
    pager: Pager,
}

impl SearchInner {
    fn active(&self) -> MutexGuard<'_, String> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a debounced query. The first page is fetched on a spawned task;
    /// the slot is claimed before returning so queries apply in order.
    fn apply(self: &Arc<Self>, query: String) {
        {
            let mut active = self.active();
            if *active == query {
                return;
            }
            active.clone_from(&query);
        }

        if query.is_empty() {
            tracing::debug!("search query cleared");
            self.pager.reset();
            return;
        }

        tracing::debug!(query = %query, "applying search query");
        let Some(reservation) = self.pager.reserve(PageRequest::First) else {
            return;
        };

        let inner = Arc::clone(self);
        let catalog = Arc::clone(&self.catalog);
        tokio::spawn(async move {
            inner
                .pager
                .fetch(reservation, move |page, cancel| async move { catalog.search(&query, page, &cancel).await })
                .await;
        });
    }

    /// Fetch a page of the active query. The query is read while the slot is
    /// claimed, so a concurrent `apply` either supersedes this request or
    /// happens before it.
    async fn fetch(&self, request: PageRequest) {
        let scope = || Some(self.active().clone()).filter(|query| !query.is_empty());
        let Some((reservation, query)) = self.pager.reserve_for(request, scope) else {
            return;
        };

        self.pager
            .fetch(reservation, |page, cancel| async move { self.catalog.search(&query, page, &cancel).await })
            .await;
    }
}

/// Search-as-you-type over the catalog.
///
/// Must be created inside a tokio runtime. Dropping the controller stops the
/// debounce task and cancels any in-flight request.
pub struct DebouncedSearchController {
    inner: Arc<SearchInner>,
    raw: watch::Sender<String>,
    quiet_period: Duration,
    debouncer: JoinHandle<()>,
}

impl std::fmt::Debug for DebouncedSearchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedSearchController")
            .field("query", &*self.raw.borrow())
            .field("debounced_query", &self.debounced_query())
            .field("quiet_period", &self.quiet_period)
            .finish_non_exhaustive()
    }
}

impl DebouncedSearchController {
    /// Create an idle controller and start its debounce task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new(catalog: Arc<dyn Catalog>, quiet_period: Duration) -> Self {
        let inner = Arc::new(SearchInner { catalog, active: Mutex::new(String::new()), pager: Pager::new() });
        let (raw, updates) = watch::channel(String::new());
        let debouncer = tokio::spawn(debounce(Arc::clone(&inner), updates, quiet_period));

        Self { inner, raw, quiet_period, debouncer }
    }

    /// Create a controller using the configured quiet period.
    pub fn from_config(catalog: Arc<dyn Catalog>, config: &AppConfig) -> Self {
        Self::new(catalog, config.debounce())
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Record the latest raw query text. Returns immediately.
    pub fn set_query(&self, raw: impl Into<String>) {
        self.raw.send_replace(raw.into());
    }

    /// The raw query as last typed.
    pub fn query(&self) -> String {
        self.raw.borrow().clone()
    }

    /// The trimmed query the current results belong to.
    pub fn debounced_query(&self) -> String {
        self.inner.active().clone()
    }

    pub fn state(&self) -> ListState {
        self.inner.pager.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.inner.pager.subscribe()
    }

    pub fn has_more(&self) -> bool {
        self.inner.pager.state().has_more()
    }

    /// Load and append the next page of the current query.
    pub async fn load_more(&self) {
        self.inner.fetch(PageRequest::Next).await;
    }

    /// Reload page 1 of the current query. No-op with an empty query.
    pub async fn refetch(&self) {
        self.inner.fetch(PageRequest::First).await;
    }

    /// Empty the query and the results immediately, without waiting for the
    /// quiet period.
    pub fn clear(&self) {
        self.inner.active().clear();
        self.raw.send_replace(String::new());
        self.inner.pager.reset();
    }

    /// Cancel in-flight work and return to an empty idle state.
    ///
    /// The raw query is kept; the next debounced update applies it again.
    pub fn reset(&self) {
        self.inner.active().clear();
        self.inner.pager.reset();
    }
}

impl Drop for DebouncedSearchController {
    fn drop(&mut self) {
        self.debouncer.abort();
        self.inner.pager.cancel();
    }
}

async fn debounce(inner: Arc<SearchInner>, mut updates: watch::Receiver<String>, quiet_period: Duration) {
    while updates.changed().await.is_ok() {
        loop {
            tokio::select! {
                biased;
                changed = updates.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = tokio::time::sleep(quiet_period) => break,
            }
        }

        let query = updates.borrow_and_update().trim().to_string();
        inner.apply(query);
    }
}
