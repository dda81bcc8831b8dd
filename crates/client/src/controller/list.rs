//! Category list controller.

use std::sync::{Arc, Mutex, PoisonError};

use marquee_core::{Category, LoadStatus};
use tokio::sync::watch;

use super::pager::{ListState, PageRequest, Pager};
use crate::gateway::Catalog;

/// Accumulates pages of one category list for a view.
///
/// Async operations resolve once their request has settled (or been
/// superseded). Dropping the controller cancels whatever is in flight.
pub struct PaginatedListController {
    catalog: Arc<dyn Catalog>,
    category: Mutex<Category>,
    pager: Pager,
}

impl std::fmt::Debug for PaginatedListController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedListController")
            .field("category", &self.category())
            .field("state", &self.pager.state())
            .finish_non_exhaustive()
    }
}

impl PaginatedListController {
    /// Create an idle controller. Nothing is fetched until `initialize`.
    pub fn new(catalog: Arc<dyn Catalog>, category: Category) -> Self {
        Self { catalog, category: Mutex::new(category), pager: Pager::new() }
    }

    pub fn category(&self) -> Category {
        *self.category.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the published state.
    pub fn state(&self) -> ListState {
        self.pager.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.pager.subscribe()
    }

    pub fn has_more(&self) -> bool {
        self.pager.state().has_more()
    }

    /// Load the first page.
    pub async fn initialize(&self) {
        self.refetch().await;
    }

    /// Drop accumulated items and load page 1 again.
    pub async fn refetch(&self) {
        self.fetch(PageRequest::First).await;
    }

    /// Load and append the next page. Ignored while loading or at the end.
    pub async fn load_more(&self) {
        self.fetch(PageRequest::Next).await;
    }

    /// Switch to another category and load its first page.
    ///
    /// Switching to the category already shown is a no-op once it has been
    /// initialized.
    pub async fn set_category(&self, category: Category) {
        let previous = std::mem::replace(&mut *self.category.lock().unwrap_or_else(PoisonError::into_inner), category);
        if previous == category && self.pager.state().status != LoadStatus::Idle {
            return;
        }

        tracing::debug!(from = %previous, to = %category, "switching list category");
        self.refetch().await;
    }

    /// Cancel in-flight work and return to an empty idle state.
    pub fn reset(&self) {
        self.pager.reset();
    }

    async fn fetch(&self, request: PageRequest) {
        self.pager
            .run(request, |page, cancel| async move { self.catalog.list(self.category(), page, &cancel).await })
            .await;
    }
}
