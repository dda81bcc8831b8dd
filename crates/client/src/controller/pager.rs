//! Paginated accumulation shared by the list and search controllers.
//!
//! ### State transitions
//!
//! | from | trigger | to |
//! |---|---|---|
//! | any | first page requested | `Loading`, items cleared |
//! | `Success`/`Error` with more pages | next page requested | `Loading`, items kept |
//! | `Loading` | current response ok | `Success` |
//! | `Loading` | current response failed | `Error`, items kept |
//! | any | reset | `Idle`, empty |
//!
//! Reservation and settlement each run inside one `send_if_modified` closure,
//! so the currency check and the state change cannot interleave with another
//! request.

use std::future::Future;

use marquee_core::{ApiError, ListPage, LoadStatus, Movie};
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::slot::{InFlightToken, RequestSlot};

/// Published state of a paginated list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListState {
    pub items: Vec<Movie>,
    pub status: LoadStatus,
    pub error: Option<String>,
    /// Last page successfully merged; 0 before the first page lands.
    pub current_page: u32,
    pub total_pages: u32,
}

impl ListState {
    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageRequest {
    First,
    Next,
}

/// A page request that has claimed the slot.
///
/// Carries the state published before the claim so a request that never
/// lands can be rolled back.
#[derive(Debug)]
pub(crate) struct Reservation {
    page: u32,
    prior: ListState,
    token: InFlightToken,
}

/// Rolls back a reservation whose fetch future is dropped before settling.
struct Unsettled<'a> {
    pager: &'a Pager,
    reservation: Option<Reservation>,
}

impl Drop for Unsettled<'_> {
    fn drop(&mut self) {
        if let Some(reservation) = self.reservation.take() {
            self.pager.abandon(reservation);
        }
    }
}

#[derive(Debug)]
pub(crate) struct Pager {
    state: watch::Sender<ListState>,
    slot: RequestSlot,
}

impl Pager {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(ListState::default());
        Self { state, slot: RequestSlot::new() }
    }

    pub(crate) fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    /// Fetch and merge one page.
    pub(crate) async fn run<F, Fut>(&self, request: PageRequest, fetch: F)
    where
        F: FnOnce(u32, CancellationToken) -> Fut,
        Fut: Future<Output = Result<ListPage, ApiError>>,
    {
        if let Some(reservation) = self.reserve(request) {
            self.fetch(reservation, fetch).await;
        }
    }

    /// Claim the slot for `request` and move to `Loading`.
    ///
    /// Returns `None` when a next page is asked for while loading or after the
    /// last page.
    pub(crate) fn reserve(&self, request: PageRequest) -> Option<Reservation> {
        self.reserve_for(request, || Some(())).map(|(reservation, ())| reservation)
    }

    /// Like `reserve`, reading the request's scope (e.g. the search query) in
    /// the same step as the claim. A `None` scope claims nothing.
    pub(crate) fn reserve_for<S>(
        &self, request: PageRequest, scope: impl FnOnce() -> Option<S>,
    ) -> Option<(Reservation, S)> {
        let mut reservation = None;

        self.state.send_if_modified(|state| {
            let page = match request {
                PageRequest::First => 1,
                PageRequest::Next => {
                    if state.status == LoadStatus::Loading || !state.has_more() {
                        return false;
                    }
                    state.current_page + 1
                }
            };
            let Some(scope) = scope() else {
                return false;
            };

            let prior = state.clone();
            let token = self.slot.begin();

            if request == PageRequest::First {
                *state = ListState::default();
            }
            state.status = LoadStatus::Loading;
            state.error = None;

            reservation = Some((Reservation { page, prior, token }, scope));
            true
        });

        reservation
    }

    /// Run the fetch for a reservation and settle its outcome.
    ///
    /// Dropping the returned future before it completes cancels the request
    /// and restores the state published before the reservation.
    pub(crate) async fn fetch<F, Fut>(&self, reservation: Reservation, fetch: F)
    where
        F: FnOnce(u32, CancellationToken) -> Fut,
        Fut: Future<Output = Result<ListPage, ApiError>>,
    {
        let page = reservation.page;
        let cancel = reservation.token.cancellation().clone();
        let mut pending = Unsettled { pager: self, reservation: Some(reservation) };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = fetch(page, cancel.clone()) => result,
        };

        if let Some(reservation) = pending.reservation.take() {
            self.settle(reservation, outcome);
        }
    }

    fn settle(&self, reservation: Reservation, outcome: Result<ListPage, ApiError>) {
        let Reservation { page, prior, token } = reservation;

        self.state.send_if_modified(|state| {
            if !self.slot.is_current(&token) {
                tracing::debug!(page, generation = token.generation(), "discarding stale page response");
                return false;
            }
            self.slot.finish(&token);

            match outcome {
                Ok(list) => {
                    if page == 1 {
                        state.items = list.results;
                    } else {
                        state.items.extend(list.results);
                    }
                    state.current_page = page;
                    state.total_pages = list.total_pages;
                    state.status = LoadStatus::Success;
                    state.error = None;
                }
                Err(ApiError::Cancelled) => {
                    *state = prior;
                }
                Err(e) => {
                    tracing::debug!(page, error = %e, "page request failed");
                    state.status = LoadStatus::Error;
                    state.error = Some(e.to_string());
                }
            }
            true
        });
    }

    fn abandon(&self, reservation: Reservation) {
        let Reservation { page, prior, token } = reservation;
        token.cancellation().cancel();

        self.state.send_if_modified(|state| {
            if !self.slot.is_current(&token) {
                return false;
            }
            self.slot.finish(&token);

            tracing::debug!(page, "page request dropped before settling; restoring previous state");
            *state = prior;
            true
        });
    }

    /// Cancel in-flight work without touching the published state.
    pub(crate) fn cancel(&self) {
        self.slot.cancel();
    }

    /// Cancel in-flight work and publish an empty `Idle` state.
    pub(crate) fn reset(&self) {
        self.state.send_if_modified(|state| {
            self.slot.cancel();
            if *state == ListState::default() {
                return false;
            }
            *state = ListState::default();
            true
        });
    }
}
