//! Single-record controller for a movie detail view.

use std::sync::Arc;

use marquee_core::{ApiError, LoadStatus, MovieDetails};
use serde::Serialize;
use tokio::sync::watch;

use super::slot::{InFlightToken, RequestSlot};
use crate::gateway::Catalog;

/// Published state of a detail view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailState {
    /// Id of the requested movie, set as soon as a load starts.
    pub movie_id: Option<u64>,
    pub movie: Option<MovieDetails>,
    pub status: LoadStatus,
    pub error: Option<String>,
}

/// An issued detail request and the state published before it.
struct Claim {
    token: InFlightToken,
    prior: DetailState,
}

/// Rolls back a claim whose load future is dropped before settling.
struct Unsettled<'a> {
    controller: &'a DetailController,
    claim: Option<Claim>,
}

impl Drop for Unsettled<'_> {
    fn drop(&mut self) {
        if let Some(claim) = self.claim.take() {
            self.controller.abandon(claim);
        }
    }
}

/// Loads one movie record at a time.
///
/// Loading another id cancels the previous request and clears the shown
/// record. A failed reload of the same id keeps the record on screen.
pub struct DetailController {
    catalog: Arc<dyn Catalog>,
    state: watch::Sender<DetailState>,
    slot: RequestSlot,
}

impl std::fmt::Debug for DetailController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailController").field("state", &*self.state.borrow()).finish_non_exhaustive()
    }
}

impl DetailController {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        let (state, _) = watch::channel(DetailState::default());
        Self { catalog, state, slot: RequestSlot::new() }
    }

    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    /// Load the record for `movie_id`.
    ///
    /// Dropping the future before it completes cancels the request and
    /// restores the previously published state.
    pub async fn load(&self, movie_id: u64) {
        let mut claimed = None;
        self.state.send_modify(|state| {
            claimed = Some(Claim { token: self.slot.begin(), prior: state.clone() });
            if state.movie_id != Some(movie_id) {
                state.movie = None;
            }
            state.movie_id = Some(movie_id);
            state.status = LoadStatus::Loading;
            state.error = None;
        });
        let mut pending = Unsettled { controller: self, claim: claimed };
        let Some(cancel) = pending.claim.as_ref().map(|c| c.token.cancellation().clone()) else {
            return;
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = self.catalog.details(movie_id, &cancel) => result,
        };

        if let Some(claim) = pending.claim.take() {
            self.settle(movie_id, claim, outcome);
        }
    }

    fn settle(&self, movie_id: u64, claim: Claim, outcome: Result<MovieDetails, ApiError>) {
        let Claim { token, prior } = claim;

        self.state.send_if_modified(|state| {
            if !self.slot.is_current(&token) {
                tracing::debug!(movie_id, generation = token.generation(), "discarding stale detail response");
                return false;
            }
            self.slot.finish(&token);

            match outcome {
                Ok(details) => {
                    state.movie = Some(details);
                    state.status = LoadStatus::Success;
                }
                Err(ApiError::Cancelled) => *state = prior,
                Err(e) => {
                    tracing::debug!(movie_id, error = %e, "detail request failed");
                    state.status = LoadStatus::Error;
                    state.error = Some(e.to_string());
                }
            }
            true
        });
    }

    fn abandon(&self, claim: Claim) {
        let Claim { token, prior } = claim;
        token.cancellation().cancel();

        self.state.send_if_modified(|state| {
            if !self.slot.is_current(&token) {
                return false;
            }
            self.slot.finish(&token);

            tracing::debug!(movie_id = ?state.movie_id, "detail request dropped; restoring previous state");
            *state = prior;
            true
        });
    }

    /// Reload the current record. No-op before the first `load`.
    pub async fn refetch(&self) {
        let current = self.state.borrow().movie_id;
        if let Some(movie_id) = current {
            self.load(movie_id).await;
        }
    }

    /// Cancel in-flight work and return to an empty idle state.
    pub fn reset(&self) {
        self.state.send_modify(|state| {
            self.slot.cancel();
            *state = DetailState::default();
        });
    }
}
