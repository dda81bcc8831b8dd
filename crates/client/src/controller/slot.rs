//! Single-request slot with generation tracking.
//!
//! Each controller owns one `RequestSlot`. Beginning a request cancels the
//! previous one and bumps the generation, so a response that arrives late can
//! be recognised and dropped.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

/// Handle for one issued request.
#[derive(Debug, Clone)]
pub struct InFlightToken {
    generation: u64,
    cancel: CancellationToken,
}

impl InFlightToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Token passed down to the gateway and transport.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[derive(Debug, Default)]
struct SlotState {
    generation: u64,
    active: Option<CancellationToken>,
}

/// At most one active request, identified by generation.
#[derive(Debug, Default)]
pub struct RequestSlot {
    inner: Mutex<SlotState>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cancel whatever is in flight and issue a token for a new request.
    pub fn begin(&self) -> InFlightToken {
        let mut slot = self.lock();
        if let Some(previous) = slot.active.take() {
            previous.cancel();
        }
        slot.generation += 1;

        let cancel = CancellationToken::new();
        slot.active = Some(cancel.clone());

        InFlightToken { generation: slot.generation, cancel }
    }

    /// Cancel the in-flight request, if any. Its response will be stale.
    pub fn cancel(&self) {
        let mut slot = self.lock();
        if let Some(active) = slot.active.take() {
            active.cancel();
        }
        slot.generation += 1;
    }

    /// Whether `token` belongs to the most recently issued request.
    pub fn is_current(&self, token: &InFlightToken) -> bool {
        self.lock().generation == token.generation
    }

    /// Release the slot once the current request has settled.
    pub fn finish(&self, token: &InFlightToken) {
        let mut slot = self.lock();
        if slot.generation == token.generation {
            slot.active = None;
        }
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn is_busy(&self) -> bool {
        self.lock().active.is_some()
    }
}

impl Drop for RequestSlot {
    fn drop(&mut self) {
        let slot = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(active) = slot.active.take() {
            active.cancel();
        }
    }
}
