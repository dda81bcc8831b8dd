//! View-facing controllers.
//!
//! Each controller owns its published state (a `watch` channel) and one
//! `RequestSlot`. Starting a request cancels the previous one; a response that
//! arrives after it has been superseded is dropped, and `Cancelled` never
//! reaches the `Error` state.

pub mod detail;
pub mod list;
pub mod pager;
pub mod search;
pub mod slot;

#[cfg(test)]
pub(crate) mod testing;

pub use detail::{DetailController, DetailState};
pub use list::PaginatedListController;
pub use pager::ListState;
pub use search::{DEFAULT_QUIET_PERIOD, DebouncedSearchController};
pub use slot::{InFlightToken, RequestSlot};
