//! In-memory response cache keyed by request fingerprint.
//!
//! - Fingerprints combine a logical operation key with its sorted parameters
//! - One process-wide time-to-live, enforced lazily on read
//! - Exact, prefix, and whole-cache invalidation

pub mod hash;
pub mod store;

pub use hash::{Fingerprint, RequestParams};
pub use store::{CacheEntry, CacheStats, DEFAULT_TTL, ResponseCache};
