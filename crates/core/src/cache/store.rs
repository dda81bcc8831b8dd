//! In-memory response cache with a single time-to-live.
//!
//! Entries are never swept proactively. An expired entry is removed the first
//! time it is read (or probed with `contains`) and reported as a miss.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use super::hash::{Fingerprint, RequestParams};

/// Default time-to-live for cached responses (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A cached value with its timestamps.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: Instant,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        let stored_at = Instant::now();
        Self { value, stored_at, expires_at: stored_at + ttl }
    }

    /// Whether the entry is stale at `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// Point-in-time view of the cache contents and counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub fingerprints: Vec<String>,
}

/// Response cache keyed by request fingerprint.
///
/// Shared between every consumer of a gateway; all methods take `&self`.
/// Growth is unbounded apart from TTL expiry.
#[derive(Debug)]
pub struct ResponseCache<V> {
    entries: DashMap<Fingerprint, CacheEntry<V>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<V: Clone> ResponseCache<V> {
    /// Create an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self { entries: DashMap::new(), ttl, hits: AtomicU64::new(0), misses: AtomicU64::new(0) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up the value stored for `key`/`params`.
    ///
    /// Returns `None` if there is no entry or it has expired; an expired entry
    /// is deleted.
    pub fn get(&self, key: &str, params: &RequestParams) -> Option<V> {
        let fingerprint = Fingerprint::compute(key, params);

        match self.live_entry(&fingerprint) {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%fingerprint, "cache hit");
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%fingerprint, "cache miss");
                None
            }
        }
    }

    /// Whether a live entry exists, without counting a hit or miss.
    pub fn contains(&self, key: &str, params: &RequestParams) -> bool {
        self.live_entry(&Fingerprint::compute(key, params)).is_some()
    }

    /// Store `value`, replacing any previous entry for the same fingerprint.
    pub fn set(&self, key: &str, params: &RequestParams, value: V) {
        let fingerprint = Fingerprint::compute(key, params);
        self.entries.insert(fingerprint, CacheEntry::new(value, self.ttl));
    }

    /// Remove exactly one entry.
    pub fn invalidate(&self, key: &str, params: &RequestParams) {
        self.entries.remove(&Fingerprint::compute(key, params));
    }

    /// Remove every entry whose fingerprint starts with `prefix`.
    ///
    /// Returns the number of removed entries.
    pub fn invalidate_by_prefix(&self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|fingerprint, _| !fingerprint.starts_with(prefix));
        let removed = before.saturating_sub(self.entries.len());
        tracing::debug!(prefix, removed, "invalidated cache prefix");
        removed
    }

    /// Remove everything.
    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let mut fingerprints: Vec<String> = self.entries.iter().map(|e| e.key().to_string()).collect();
        fingerprints.sort();

        CacheStats {
            size: fingerprints.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fingerprints,
        }
    }

    fn live_entry(&self, fingerprint: &Fingerprint) -> Option<V> {
        let now = Instant::now();
        if self.entries.remove_if(fingerprint, |_, entry| entry.is_expired_at(now)).is_some() {
            tracing::debug!(%fingerprint, "evicted expired cache entry");
            return None;
        }

        self.entries.get(fingerprint).map(|entry| entry.value.clone())
    }
}
