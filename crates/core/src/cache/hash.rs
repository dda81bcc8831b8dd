//! Request fingerprinting.
//!
//! A fingerprint identifies a logical request, not a URL. It is the logical key
//! of the operation followed by a SHA-256 digest of its parameters in canonical
//! (name-sorted JSON) form:
//!
//! ```text
//! movies:now_playing:5c3a...e1
//! ```
//!
//! Because the logical key is kept verbatim as a prefix, every page or variant
//! of one operation can be dropped with a single prefix invalidation.

use std::collections::BTreeMap;
use std::fmt;

use sha2::{Digest, Sha256};

/// Request parameters, ordered by name.
///
/// Values are stored in their string form so `{page: 1}` and `{page: "1"}`
/// identify the same request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams(BTreeMap<String, String>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, replacing any previous value under the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.0.insert(name.into(), value.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.to_string())).collect())
    }
}

/// Deterministic cache identity for a logical request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of `logical_key` called with `params`.
    pub fn compute(logical_key: &str, params: &RequestParams) -> Self {
        if params.is_empty() {
            return Self(logical_key.to_string());
        }

        // BTreeMap serializes with sorted keys and escaped values.
        let canonical = serde_json::to_string(&params.0).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());

        Self(format!("{logical_key}:{}", hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this fingerprint belongs to the given logical key.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_ignores_insertion_order() {
        let p1 = RequestParams::new().with("query", "batman").with("page", 2);
        let p2 = RequestParams::new().with("page", 2).with("query", "batman");

        assert_eq!(Fingerprint::compute("search:movies", &p1), Fingerprint::compute("search:movies", &p2));
    }

    #[test]
    fn test_fingerprint_value_not_type() {
        let numeric = RequestParams::new().with("page", 1);
        let text = RequestParams::new().with("page", "1");
        assert_eq!(Fingerprint::compute("k", &numeric), Fingerprint::compute("k", &text));
    }

    #[test]
    fn test_fingerprint_different_params() {
        let key = "movies:now_playing";
        let page1 = Fingerprint::compute(key, &RequestParams::new().with("page", 1));
        let page2 = Fingerprint::compute(key, &RequestParams::new().with("page", 2));
        assert_ne!(page1, page2);

        let q1 = Fingerprint::compute("search:movies", &RequestParams::new().with("query", "a").with("page", 1));
        let q2 = Fingerprint::compute("search:movies", &RequestParams::new().with("query", "b").with("page", 1));
        assert_ne!(q1, q2);
    }

    #[test]
    fn test_fingerprint_boundaries_are_unambiguous() {
        let split_one = RequestParams::new().with("a", "1&b=2");
        let split_two = RequestParams::new().with("a", "1").with("b", "2");
        assert_ne!(Fingerprint::compute("k", &split_one), Fingerprint::compute("k", &split_two));
    }

    #[test]
    fn test_fingerprint_format() {
        let fp = Fingerprint::compute("movies:detail", &RequestParams::new().with("movieId", 550));
        let (prefix, digest) = fp.as_str().rsplit_once(':').unwrap();
        assert_eq!(prefix, "movies:detail");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(fp.starts_with("movies:detail"));
    }

    #[test]
    fn test_fingerprint_without_params_is_the_key() {
        assert_eq!(Fingerprint::compute("genres", &RequestParams::new()).as_str(), "genres");
    }

    #[test]
    fn test_params_from_iter() {
        let params: RequestParams = [("page", 3), ("movieId", 7)].into_iter().collect();
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("movieId", "7"), ("page", "3")]);
    }
}
