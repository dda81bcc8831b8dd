//! Outbound URL construction.
//!
//! The credential always goes first in the query string, followed by the
//! caller's parameters in the order given. Parameters are never reordered.

use marquee_core::ApiError;
use url::Url;

/// Query parameter carrying the static credential.
pub const API_KEY_PARAM: &str = "api_key";

/// Join `base` and `path`, then append the credential and `query`.
///
/// `base` may or may not end with a slash; `path` may or may not start with one.
pub fn build_url(base: &str, api_key: &str, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
    let joined = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));

    let mut url = Url::parse(&joined).map_err(|e| ApiError::unknown(format!("invalid request URL: {e}")))?;

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair(API_KEY_PARAM, api_key);
        for (name, value) in query {
            pairs.append_pair(name, value);
        }
    }

    Ok(url)
}

/// The URL without its query string, safe to log.
pub fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_credential_first_then_given_order() {
        let url = build_url(
            "https://api.themoviedb.org/3",
            "secret",
            "/search/movie",
            &[("query", "batman".into()), ("page", "2".into()), ("language", "en-US".into())],
        )
        .unwrap();

        assert_eq!(url.path(), "/3/search/movie");
        assert_eq!(url.query(), Some("api_key=secret&query=batman&page=2&language=en-US"));
    }

    #[test]
    fn test_build_url_slash_handling() {
        let a = build_url("https://api.example.com/3/", "k", "/movie/550", &[]).unwrap();
        let b = build_url("https://api.example.com/3", "k", "movie/550", &[]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "https://api.example.com/3/movie/550?api_key=k");
    }

    #[test]
    fn test_build_url_encodes_values() {
        let url = build_url("https://api.example.com", "k", "/search/movie", &[("query", "fast & furious".into())])
            .unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[1], ("query".to_string(), "fast & furious".to_string()));
    }

    #[test]
    fn test_build_url_invalid_base() {
        let result = build_url("not a url", "k", "/movie/popular", &[]);
        assert!(matches!(result, Err(ApiError::Unknown(_))));
    }

    #[test]
    fn test_redacted_drops_credential() {
        let url = build_url("https://api.example.com/3", "secret", "/movie/popular", &[("page", "1".into())]).unwrap();
        let shown = redacted(&url);
        assert_eq!(shown, "https://api.example.com/3/movie/popular");
        assert!(!shown.contains("secret"));
    }
}
