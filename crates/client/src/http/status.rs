//! Mapping of transport failures and HTTP statuses onto `ApiError`.

use marquee_core::ApiError;
use reqwest::StatusCode;
use serde::Deserialize;

/// Error body returned by the catalog API on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    status_message: Option<String>,
}

/// Classify a non-success response.
///
/// Recognized statuses map to their own variant; anything else becomes
/// `Unknown`, carrying the upstream `status_message` when the body has one.
pub fn classify_status(status: StatusCode, body: &[u8]) -> ApiError {
    match status.as_u16() {
        401 => ApiError::Unauthorized,
        404 => ApiError::NotFound,
        429 => ApiError::RateLimited,
        code @ 500..=599 => ApiError::ServerError { status: code },
        _ => {
            let message = serde_json::from_slice::<ErrorBody>(body)
                .ok()
                .and_then(|b| b.status_message)
                .unwrap_or_default();
            ApiError::unknown(message)
        }
    }
}

/// Classify an error raised by reqwest before a status was available, or while
/// reading the body.
pub fn classify_transport(err: &reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_connect() || err.is_request() {
        ApiError::NetworkUnreachable(err.to_string())
    } else if err.is_body() || err.is_decode() {
        ApiError::unknown(format!("failed to read response: {err}"))
    } else {
        ApiError::unknown(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_statuses() {
        assert_eq!(classify_status(StatusCode::UNAUTHORIZED, b""), ApiError::Unauthorized);
        assert_eq!(classify_status(StatusCode::NOT_FOUND, b""), ApiError::NotFound);
        assert_eq!(classify_status(StatusCode::TOO_MANY_REQUESTS, b""), ApiError::RateLimited);
    }

    #[test]
    fn test_classify_any_5xx() {
        for code in [500u16, 502, 503, 504, 507, 599] {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(classify_status(status, b""), ApiError::ServerError { status: code });
        }
    }

    #[test]
    fn test_classify_unknown_uses_status_message() {
        let body = br#"{"status_code": 22, "status_message": "Invalid page.", "success": false}"#;
        assert_eq!(classify_status(StatusCode::UNPROCESSABLE_ENTITY, body), ApiError::Unknown("Invalid page.".into()));
    }

    #[test]
    fn test_classify_unknown_without_body() {
        let err = classify_status(StatusCode::FORBIDDEN, b"<html>denied</html>");
        assert_eq!(err.to_string(), marquee_core::error::UNKNOWN_ERROR_MESSAGE);
    }
}
