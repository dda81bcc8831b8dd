//! Request error taxonomy shared by the transport, gateway and controllers.
//!
//! Every failure of a catalog call is normalized into one of the variants
//! below. `Cancelled` is special: it is raised when the caller abandoned the
//! request and must never be shown to a user.

/// Normalized failure of a single catalog request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request did not complete within the configured timeout.
    #[error("Request timeout. Please try again.")]
    Timeout,

    /// The remote host could not be reached.
    #[error("Network error. Please check your connection.")]
    NetworkUnreachable(String),

    /// HTTP 401, the configured credential was rejected.
    #[error("Invalid API key.")]
    Unauthorized,

    /// HTTP 404.
    #[error("Resource not found.")]
    NotFound,

    /// HTTP 429.
    #[error("Too many requests. Please try again later.")]
    RateLimited,

    /// Any HTTP 5xx.
    #[error("Server error. Please try again later.")]
    ServerError { status: u16 },

    /// Anything else: unrecognized status, undecodable body, malformed URL.
    #[error("{0}")]
    Unknown(String),

    /// The caller cancelled the request before it settled.
    #[error("request cancelled")]
    Cancelled,
}

/// Message used when an upstream failure carries no usable description.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

impl ApiError {
    /// Build an `Unknown` error, falling back to the generic message when the
    /// upstream description is empty.
    pub fn unknown(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() { ApiError::Unknown(UNKNOWN_ERROR_MESSAGE.into()) } else { ApiError::Unknown(message) }
    }

    /// True for caller-initiated cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// HTTP status associated with the error, when there is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::NotFound => Some(404),
            ApiError::RateLimited => Some(429),
            ApiError::ServerError { status } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ApiError::Timeout.to_string(), "Request timeout. Please try again.");
        assert_eq!(ApiError::Unauthorized.to_string(), "Invalid API key.");
        assert!(ApiError::ServerError { status: 503 }.to_string().contains("Server error"));
        assert_eq!(ApiError::Unknown("Invalid page".into()).to_string(), "Invalid page");
    }

    #[test]
    fn test_unknown_falls_back_to_generic_message() {
        assert_eq!(ApiError::unknown("  "), ApiError::Unknown(UNKNOWN_ERROR_MESSAGE.into()));
        assert_eq!(ApiError::unknown("bad"), ApiError::Unknown("bad".into()));
    }

    #[test]
    fn test_status_code() {
        assert_eq!(ApiError::NotFound.status_code(), Some(404));
        assert_eq!(ApiError::ServerError { status: 502 }.status_code(), Some(502));
        assert_eq!(ApiError::Timeout.status_code(), None);
    }

    #[test]
    fn test_is_cancelled() {
        assert!(ApiError::Cancelled.is_cancelled());
        assert!(!ApiError::Timeout.is_cancelled());
    }
}
