//! Error types for the trip API client.
//!
//! # Design
//! Every failure the transport or the response normalizer can produce maps
//! onto one `ApiError` variant. Holders keep the last error around for the
//! error banner, so the type is `Clone` and compares by value.

use thiserror::Error;

/// Errors returned by `TripClient`, `Transport` implementations and the
/// view models built on top of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The endpoint could not be composed into a well-formed URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The reply could not be classified as an HTTP response at all.
    #[error("invalid response from server")]
    InvalidResponse,

    /// The server answered with a status outside 200..=299.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// The body matched none of the accepted shapes.
    #[error("failed to decode response: {0}")]
    DecodingError(String),

    /// DNS, connect, timeout or socket failure.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request: {0}")]
    SerializationError(String),

    #[error("an unknown error occurred")]
    Unknown,
}

impl ApiError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status } => Some(*status),
            _ => None,
        }
    }

    /// Text shown next to the retry control when a fetch fails.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NetworkError(_) => {
                "Unable to reach the server. Please check your internet connection.".to_string()
            }
            ApiError::HttpError { status: 404 } => {
                "The requested item no longer exists.".to_string()
            }
            ApiError::HttpError { status } if *status >= 500 => {
                "The server is having trouble right now. Please try again.".to_string()
            }
            ApiError::DecodingError(_) | ApiError::InvalidResponse => {
                "The server sent data we could not read.".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_only_reported_for_http_errors() {
        assert_eq!(ApiError::HttpError { status: 503 }.status(), Some(503));
        assert_eq!(ApiError::InvalidResponse.status(), None);
    }

    #[test]
    fn display_includes_status_code() {
        assert_eq!(ApiError::HttpError { status: 418 }.to_string(), "HTTP error: 418");
    }

    #[test]
    fn user_messages() {
        assert!(ApiError::NetworkError("timed out".into())
            .user_message()
            .contains("internet connection"));
        assert!(ApiError::HttpError { status: 502 }.user_message().contains("try again"));
        assert_eq!(
            ApiError::HttpError { status: 400 }.user_message(),
            "HTTP error: 400"
        );
    }
}
