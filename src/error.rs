//! Error types for headshot generation.

use std::time::Duration;

/// Errors that can occur while producing a headshot.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// The source photo could not be read from disk.
    #[error("failed to read photo: {0}")]
    Read(std::io::Error),

    /// An action was invoked without its required prior state.
    #[error("{0}")]
    Precondition(String),

    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request was rejected by the model's safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The model answered without an inline image part.
    #[error("the model returned no image")]
    NoImageReturned,

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., saving the result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StudioError {
    /// Returns true if this error came from the transport layer
    /// (network, auth, quota) rather than from local state or an
    /// imageless response.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Auth(_) | Self::Api { .. } | Self::RateLimited { .. } | Self::Network(_)
        )
    }

    /// The single user-facing message shown in the error view.
    ///
    /// Every failure kind is reported through this mapping; no error is
    /// fatal and the user may retry the action immediately.
    pub fn user_message(&self) -> String {
        match self {
            Self::Read(_) => "Could not read the photo. Check the file and try again.".into(),
            Self::Precondition(msg) => msg.clone(),
            Self::Auth(_) => {
                "Authentication failed. Check that GEMINI_API_KEY is set and valid.".into()
            }
            Self::RateLimited { .. } => "The service is busy. Wait a moment and retry.".into(),
            Self::Api { .. } | Self::Network(_) => {
                "The generation service could not be reached. Try again.".into()
            }
            Self::ContentBlocked(_) => {
                "The request was declined by the model's safety filters.".into()
            }
            Self::NoImageReturned => {
                "The model did not return an image. Adjust your options and try again.".into()
            }
            Self::InvalidRequest(msg) => msg.clone(),
            Self::Decode(_) | Self::Json(_) => {
                "The service returned an unreadable response. Try again.".into()
            }
            Self::Io(_) => "Could not write the result to disk.".into(),
        }
    }
}

/// Result type alias for headshot generation operations.
pub type Result<T> = std::result::Result<T, StudioError>;

/// Parses a `Retry-After` header value in seconds, if present.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Reduces an API error body to a single displayable line.
///
/// Prefers the `error.message` field of a JSON body, collapses whitespace,
/// and truncates oversized bodies so raw HTML or stack traces never reach
/// the user.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    const MAX_LEN: usize = 300;

    let message = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| text.to_string());

    let collapsed = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.len() > MAX_LEN {
        let mut end = MAX_LEN;
        while !collapsed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &collapsed[..end])
    } else if collapsed.is_empty() {
        "no error detail provided".into()
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    #[test]
    fn test_is_transport() {
        assert!(StudioError::Auth("bad key".into()).is_transport());
        assert!(StudioError::RateLimited { retry_after: None }.is_transport());
        assert!(StudioError::Api {
            status: 500,
            message: "boom".into()
        }
        .is_transport());

        assert!(!StudioError::NoImageReturned.is_transport());
        assert!(!StudioError::Precondition("upload a photo first".into()).is_transport());
        assert!(!StudioError::ContentBlocked("safety".into()).is_transport());
    }

    #[test]
    fn test_no_image_has_distinct_user_message() {
        let empty = StudioError::NoImageReturned.user_message();
        let transport = StudioError::Api {
            status: 503,
            message: "unavailable".into(),
        }
        .user_message();
        assert_ne!(empty, transport);
        assert!(empty.contains("did not return an image"));
    }

    #[test]
    fn test_precondition_message_passes_through() {
        let err = StudioError::Precondition("Upload a photo before generating.".into());
        assert_eq!(err.user_message(), "Upload a photo before generating.");
        assert_eq!(err.to_string(), "Upload a photo before generating.");
    }

    #[test]
    fn test_error_display() {
        let err = StudioError::Api {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Not found");
        assert_eq!(
            StudioError::NoImageReturned.to_string(),
            "the model returned no image"
        );
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));
        assert_eq!(parse_retry_after(&headers), Some(30));

        let empty = HeaderMap::new();
        assert_eq!(parse_retry_after(&empty), None);
    }

    #[test]
    fn test_sanitize_prefers_json_error_message() {
        let body = r#"{"error": {"code": 403, "message": "API key not valid"}}"#;
        assert_eq!(sanitize_error_message(body), "API key not valid");
    }

    #[test]
    fn test_sanitize_collapses_and_truncates() {
        let body = "a\n  b\t c";
        assert_eq!(sanitize_error_message(body), "a b c");

        let long = "x".repeat(500);
        let sanitized = sanitize_error_message(&long);
        assert!(sanitized.len() <= 304);
        assert!(sanitized.ends_with('…'));
    }
}
