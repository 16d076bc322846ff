//! Error type for the API client.
//!
//! Variants only record where a failure surfaced. Nothing in this crate
//! retries or recovers from any of them.

/// Errors returned by `ApiClient`, `Transport` and `Api` calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The transport itself failed (connect, TLS, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The query parameters could not be encoded.
    #[error("query encoding failed: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),
}

impl ApiError {
    /// HTTP status carried by the failure: the response status for
    /// `HttpStatus`, or the status reqwest attached to a `Transport` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
