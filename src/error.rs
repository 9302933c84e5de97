//! Error types for the rendering pipeline and the fetcher.

use thiserror::Error;

/// Errors produced while fetching, normalizing or binding dashboard charts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashError {
    /// A duration was negative, NaN or infinite.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An input array does not match the fixed policy shape.
    #[error("shape mismatch: expected {expected} entries, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// The response body could not be decoded as a JSON object.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The document could not be obtained: network failure, timeout,
    /// non-200 status or an unreadable file.
    #[error("transport error: {0}")]
    Transport(String),

    /// The rendering surface id is not part of the current layout.
    #[error("surface not found: {0}")]
    SurfaceNotFound(String),
}

impl From<reqwest::Error> for DashError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DashError::Transport("request timed out".to_string())
        } else if err.is_decode() {
            DashError::Decode(err.to_string())
        } else {
            DashError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DashError {
    fn from(err: serde_json::Error) -> Self {
        DashError::Decode(err.to_string())
    }
}
