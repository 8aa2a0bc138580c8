//! Client error types.

use thiserror::Error;

/// Errors that can occur when calling an upstream service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an unexpected status code.
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be mapped to the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The configured base URL cannot be used.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// The service is not available.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Convenience type alias for client results.
pub type Result<T> = std::result::Result<T, ClientError>;
