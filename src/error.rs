//! Error types for stowage.

use thiserror::Error;

/// Common error type for stowage operations.
#[derive(Error, Debug)]
pub enum StowageError {
    /// Network error: the request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The backend responded with a failure status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by the backend.
        body: String,
    },

    /// A response body could not be decoded into the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Client-detected name collision (advisory; the backend stays authoritative).
    #[error("name conflict: {0}")]
    Conflict(String),

    /// Local precondition failure; no network call was issued.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Validation error for configuration or user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StowageError {
    /// Returns the HTTP status code if this is an `Http` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            StowageError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if this is an `Http` error with status 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

// Conversion from reqwest errors. A response that arrived but carried a
// failure status is mapped by the callers, which still hold the body; only
// transport-level failures end up here.
impl From<reqwest::Error> for StowageError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StowageError::Decode(e.to_string())
        } else {
            StowageError::Network(e.to_string())
        }
    }
}

/// Result type alias for stowage operations.
pub type Result<T> = std::result::Result<T, StowageError>;
