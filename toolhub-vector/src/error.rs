//! Error types for vector store clients.

use thiserror::Error;

/// Errors emitted by vector store clients.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The client was misconfigured or is missing credentials.
    #[error("vector store not configured: {reason}")]
    Configuration {
        /// Additional context for the failure.
        reason: String,
    },
    /// Transport-level failure (connection, TLS, timeout).
    #[error("vector store transport error: {reason}")]
    Transport {
        /// Additional context about the error.
        reason: String,
    },
    /// The service answered with a non-success status or an undecodable body.
    #[error("vector store returned {status}: {reason}")]
    Response {
        /// HTTP status code, `0` when the body failed to decode.
        status: u16,
        /// Body or decoder message.
        reason: String,
    },
    /// The requested index does not exist.
    #[error("index `{0}` not found")]
    NotFound(String),
    /// A record or embedding failed validation.
    #[error("invalid vector record: {0}")]
    InvalidRecord(String),
}

impl StoreError {
    /// Helper to construct configuration errors.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Helper to construct transport errors.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Helper to construct response errors.
    #[must_use]
    pub fn response(status: u16, reason: impl Into<String>) -> Self {
        Self::Response {
            status,
            reason: reason.into(),
        }
    }
}

/// Result type alias for vector store operations.
pub type StoreResult<T> = Result<T, StoreError>;
