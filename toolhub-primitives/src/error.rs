//! Shared error definitions for registry primitives.

use thiserror::Error;

/// Result alias used throughout the registry.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// Provider identifier failed validation.
    #[error("invalid provider id `{id}`: {reason}")]
    InvalidProviderId {
        /// The offending identifier string.
        id: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Action identifier failed validation.
    #[error("invalid action id `{id}`: {reason}")]
    InvalidActionId {
        /// The offending identifier string.
        id: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Category label did not match any known category.
    #[error("unknown action category `{0}`")]
    UnknownCategory(String),
}
