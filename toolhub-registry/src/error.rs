//! Error types for the registry pipeline.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable code attached to every [`VectorSearchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchErrorCode {
    /// Missing credentials or invalid settings; raised before any network call.
    #[serde(rename = "CONFIGURATION_ERROR")]
    Configuration,
    /// Index could not be created or never became ready.
    #[serde(rename = "INITIALIZATION_ERROR")]
    Initialization,
    /// Embedding call failed or returned the wrong number of vectors.
    #[serde(rename = "EMBEDDING_ERROR")]
    Embedding,
    /// Upsert failed part-way through a sync.
    #[serde(rename = "SYNC_ERROR")]
    Sync,
    /// Namespace clear failed.
    #[serde(rename = "CLEAR_ERROR")]
    Clear,
    /// Similarity query or statistics call failed.
    #[serde(rename = "QUERY_ERROR")]
    Query,
    /// Fetching stored vectors failed.
    #[serde(rename = "FETCH_ERROR")]
    Fetch,
    /// Deleting vectors by id failed.
    #[serde(rename = "DELETE_ERROR")]
    Delete,
    /// The request itself was malformed.
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
}

impl SearchErrorCode {
    /// Returns the wire code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::Initialization => "INITIALIZATION_ERROR",
            Self::Embedding => "EMBEDDING_ERROR",
            Self::Sync => "SYNC_ERROR",
            Self::Clear => "CLEAR_ERROR",
            Self::Query => "QUERY_ERROR",
            Self::Fetch => "FETCH_ERROR",
            Self::Delete => "DELETE_ERROR",
            Self::Validation => "VALIDATION_ERROR",
        }
    }
}

impl Display for SearchErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure raised by the vector search service.
///
/// Remote failures are never retried; callers decide whether to try again.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct VectorSearchError {
    code: SearchErrorCode,
    message: String,
}

impl VectorSearchError {
    /// Creates an error with `code`.
    #[must_use]
    pub fn new(code: SearchErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Returns the machine-readable code.
    #[must_use]
    pub const fn code(&self) -> SearchErrorCode {
        self.code
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn wrap(code: SearchErrorCode, context: &str) -> impl FnOnce(toolhub_vector::StoreError) -> Self + '_ {
        move |err| Self::new(code, format!("{context}: {err}"))
    }
}

/// Result alias for vector search operations.
pub type SearchResult<T> = Result<T, VectorSearchError>;

/// Errors surfaced by the registry builder and manager.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Every supplied provider failed to register.
    #[error("no providers registered successfully ({attempted} attempted)")]
    NoProviders {
        /// Number of providers supplied to the build.
        attempted: usize,
    },

    /// An operation needed a registry but none has been built yet.
    #[error("registry has not been built")]
    NotBuilt,

    /// Vector index operation failed.
    #[error(transparent)]
    Search(#[from] VectorSearchError),

    /// Catalog serialisation failed.
    #[error("failed to serialise catalog: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialize_as_wire_strings() {
        for code in [SearchErrorCode::Configuration, SearchErrorCode::Fetch, SearchErrorCode::Validation] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, serde_json::Value::from(code.as_str()));
        }
    }

    #[test]
    fn display_leads_with_code() {
        let err = VectorSearchError::new(SearchErrorCode::Sync, "batch 2 failed");
        assert_eq!(err.to_string(), "SYNC_ERROR: batch 2 failed");
    }
}
