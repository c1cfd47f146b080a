//! Configuration management for the registry, vector search, and telemetry.
//!
//! [`schema`] holds the strongly typed settings with their defaults and
//! [`loader`] fills them from environment variables or JSON files.

#![warn(missing_docs, clippy::pedantic)]

pub mod loader;
pub mod schema;

use thiserror::Error;

pub use schema::{RegistrySettings, TelemetrySettings, ToolhubSettings, VectorSearchSettings};

/// Errors produced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration: {source}")]
    Io {
        /// Source [`std::io::Error`].
        #[from]
        source: std::io::Error,
    },
    /// Configuration file was not valid JSON for the expected schema.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source [`serde_json::Error`].
        #[from]
        source: serde_json::Error,
    },
    /// A configuration value was present but unusable.
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue {
        /// Setting or environment variable name.
        key: String,
        /// Human-readable reason for rejection.
        reason: String,
    },
}

impl ConfigError {
    /// Convenience constructor for [`ConfigError::InvalidValue`].
    #[must_use]
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
