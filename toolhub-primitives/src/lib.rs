//! Core shared types for the toolhub action registry.

#![warn(missing_docs, clippy::pedantic)]

mod category;
mod error;
mod ids;
mod network;

/// Coarse functional grouping for providers and actions.
pub use category::ActionCategory;
/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Stable identifiers for providers and actions.
pub use ids::{ActionId, ProviderId, slugify};
/// Blockchain network descriptor consumed by providers.
pub use network::Network;
