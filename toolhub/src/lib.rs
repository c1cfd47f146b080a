//! Tool registry and semantic discovery engine.
//!
//! Bundles the toolhub crates behind feature flags. With the defaults a
//! deployment looks like this:
//!
//! ```ignore
//! let search = VectorSearchService::from_settings(settings.vector)?;
//! let manager = RegistryManager::new(settings.registry).with_search(Arc::new(search));
//! let mut gateway = ToolGateway::new(manager, providers);
//! gateway.initialize().await?;
//! let hits = gateway.search_tools(SearchToolsRequest::new("swap sol for usdc")).await?;
//! ```

#![warn(missing_docs, clippy::pedantic)]

/// Identifiers, networks, and categories.
pub use toolhub_primitives as primitives;

/// Provider contract, parameter extraction, and argument validation.
pub use toolhub_actions as actions;

/// Settings and loaders (enabled by `config` feature).
#[cfg(feature = "config")]
pub use toolhub_config as config;

/// Tracing setup and phase timing (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use toolhub_telemetry as telemetry;

/// Vector store clients (enabled by `vector` feature).
#[cfg(feature = "vector")]
pub use toolhub_vector as vector;

/// Registry, catalog, search service, and gateway (enabled by `registry` feature).
#[cfg(feature = "registry")]
pub use toolhub_registry as registry;
