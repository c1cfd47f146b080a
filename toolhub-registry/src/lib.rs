//! Action registry, tool catalog, and semantic discovery.
//!
//! The pipeline runs leaves first:
//!
//! 1. [`RegistryBuilder`] introspects caller-supplied providers into an
//!    immutable [`ActionRegistry`] with stable, name-derived ids.
//! 2. [`generate_catalog`] flattens every action into a [`ToolSpec`] with a
//!    deterministic embedding text and builds category/provider/tag indexes.
//! 3. [`VectorSearchService`] embeds and upserts the catalog into a vector
//!    index and answers filtered similarity queries.
//! 4. [`RegistryManager`] orchestrates the three and offers offline keyword
//!    search over the catalog.
//! 5. [`ToolGateway`] exposes the two caller-facing tools, `search_tools`
//!    and `execute_tool`.

#![warn(missing_docs, clippy::pedantic)]

pub mod builder;
pub mod catalog;
mod error;
pub mod gateway;
mod heuristics;
pub mod manager;
pub mod model;
pub mod search;

pub use builder::RegistryBuilder;
pub use catalog::{
    CatalogMetadata, ProviderSummary, ToolSpec, ToolSpecCatalog, ToolSpecMetadata, embedding_text,
    generate_catalog, render_parameters,
};
pub use error::{RegistryError, RegistryResult, SearchErrorCode, SearchResult, VectorSearchError};
pub use gateway::{
    ErrorEnvelope, ExecuteToolRequest, ExecuteToolResponse, GatewayError, GatewayState,
    SearchToolsRequest, SearchToolsResponse, ToolDescriptor, ToolGateway,
};
pub use manager::{BuildOutcome, BuildStats, RegistryManager};
pub use model::{
    ActionMetadata, ActionRegistry, ProviderMetadata, RegistryAction, RegistryActionProvider,
    RegistryMetadata,
};
pub use search::{
    ActionMatch, HealthReport, HealthStatus, IndexedAction, SearchFilters, SearchRequest,
    SyncReport, VectorSearchService, normalize_score,
};
