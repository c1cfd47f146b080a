//! Strongly typed configuration schemas.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use toolhub_primitives::{ActionCategory, Network};

use crate::{ConfigError, ConfigResult};

/// Default vector index name.
pub const DEFAULT_INDEX_NAME: &str = "agentkit-tools-v1";
/// Default namespace inside the vector index.
pub const DEFAULT_NAMESPACE: &str = "production";
/// Default hosted embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "multilingual-e5-large";
/// Default embedding dimensionality.
pub const DEFAULT_DIMENSION: usize = 1024;
/// Default number of records embedded and upserted per request.
pub const DEFAULT_BATCH_SIZE: usize = 50;
/// Hard cap on results returned by a single query.
pub const MAX_TOP_K: usize = 50;

/// Aggregate configuration for a toolhub deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolhubSettings {
    /// Vector index and embedding configuration.
    #[serde(default)]
    pub vector: VectorSearchSettings,

    /// Registry builder overrides.
    #[serde(default)]
    pub registry: RegistrySettings,

    /// Logging configuration.
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

/// Vector search service configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorSearchSettings {
    /// API key for the hosted vector store. Required by the hosted client.
    pub api_key: Option<String>,

    /// Index holding the tool vectors.
    pub index_name: String,

    /// Namespace isolating this deployment's vectors.
    pub namespace: String,

    /// Embedding model identifier.
    pub embedding_model: String,

    /// Embedding dimensionality used when creating the index.
    pub dimension: usize,

    /// Similarity metric used when creating the index.
    pub metric: String,

    /// Cloud used for serverless index creation.
    pub cloud: String,

    /// Region used for serverless index creation.
    pub region: String,

    /// Records per embed/upsert request.
    pub batch_size: usize,

    /// Upper bound applied to every query's `top_k`.
    pub max_top_k: usize,

    /// Readiness polls after index creation before giving up.
    pub readiness_attempts: u32,

    /// Delay between readiness polls, in milliseconds.
    pub readiness_delay_ms: u64,

    /// Clear the namespace before each sync.
    pub clear_before_sync: bool,

    /// Base URL of the control plane (index management and embeddings).
    pub control_plane_url: String,

    /// Per-request timeout, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for VectorSearchSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            index_name: DEFAULT_INDEX_NAME.to_owned(),
            namespace: DEFAULT_NAMESPACE.to_owned(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_owned(),
            dimension: DEFAULT_DIMENSION,
            metric: "cosine".to_owned(),
            cloud: "aws".to_owned(),
            region: "us-east-1".to_owned(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_top_k: MAX_TOP_K,
            readiness_attempts: 30,
            readiness_delay_ms: 1_000,
            clear_before_sync: false,
            control_plane_url: "https://api.pinecone.io/".to_owned(),
            request_timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for VectorSearchSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorSearchSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("index_name", &self.index_name)
            .field("namespace", &self.namespace)
            .field("embedding_model", &self.embedding_model)
            .field("dimension", &self.dimension)
            .field("batch_size", &self.batch_size)
            .field("max_top_k", &self.max_top_k)
            .finish_non_exhaustive()
    }
}

impl VectorSearchSettings {
    /// Supplies an explicit API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Overrides the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Overrides the embedding dimensionality.
    #[must_use]
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Checks numeric settings that would otherwise fail deep inside a sync.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a size or name is zero/empty.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.index_name.trim().is_empty() {
            return Err(ConfigError::invalid_value("index_name", "must not be empty"));
        }
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::invalid_value("namespace", "must not be empty"));
        }
        if self.dimension == 0 {
            return Err(ConfigError::invalid_value("dimension", "must be greater than zero"));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::invalid_value("batch_size", "must be greater than zero"));
        }
        if self.max_top_k == 0 || self.max_top_k > MAX_TOP_K {
            return Err(ConfigError::invalid_value(
                "max_top_k",
                format!("must be between 1 and {MAX_TOP_K}"),
            ));
        }
        Ok(())
    }
}

/// Overrides applied by the registry builder on top of its heuristics.
///
/// Provider keys are provider names as reported by the provider itself;
/// action keys are either the full action id (`provider:action`) or the bare
/// action name, the id taking precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Explicit provider identifiers.
    pub provider_ids: HashMap<String, String>,

    /// Explicit provider categories.
    pub provider_categories: HashMap<String, ActionCategory>,

    /// Extra provider tags.
    pub provider_tags: HashMap<String, Vec<String>>,

    /// Explicit provider network lists, bypassing `supports_network` probing.
    pub provider_networks: HashMap<String, Vec<Network>>,

    /// Explicit wallet requirements per provider.
    pub wallet_requirements: HashMap<String, bool>,

    /// Explicit action categories.
    pub action_categories: HashMap<String, ActionCategory>,

    /// Extra action tags.
    pub action_tags: HashMap<String, Vec<String>>,

    /// Explicit action network lists; actions otherwise inherit the provider's.
    pub action_networks: HashMap<String, Vec<Network>>,

    /// Networks probed through `supports_network`.
    pub candidate_networks: Vec<Network>,

    /// Push the generated catalog to the vector index after each build.
    pub sync_enabled: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            provider_ids: HashMap::new(),
            provider_categories: HashMap::new(),
            provider_tags: HashMap::new(),
            provider_networks: HashMap::new(),
            wallet_requirements: HashMap::new(),
            action_categories: HashMap::new(),
            action_tags: HashMap::new(),
            action_networks: HashMap::new(),
            candidate_networks: Network::well_known(),
            sync_enabled: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,

    /// Include event targets in log lines.
    pub with_target: bool,

    /// Emit ANSI colours.
    pub ansi: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            with_target: false,
            ansi: true,
        }
    }
}
