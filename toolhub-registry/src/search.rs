//! Vector search service.
//!
//! Owns the remote index lifecycle: create-if-absent with a bounded readiness
//! poll, batched embedding and upsert of tool specs, namespace clearing, and
//! filtered top-K queries whose native cosine scores are remapped to `[0, 1]`.
//! Every remote failure surfaces as a [`VectorSearchError`] with a stable code
//! and is never retried here.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use toolhub_actions::ActionParameter;
use toolhub_config::VectorSearchSettings;
use toolhub_primitives::ActionId;
use toolhub_vector::{
    EmbedInputType, EmbeddingVector, IndexSpec, IndexStats, MetadataFilter, PineconeClient,
    VectorMatch, VectorQuery, VectorRecord, VectorStoreClient,
};
use tracing::{debug, info, warn};

use crate::catalog::ToolSpec;
use crate::error::{SearchErrorCode, SearchResult, VectorSearchError};

/// Structured search filters.
///
/// Empty lists and `None` impose no constraint. List filters match when the
/// tool carries any of the listed values, except `required_parameters`,
/// which requires every listed parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilters {
    /// Categories (`defi`, `nft`, ...).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    /// Provider names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub provider_names: Vec<String>,
    /// Network ids or protocol families.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<String>,
    /// Wallet requirement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_wallet: Option<bool>,
    /// Tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Parameters the tool must require.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_parameters: Vec<String>,
    /// Prefix the action name must start with; applied after the native query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,
}

impl SearchFilters {
    /// Returns `true` when no constraint is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Translates the index-side constraints into a native predicate.
    #[must_use]
    pub fn to_metadata_filter(&self) -> Option<MetadataFilter> {
        let mut clauses = Vec::new();
        if !self.categories.is_empty() {
            clauses.push(MetadataFilter::any_of(meta::CATEGORY, self.categories.iter().map(|c| c.to_lowercase())));
        }
        if !self.provider_names.is_empty() {
            clauses.push(MetadataFilter::any_of(meta::PROVIDER_NAME, self.provider_names.clone()));
        }
        if !self.networks.is_empty() {
            clauses.push(MetadataFilter::any_of(meta::NETWORKS, self.networks.clone()));
        }
        if let Some(requires_wallet) = self.requires_wallet {
            clauses.push(MetadataFilter::eq(meta::REQUIRES_WALLET, requires_wallet));
        }
        if !self.tags.is_empty() {
            clauses.push(MetadataFilter::any_of(meta::TAGS, self.tags.clone()));
        }
        for parameter in &self.required_parameters {
            clauses.push(MetadataFilter::any_of(meta::REQUIRED_PARAMETERS, [parameter.clone()]));
        }
        MetadataFilter::all(clauses)
    }

    /// Evaluates every constraint, including the name prefix, against a
    /// local tool spec.
    #[must_use]
    pub fn matches(&self, spec: &ToolSpec) -> bool {
        let category_ok = self.categories.is_empty()
            || self
                .categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(spec.category.as_str()));
        let provider_ok =
            self.provider_names.is_empty() || self.provider_names.contains(&spec.provider.name);
        let network_ok =
            self.networks.is_empty() || self.networks.iter().any(|n| spec.supports_network(n));
        let wallet_ok = self.requires_wallet.is_none_or(|wanted| wanted == spec.requires_wallet);
        let tags_ok = self.tags.is_empty() || self.tags.iter().any(|tag| spec.tags.contains(tag));
        let parameters_ok = self.required_parameters.iter().all(|wanted| {
            spec.required_parameters()
                .any(|name| name == wanted.as_str())
        });
        category_ok
            && provider_ok
            && network_ok
            && wallet_ok
            && tags_ok
            && parameters_ok
            && self.matches_name_prefix(&spec.name)
    }

    fn matches_name_prefix(&self, name: &str) -> bool {
        self.name_prefix
            .as_deref()
            .is_none_or(|prefix| name.starts_with(prefix))
    }
}

/// Similarity search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Natural-language query.
    pub query: String,
    /// Desired number of results; clamped to `[1, max_top_k]`.
    pub top_k: usize,
    /// Structured filters.
    #[serde(default)]
    pub filters: SearchFilters,
}

impl SearchRequest {
    /// Creates an unfiltered request.
    #[must_use]
    pub fn new(query: impl Into<String>, top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
            filters: SearchFilters::default(),
        }
    }

    /// Attaches filters.
    #[must_use]
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }
}

/// Caller-facing view of an indexed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedAction {
    /// Action id.
    pub action_id: String,
    /// Action name without the provider prefix.
    pub action_name: String,
    /// Provider id.
    #[serde(default)]
    pub provider_id: String,
    /// Provider name.
    pub provider_name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Category label.
    #[serde(default)]
    pub category: String,
    /// Normalised parameters.
    #[serde(default)]
    pub parameters: Vec<ActionParameter>,
    /// Whether invoking the action needs a wallet.
    #[serde(default)]
    pub requires_wallet: bool,
    /// Network ids and protocol families.
    #[serde(default)]
    pub networks: Vec<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl IndexedAction {
    /// Builds the view from a local tool spec.
    #[must_use]
    pub fn from_spec(spec: &ToolSpec) -> Self {
        Self {
            action_id: spec.id.to_string(),
            action_name: spec.name.clone(),
            provider_id: spec.provider.id.to_string(),
            provider_name: spec.provider.name.clone(),
            description: spec.description.clone(),
            category: spec.category.as_str().to_owned(),
            parameters: spec.parameters.clone(),
            requires_wallet: spec.requires_wallet,
            networks: network_keys(spec),
            tags: spec.tags.iter().cloned().collect(),
        }
    }

    /// Decodes the view from a stored metadata payload.
    ///
    /// Returns `None` when mandatory fields are missing or malformed.
    #[must_use]
    pub fn from_metadata(metadata: &Map<String, Value>) -> Option<Self> {
        let mut payload = metadata.clone();
        let parameters = match payload.remove(meta::PARAMETERS) {
            Some(Value::String(encoded)) => serde_json::from_str::<Value>(&encoded).ok()?,
            Some(other) => other,
            None => Value::Array(Vec::new()),
        };
        payload.insert(meta::PARAMETERS.to_owned(), parameters);
        serde_json::from_value(Value::Object(payload)).ok()
    }
}

/// Search hit: the indexed action plus its normalised score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMatch {
    /// Matched action.
    #[serde(flatten)]
    pub action: IndexedAction,
    /// Relevance in `[0, 1]`.
    pub score: f32,
}

/// Outcome of a catalog sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Specs submitted.
    pub total: usize,
    /// Records the store acknowledged.
    pub upserted: usize,
    /// Batches sent.
    pub batches: usize,
    /// Whether the namespace was cleared first.
    pub cleared: bool,
}

/// Health status reported by [`VectorSearchService::health_check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Stats and embedding calls succeeded.
    Healthy,
    /// At least one probe failed.
    Unhealthy,
}

/// Health report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Overall status.
    pub status: HealthStatus,
    /// Index name.
    pub index_name: String,
    /// Namespace.
    pub namespace: String,
    /// Embedding model.
    pub embedding_model: String,
    /// Dimension of a probe embedding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_dimension: Option<usize>,
    /// Index statistics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<IndexStats>,
    /// First failure encountered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Report time.
    pub timestamp: DateTime<Utc>,
}

/// Maps a native cosine score in `[-1, 1]` onto `[0, 1]`, rounded to four
/// decimals. Non-finite input maps to `0`.
#[must_use]
pub fn normalize_score(score: f32) -> f32 {
    if !score.is_finite() {
        return 0.0;
    }
    let normalized = ((score + 1.0) / 2.0).clamp(0.0, 1.0);
    (normalized * 10_000.0).round() / 10_000.0
}

/// Metadata keys written alongside each vector.
pub mod meta {
    /// Action id.
    pub const ACTION_ID: &str = "actionId";
    /// Action name without provider prefix.
    pub const ACTION_NAME: &str = "actionName";
    /// Provider id.
    pub const PROVIDER_ID: &str = "providerId";
    /// Provider name.
    pub const PROVIDER_NAME: &str = "providerName";
    /// Description.
    pub const DESCRIPTION: &str = "description";
    /// Category label.
    pub const CATEGORY: &str = "category";
    /// JSON-encoded parameter list.
    pub const PARAMETERS: &str = "parameters";
    /// Rendered parameter string.
    pub const PARAMETER_STRING: &str = "parameterString";
    /// Names of required parameters.
    pub const REQUIRED_PARAMETERS: &str = "requiredParameters";
    /// Wallet requirement flag.
    pub const REQUIRES_WALLET: &str = "requiresWallet";
    /// Network ids and protocol families.
    pub const NETWORKS: &str = "networks";
    /// Tags.
    pub const TAGS: &str = "tags";
}

/// Builds the metadata payload stored with a spec's vector.
///
/// The store only accepts flat values, so parameters travel as a JSON string.
#[must_use]
pub fn spec_metadata(spec: &ToolSpec) -> Map<String, Value> {
    let parameters = serde_json::to_string(&spec.parameters).unwrap_or_else(|_| "[]".to_owned());
    let mut metadata = Map::new();
    metadata.insert(meta::ACTION_ID.into(), Value::from(spec.id.as_str()));
    metadata.insert(meta::ACTION_NAME.into(), Value::from(spec.name.as_str()));
    metadata.insert(meta::PROVIDER_ID.into(), Value::from(spec.provider.id.as_str()));
    metadata.insert(meta::PROVIDER_NAME.into(), Value::from(spec.provider.name.as_str()));
    metadata.insert(meta::DESCRIPTION.into(), Value::from(spec.description.as_str()));
    metadata.insert(meta::CATEGORY.into(), Value::from(spec.category.as_str()));
    metadata.insert(meta::PARAMETERS.into(), Value::from(parameters));
    metadata.insert(meta::PARAMETER_STRING.into(), Value::from(spec.parameter_string.as_str()));
    metadata.insert(
        meta::REQUIRED_PARAMETERS.into(),
        Value::from(spec.required_parameters().collect::<Vec<_>>()),
    );
    metadata.insert(meta::REQUIRES_WALLET.into(), Value::from(spec.requires_wallet));
    metadata.insert(meta::NETWORKS.into(), Value::from(network_keys(spec)));
    metadata.insert(
        meta::TAGS.into(),
        Value::from(spec.tags.iter().map(String::as_str).collect::<Vec<_>>()),
    );
    metadata
}

fn network_keys(spec: &ToolSpec) -> Vec<String> {
    let mut keys = spec.networks.clone();
    for family in &spec.protocol_families {
        if !keys.contains(family) {
            keys.push(family.clone());
        }
    }
    keys
}

/// Semantic search over the tool catalog backed by a [`VectorStoreClient`].
pub struct VectorSearchService {
    store: Arc<dyn VectorStoreClient>,
    settings: VectorSearchSettings,
    clear_before_sync: AtomicBool,
    initialized: AtomicBool,
}

impl std::fmt::Debug for VectorSearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorSearchService")
            .field("settings", &self.settings)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl VectorSearchService {
    /// Creates a service over an injected store.
    ///
    /// # Errors
    ///
    /// Returns `CONFIGURATION_ERROR` when the settings are invalid.
    pub fn new(store: Arc<dyn VectorStoreClient>, settings: VectorSearchSettings) -> SearchResult<Self> {
        settings
            .validate()
            .map_err(|err| VectorSearchError::new(SearchErrorCode::Configuration, err.to_string()))?;
        Ok(Self {
            store,
            clear_before_sync: AtomicBool::new(settings.clear_before_sync),
            settings,
            initialized: AtomicBool::new(false),
        })
    }

    /// Creates a service backed by the hosted Pinecone index.
    ///
    /// # Errors
    ///
    /// Returns `CONFIGURATION_ERROR` when the API key is missing or the
    /// settings are invalid. No network call is made.
    pub fn from_settings(settings: VectorSearchSettings) -> SearchResult<Self> {
        let client = PineconeClient::new(&settings)
            .map_err(|err| VectorSearchError::new(SearchErrorCode::Configuration, err.to_string()))?;
        Self::new(Arc::new(client), settings)
    }

    /// Returns the service settings.
    #[must_use]
    pub fn settings(&self) -> &VectorSearchSettings {
        &self.settings
    }

    /// Returns whether [`initialize`](Self::initialize) has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Returns whether syncs clear the namespace first.
    #[must_use]
    pub fn clear_before_sync(&self) -> bool {
        self.clear_before_sync.load(Ordering::Acquire)
    }

    /// Sets whether syncs clear the namespace first, returning the previous value.
    pub fn set_clear_before_sync(&self, clear: bool) -> bool {
        self.clear_before_sync.swap(clear, Ordering::AcqRel)
    }

    /// Ensures the index exists and is ready.
    ///
    /// Creates the index when absent, then polls readiness up to the
    /// configured number of attempts with a fixed delay.
    ///
    /// # Errors
    ///
    /// Returns `INITIALIZATION_ERROR` when listing or creating fails, when an
    /// existing index has the wrong dimension, or when readiness polling runs
    /// out of attempts.
    pub async fn initialize(&self) -> SearchResult<()> {
        let index_name = &self.settings.index_name;
        let indexes = self
            .store
            .list_indexes()
            .await
            .map_err(VectorSearchError::wrap(SearchErrorCode::Initialization, "failed to list indexes"))?;

        match indexes.iter().find(|index| &index.name == index_name) {
            Some(existing) if existing.dimension != self.settings.dimension => {
                return Err(VectorSearchError::new(
                    SearchErrorCode::Initialization,
                    format!(
                        "index `{index_name}` has dimension {}, expected {}",
                        existing.dimension, self.settings.dimension
                    ),
                ));
            }
            Some(_) => debug!(index = %index_name, "index exists"),
            None => {
                info!(index = %index_name, dimension = self.settings.dimension, "creating index");
                let spec = IndexSpec {
                    name: index_name.clone(),
                    dimension: self.settings.dimension,
                    metric: self.settings.metric.clone(),
                    cloud: self.settings.cloud.clone(),
                    region: self.settings.region.clone(),
                };
                self.store
                    .create_index(&spec)
                    .await
                    .map_err(VectorSearchError::wrap(SearchErrorCode::Initialization, "failed to create index"))?;
            }
        }

        let attempts = self.settings.readiness_attempts.max(1);
        let delay = Duration::from_millis(self.settings.readiness_delay_ms);
        for attempt in 1..=attempts {
            let description = self
                .store
                .describe_index(index_name)
                .await
                .map_err(VectorSearchError::wrap(SearchErrorCode::Initialization, "failed to describe index"))?;
            if description.ready {
                self.initialized.store(true, Ordering::Release);
                info!(index = %index_name, attempt, "index ready");
                return Ok(());
            }
            debug!(index = %index_name, attempt, attempts, "index not ready yet");
            if attempt < attempts {
                tokio::time::sleep(delay).await;
            }
        }

        Err(VectorSearchError::new(
            SearchErrorCode::Initialization,
            format!("index `{index_name}` not ready after {attempts} attempts"),
        ))
    }

    /// Embeds and upserts `specs` in sequential batches.
    ///
    /// Batches already written stay written when a later batch fails.
    ///
    /// # Errors
    ///
    /// Returns `CLEAR_ERROR`, `EMBEDDING_ERROR`, or `SYNC_ERROR` for the first
    /// failing step.
    pub async fn sync_tool_specs(&self, specs: &[ToolSpec]) -> SearchResult<SyncReport> {
        let mut report = SyncReport {
            total: specs.len(),
            ..SyncReport::default()
        };
        if self.clear_before_sync() {
            self.clear_namespace().await?;
            report.cleared = true;
        }

        let batch_size = self.settings.batch_size.max(1);
        let batch_count = specs.len().div_ceil(batch_size);
        for (batch, chunk) in specs.chunks(batch_size).enumerate() {
            let texts: Vec<String> = chunk.iter().map(|spec| spec.embedding_text.clone()).collect();
            let vectors = self.generate_batch_embeddings(&texts).await?;
            let records = chunk
                .iter()
                .zip(vectors)
                .map(|(spec, values)| VectorRecord::new(spec.id.as_str(), values, spec_metadata(spec)))
                .collect();

            let written = self
                .store
                .upsert(&self.settings.index_name, &self.settings.namespace, records)
                .await
                .map_err(|err| {
                    VectorSearchError::new(
                        SearchErrorCode::Sync,
                        format!(
                            "batch {}/{batch_count} failed after {} records were written: {err}",
                            batch + 1,
                            report.upserted
                        ),
                    )
                })?;
            report.upserted += written;
            report.batches += 1;
            debug!(batch = batch + 1, batches = batch_count, written, "batch synced");
        }

        info!(
            total = report.total,
            upserted = report.upserted,
            batches = report.batches,
            namespace = %self.settings.namespace,
            "tool specs synced"
        );
        Ok(report)
    }

    /// Removes every vector in the configured namespace.
    ///
    /// # Errors
    ///
    /// Returns `CLEAR_ERROR` when the store rejects the delete.
    pub async fn clear_namespace(&self) -> SearchResult<()> {
        self.store
            .delete_all(&self.settings.index_name, &self.settings.namespace)
            .await
            .map_err(VectorSearchError::wrap(SearchErrorCode::Clear, "failed to clear namespace"))?;
        info!(namespace = %self.settings.namespace, "namespace cleared");
        Ok(())
    }

    /// Runs a filtered similarity query.
    ///
    /// # Errors
    ///
    /// Returns `VALIDATION_ERROR` for blank query text, `EMBEDDING_ERROR` when
    /// the query cannot be embedded, and `QUERY_ERROR` when the store query fails.
    pub async fn search_actions(&self, request: &SearchRequest) -> SearchResult<Vec<ActionMatch>> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(VectorSearchError::new(
                SearchErrorCode::Validation,
                "query text must not be empty",
            ));
        }

        let vector = self.generate_embedding(query).await?;
        let top_k = NonZeroUsize::new(request.top_k.clamp(1, self.settings.max_top_k.max(1)))
            .unwrap_or(NonZeroUsize::MIN);
        let native = VectorQuery::new(vector, top_k).with_filter(request.filters.to_metadata_filter());

        let matches = self
            .store
            .query(&self.settings.index_name, &self.settings.namespace, native)
            .await
            .map_err(VectorSearchError::wrap(SearchErrorCode::Query, "similarity query failed"))?;

        let results: Vec<ActionMatch> = matches
            .into_iter()
            .filter_map(|hit| self.to_action_match(hit))
            .filter(|hit| request.filters.matches_name_prefix(&hit.action.action_name))
            .collect();
        debug!(query, top_k = top_k.get(), results = results.len(), "search completed");
        Ok(results)
    }

    fn to_action_match(&self, hit: VectorMatch) -> Option<ActionMatch> {
        let Some(action) = IndexedAction::from_metadata(&hit.metadata) else {
            warn!(id = %hit.id, index = %self.settings.index_name, "match carries unreadable metadata, dropping");
            return None;
        };
        Some(ActionMatch {
            action,
            score: normalize_score(hit.score),
        })
    }

    /// Embeds a single query text.
    ///
    /// # Errors
    ///
    /// Returns `EMBEDDING_ERROR` when the call fails or returns no vector.
    pub async fn generate_embedding(&self, text: &str) -> SearchResult<EmbeddingVector> {
        let mut vectors = self.embed(&[text.to_owned()], EmbedInputType::Query).await?;
        vectors.pop().ok_or_else(|| {
            VectorSearchError::new(SearchErrorCode::Embedding, "embedding service returned no vector")
        })
    }

    /// Embeds catalog passages in one call, preserving order.
    ///
    /// # Errors
    ///
    /// Returns `EMBEDDING_ERROR` when the call fails or the vector count does
    /// not match the input count.
    pub async fn generate_batch_embeddings(&self, texts: &[String]) -> SearchResult<Vec<EmbeddingVector>> {
        self.embed(texts, EmbedInputType::Passage).await
    }

    async fn embed(&self, texts: &[String], input_type: EmbedInputType) -> SearchResult<Vec<EmbeddingVector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self
            .store
            .embed(&self.settings.embedding_model, texts, input_type)
            .await
            .map_err(VectorSearchError::wrap(SearchErrorCode::Embedding, "embedding request failed"))?;
        if vectors.len() != texts.len() {
            return Err(VectorSearchError::new(
                SearchErrorCode::Embedding,
                format!("requested {} embeddings, received {}", texts.len(), vectors.len()),
            ));
        }
        Ok(vectors)
    }

    /// Returns statistics for the configured index.
    ///
    /// # Errors
    ///
    /// Returns `QUERY_ERROR` when the stats call fails.
    pub async fn get_index_stats(&self) -> SearchResult<IndexStats> {
        self.store
            .describe_index_stats(&self.settings.index_name)
            .await
            .map_err(VectorSearchError::wrap(SearchErrorCode::Query, "failed to read index stats"))
    }

    /// Fetches the stored view of a single action.
    ///
    /// # Errors
    ///
    /// Returns `FETCH_ERROR` when the fetch call fails.
    pub async fn fetch_action(&self, id: &ActionId) -> SearchResult<Option<IndexedAction>> {
        let records = self
            .store
            .fetch(&self.settings.index_name, &self.settings.namespace, &[id.to_string()])
            .await
            .map_err(VectorSearchError::wrap(SearchErrorCode::Fetch, "failed to fetch action"))?;
        Ok(records
            .into_iter()
            .find(|record| record.id == id.as_str())
            .and_then(|record| IndexedAction::from_metadata(&record.metadata)))
    }

    /// Removes the vectors of the listed actions, returning how many ids were submitted.
    ///
    /// # Errors
    ///
    /// Returns `DELETE_ERROR` when the delete call fails.
    pub async fn delete_actions(&self, ids: &[ActionId]) -> SearchResult<usize> {
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        self.store
            .delete(&self.settings.index_name, &self.settings.namespace, &ids)
            .await
            .map_err(VectorSearchError::wrap(SearchErrorCode::Delete, "failed to delete actions"))?;
        Ok(ids.len())
    }

    /// Probes the index and the embedding model. Never fails: problems are
    /// reported as [`HealthStatus::Unhealthy`].
    pub async fn health_check(&self) -> HealthReport {
        let mut report = HealthReport {
            status: HealthStatus::Healthy,
            index_name: self.settings.index_name.clone(),
            namespace: self.settings.namespace.clone(),
            embedding_model: self.settings.embedding_model.clone(),
            embedding_dimension: None,
            stats: None,
            error: None,
            timestamp: Utc::now(),
        };

        let probe = async {
            report.stats = Some(self.get_index_stats().await?);
            report.embedding_dimension = Some(self.generate_embedding("test").await?.len());
            Ok::<_, VectorSearchError>(())
        };
        let outcome = probe.await;
        if let Err(err) = outcome {
            warn!(error = %err, "vector search health check failed");
            report.status = HealthStatus::Unhealthy;
            report.error = Some(err.to_string());
        }
        report
    }
}
