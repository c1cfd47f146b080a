//! Vector store contract and its record types.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::embeddings::{EmbedInputType, EmbeddingVector};
use crate::filter::MetadataFilter;
use crate::StoreResult;

/// Parameters used to create an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Index name.
    pub name: String,
    /// Vector dimensionality.
    pub dimension: usize,
    /// Similarity metric (`cosine`, `dotproduct`, `euclidean`).
    pub metric: String,
    /// Cloud hosting the serverless index.
    pub cloud: String,
    /// Region hosting the serverless index.
    pub region: String,
}

/// Index as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescription {
    /// Index name.
    pub name: String,
    /// Vector dimensionality.
    pub dimension: usize,
    /// Similarity metric.
    pub metric: String,
    /// Data-plane host, once provisioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Whether the index accepts data-plane traffic.
    pub ready: bool,
}

/// Per-namespace statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceStats {
    /// Vectors stored in the namespace.
    pub vector_count: u64,
}

/// Index statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    /// Vector dimensionality.
    pub dimension: usize,
    /// Vectors across all namespaces.
    pub total_vector_count: u64,
    /// Fraction of capacity in use, when reported.
    #[serde(default)]
    pub index_fullness: f32,
    /// Statistics keyed by namespace.
    #[serde(default)]
    pub namespaces: BTreeMap<String, NamespaceStats>,
}

/// Record written to the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Record identifier.
    pub id: String,
    /// Embedding.
    pub values: EmbeddingVector,
    /// Filterable metadata payload.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl VectorRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(id: impl Into<String>, values: EmbeddingVector, metadata: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            values,
            metadata,
        }
    }
}

/// Similarity query.
#[derive(Debug, Clone)]
pub struct VectorQuery {
    vector: EmbeddingVector,
    top_k: NonZeroUsize,
    filter: Option<MetadataFilter>,
    include_metadata: bool,
}

impl VectorQuery {
    /// Creates a query returning metadata for up to `top_k` matches.
    #[must_use]
    pub fn new(vector: EmbeddingVector, top_k: NonZeroUsize) -> Self {
        Self {
            vector,
            top_k,
            filter: None,
            include_metadata: true,
        }
    }

    /// Restricts matches to records satisfying `filter`.
    #[must_use]
    pub fn with_filter(mut self, filter: Option<MetadataFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Controls whether matches carry their metadata payload.
    #[must_use]
    pub fn with_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    /// Returns the query vector.
    #[must_use]
    pub fn vector(&self) -> &EmbeddingVector {
        &self.vector
    }

    /// Returns the desired number of results.
    #[must_use]
    pub fn top_k(&self) -> usize {
        self.top_k.get()
    }

    /// Returns the metadata filter.
    #[must_use]
    pub fn filter(&self) -> Option<&MetadataFilter> {
        self.filter.as_ref()
    }

    /// Returns whether metadata is requested.
    #[must_use]
    pub fn include_metadata(&self) -> bool {
        self.include_metadata
    }
}

/// Match returned from a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    /// Record identifier.
    pub id: String,
    /// Native similarity score.
    pub score: f32,
    /// Metadata payload, empty when not requested.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Interface for vector store clients.
#[async_trait]
pub trait VectorStoreClient: Send + Sync {
    /// Lists the indexes visible to the client.
    async fn list_indexes(&self) -> StoreResult<Vec<IndexDescription>>;

    /// Describes a single index.
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) when it
    /// does not exist.
    async fn describe_index(&self, name: &str) -> StoreResult<IndexDescription>;

    /// Creates an index.
    async fn create_index(&self, spec: &IndexSpec) -> StoreResult<()>;

    /// Returns statistics for an index.
    async fn describe_index_stats(&self, index: &str) -> StoreResult<IndexStats>;

    /// Embeds `texts` with `model`, returning one vector per input in order.
    async fn embed(
        &self,
        model: &str,
        texts: &[String],
        input_type: EmbedInputType,
    ) -> StoreResult<Vec<EmbeddingVector>>;

    /// Inserts or replaces records by id, returning the number written.
    async fn upsert(&self, index: &str, namespace: &str, records: Vec<VectorRecord>) -> StoreResult<usize>;

    /// Removes every record in the namespace.
    async fn delete_all(&self, index: &str, namespace: &str) -> StoreResult<()>;

    /// Removes the listed records.
    async fn delete(&self, index: &str, namespace: &str, ids: &[String]) -> StoreResult<()>;

    /// Executes a similarity query; matches are ordered by descending score.
    async fn query(&self, index: &str, namespace: &str, query: VectorQuery) -> StoreResult<Vec<VectorMatch>>;

    /// Fetches records by id; missing ids are omitted.
    async fn fetch(&self, index: &str, namespace: &str, ids: &[String]) -> StoreResult<Vec<VectorRecord>>;
}
