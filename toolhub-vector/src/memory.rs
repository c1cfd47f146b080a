//! In-process vector store with a deterministic hashing embedder.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::embeddings::{EmbedInputType, EmbeddingVector};
use crate::store::{
    IndexDescription, IndexSpec, IndexStats, NamespaceStats, VectorMatch, VectorQuery,
    VectorRecord, VectorStoreClient,
};
use crate::{StoreError, StoreResult};

#[derive(Debug)]
struct MemoryIndex {
    spec: IndexSpec,
    namespaces: HashMap<String, HashMap<String, VectorRecord>>,
}

/// Vector store that keeps indexes in memory and embeds text by hashing
/// tokens into a fixed number of buckets.
///
/// Scores are real cosine similarities, so relevance is crude but stable:
/// texts sharing words land close together. Indexes are ready as soon as they
/// are created.
#[derive(Debug)]
pub struct InMemoryVectorStore {
    dimension: usize,
    indexes: RwLock<HashMap<String, MemoryIndex>>,
}

impl InMemoryVectorStore {
    /// Creates an empty store whose embedder produces `dimension`-wide vectors.
    ///
    /// A zero dimension is bumped to one.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            indexes: RwLock::new(HashMap::new()),
        }
    }

    /// Embeds a single text.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the `Result` mirrors [`EmbeddingVector::new`].
    pub fn embed_text(&self, text: &str) -> StoreResult<EmbeddingVector> {
        let mut buckets = vec![0.0_f32; self.dimension];
        for token in tokens(text) {
            let hash = fnv1a(token.as_bytes());
            let bucket = usize::try_from(hash % self.dimension as u64).unwrap_or(0);
            buckets[bucket] += 1.0;
        }
        EmbeddingVector::new(buckets)
    }

    fn missing(index: &str) -> StoreError {
        StoreError::NotFound(index.to_owned())
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl VectorStoreClient for InMemoryVectorStore {
    async fn list_indexes(&self) -> StoreResult<Vec<IndexDescription>> {
        let guard = self.indexes.read().await;
        Ok(guard.values().map(|index| describe(&index.spec)).collect())
    }

    async fn describe_index(&self, name: &str) -> StoreResult<IndexDescription> {
        let guard = self.indexes.read().await;
        guard
            .get(name)
            .map(|index| describe(&index.spec))
            .ok_or_else(|| Self::missing(name))
    }

    async fn create_index(&self, spec: &IndexSpec) -> StoreResult<()> {
        let mut guard = self.indexes.write().await;
        if guard.contains_key(&spec.name) {
            return Err(StoreError::response(409, format!("index `{}` already exists", spec.name)));
        }
        debug!(index = %spec.name, dimension = spec.dimension, "creating in-memory index");
        guard.insert(
            spec.name.clone(),
            MemoryIndex {
                spec: spec.clone(),
                namespaces: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn describe_index_stats(&self, index: &str) -> StoreResult<IndexStats> {
        let guard = self.indexes.read().await;
        let index = guard.get(index).ok_or_else(|| Self::missing(index))?;
        let namespaces = index
            .namespaces
            .iter()
            .map(|(name, records)| {
                (
                    name.clone(),
                    NamespaceStats {
                        vector_count: records.len() as u64,
                    },
                )
            })
            .collect::<std::collections::BTreeMap<_, _>>();
        Ok(IndexStats {
            dimension: index.spec.dimension,
            total_vector_count: namespaces.values().map(|ns| ns.vector_count).sum(),
            index_fullness: 0.0,
            namespaces,
        })
    }

    async fn embed(
        &self,
        _model: &str,
        texts: &[String],
        _input_type: EmbedInputType,
    ) -> StoreResult<Vec<EmbeddingVector>> {
        texts.iter().map(|text| self.embed_text(text)).collect()
    }

    async fn upsert(&self, index: &str, namespace: &str, records: Vec<VectorRecord>) -> StoreResult<usize> {
        let mut guard = self.indexes.write().await;
        let target = guard.get_mut(index).ok_or_else(|| Self::missing(index))?;
        if let Some(bad) = records
            .iter()
            .find(|record| record.values.len() != target.spec.dimension)
        {
            return Err(StoreError::response(
                400,
                format!(
                    "vector `{}` has dimension {}, index expects {}",
                    bad.id,
                    bad.values.len(),
                    target.spec.dimension
                ),
            ));
        }
        let written = records.len();
        let ns = target.namespaces.entry(namespace.to_owned()).or_default();
        for record in records {
            ns.insert(record.id.clone(), record);
        }
        Ok(written)
    }

    async fn delete_all(&self, index: &str, namespace: &str) -> StoreResult<()> {
        let mut guard = self.indexes.write().await;
        let target = guard.get_mut(index).ok_or_else(|| Self::missing(index))?;
        target.namespaces.remove(namespace);
        Ok(())
    }

    async fn delete(&self, index: &str, namespace: &str, ids: &[String]) -> StoreResult<()> {
        let mut guard = self.indexes.write().await;
        let target = guard.get_mut(index).ok_or_else(|| Self::missing(index))?;
        if let Some(ns) = target.namespaces.get_mut(namespace) {
            for id in ids {
                ns.remove(id);
            }
        }
        Ok(())
    }

    async fn query(&self, index: &str, namespace: &str, query: VectorQuery) -> StoreResult<Vec<VectorMatch>> {
        let guard = self.indexes.read().await;
        let target = guard.get(index).ok_or_else(|| Self::missing(index))?;
        let Some(ns) = target.namespaces.get(namespace) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<VectorMatch> = ns
            .values()
            .filter(|record| query.filter().is_none_or(|filter| filter.matches(&record.metadata)))
            .map(|record| VectorMatch {
                id: record.id.clone(),
                score: record.values.cosine_similarity(query.vector()),
                metadata: if query.include_metadata() {
                    record.metadata.clone()
                } else {
                    serde_json::Map::new()
                },
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(query.top_k());
        Ok(matches)
    }

    async fn fetch(&self, index: &str, namespace: &str, ids: &[String]) -> StoreResult<Vec<VectorRecord>> {
        let guard = self.indexes.read().await;
        let target = guard.get(index).ok_or_else(|| Self::missing(index))?;
        let Some(ns) = target.namespaces.get(namespace) else {
            return Ok(Vec::new());
        };
        Ok(ids.iter().filter_map(|id| ns.get(id).cloned()).collect())
    }
}

fn describe(spec: &IndexSpec) -> IndexDescription {
    IndexDescription {
        name: spec.name.clone(),
        dimension: spec.dimension,
        metric: spec.metric.clone(),
        host: None,
        ready: true,
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(PRIME))
}
