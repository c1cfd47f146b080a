//! Registry manager: build, catalog, sync, and lookups.

use std::sync::Arc;

use serde::Serialize;
use toolhub_actions::{Action, ActionProvider, WalletContext};
use toolhub_config::RegistrySettings;
use toolhub_primitives::{ActionId, ProviderId};
use toolhub_telemetry::Stopwatch;
use tracing::{info, warn};

use crate::builder::RegistryBuilder;
use crate::catalog::{ToolSpec, ToolSpecCatalog, generate_catalog};
use crate::error::{RegistryError, RegistryResult};
use crate::heuristics::split_words;
use crate::model::{ActionRegistry, RegistryAction, RegistryActionProvider};
use crate::search::{ActionMatch, IndexedAction, SearchFilters, SyncReport, VectorSearchService};

const NAME_WEIGHT: u32 = 10;
const DESCRIPTION_WEIGHT: u32 = 5;
const PROVIDER_WEIGHT: u32 = 3;
const TAG_WEIGHT: u32 = 2;
const CATEGORY_WEIGHT: u32 = 1;
const MAX_TERM_SCORE: u32 =
    NAME_WEIGHT + DESCRIPTION_WEIGHT + PROVIDER_WEIGHT + TAG_WEIGHT + CATEGORY_WEIGHT;

/// Timings and counts for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStats {
    /// Providers registered.
    pub provider_count: usize,
    /// Actions registered.
    pub action_count: usize,
    /// Tool specs generated.
    pub tool_count: usize,
    /// Providers skipped during the build.
    pub skipped_providers: Vec<String>,
    /// Registry build time.
    pub build_ms: u64,
    /// Catalog generation time.
    pub catalog_ms: u64,
    /// Vector sync time, when a sync ran.
    pub sync_ms: Option<u64>,
    /// Sync outcome, when a sync ran.
    pub sync: Option<SyncReport>,
    /// End-to-end time.
    pub total_ms: u64,
}

/// Result of [`RegistryManager::build_registry`].
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// Freshly built registry.
    pub registry: Arc<ActionRegistry>,
    /// Catalog generated from it.
    pub catalog: Arc<ToolSpecCatalog>,
    /// Build statistics.
    pub stats: BuildStats,
}

/// Orchestrates builder, catalog generator, and optional vector sync.
///
/// Each build replaces the held registry and catalog wholesale.
#[derive(Debug)]
pub struct RegistryManager {
    builder: RegistryBuilder,
    search: Option<Arc<VectorSearchService>>,
    registry: Option<Arc<ActionRegistry>>,
    catalog: Option<Arc<ToolSpecCatalog>>,
    last_stats: Option<BuildStats>,
}

impl RegistryManager {
    /// Creates a manager without a vector search service.
    #[must_use]
    pub fn new(settings: RegistrySettings) -> Self {
        Self {
            builder: RegistryBuilder::new(settings),
            search: None,
            registry: None,
            catalog: None,
            last_stats: None,
        }
    }

    /// Attaches the vector search service used for syncs.
    #[must_use]
    pub fn with_search(mut self, search: Arc<VectorSearchService>) -> Self {
        self.search = Some(search);
        self
    }

    /// Returns the vector search service, if one is attached.
    #[must_use]
    pub fn search_service(&self) -> Option<&Arc<VectorSearchService>> {
        self.search.as_ref()
    }

    /// Builds a registry and catalog, then syncs the catalog when enabled.
    ///
    /// When the sync fails the new registry and catalog are still kept.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NoProviders`] when nothing registered and
    /// [`RegistryError::Search`] when index initialisation or sync fails.
    pub async fn build_registry(
        &mut self,
        providers: &[Arc<dyn ActionProvider>],
        wallet: Option<&WalletContext>,
    ) -> RegistryResult<BuildOutcome> {
        let sync = self.builder.settings().sync_enabled;
        self.run(providers, wallet, sync).await
    }

    /// Rebuilds and resyncs after clearing the namespace, whatever the
    /// standing clear and sync settings. The clear setting is restored
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Same as [`build_registry`](Self::build_registry).
    pub async fn rebuild_and_sync(
        &mut self,
        providers: &[Arc<dyn ActionProvider>],
        wallet: Option<&WalletContext>,
    ) -> RegistryResult<BuildOutcome> {
        let Some(search) = self.search.clone() else {
            warn!("no vector search service attached, rebuilding without sync");
            return self.run(providers, wallet, false).await;
        };
        let previous = search.set_clear_before_sync(true);
        let outcome = self.run(providers, wallet, true).await;
        search.set_clear_before_sync(previous);
        outcome
    }

    async fn run(
        &mut self,
        providers: &[Arc<dyn ActionProvider>],
        wallet: Option<&WalletContext>,
        sync: bool,
    ) -> RegistryResult<BuildOutcome> {
        let total = Stopwatch::start();

        let phase = Stopwatch::start();
        let registry = Arc::new(self.builder.build_from_providers(providers, wallet)?);
        let build_ms = phase.elapsed_ms();

        let phase = Stopwatch::start();
        let catalog = Arc::new(generate_catalog(&registry));
        let catalog_ms = phase.elapsed_ms();

        self.registry = Some(Arc::clone(&registry));
        self.catalog = Some(Arc::clone(&catalog));

        let mut stats = BuildStats {
            provider_count: registry.metadata().provider_count,
            action_count: registry.metadata().action_count,
            tool_count: catalog.len(),
            skipped_providers: registry.metadata().skipped_providers.clone(),
            build_ms,
            catalog_ms,
            ..BuildStats::default()
        };

        if let Some(search) = self.search.as_ref().filter(|_| sync) {
            let phase = Stopwatch::start();
            if !search.is_initialized() {
                search.initialize().await?;
            }
            let specs: Vec<ToolSpec> = catalog.iter().cloned().collect();
            stats.sync = Some(search.sync_tool_specs(&specs).await?);
            stats.sync_ms = Some(phase.elapsed_ms());
        }
        stats.total_ms = total.elapsed_ms();

        info!(
            providers = stats.provider_count,
            actions = stats.action_count,
            tools = stats.tool_count,
            build_ms = stats.build_ms,
            catalog_ms = stats.catalog_ms,
            sync_ms = ?stats.sync_ms,
            total_ms = stats.total_ms,
            "registry pipeline finished"
        );

        self.last_stats = Some(stats.clone());
        Ok(BuildOutcome {
            registry,
            catalog,
            stats,
        })
    }

    /// Returns the current registry.
    #[must_use]
    pub fn registry(&self) -> Option<&Arc<ActionRegistry>> {
        self.registry.as_ref()
    }

    /// Returns the current catalog.
    #[must_use]
    pub fn catalog(&self) -> Option<&Arc<ToolSpecCatalog>> {
        self.catalog.as_ref()
    }

    /// Returns statistics of the last successful build.
    #[must_use]
    pub fn last_stats(&self) -> Option<&BuildStats> {
        self.last_stats.as_ref()
    }

    /// Looks up an action.
    #[must_use]
    pub fn action(&self, id: &ActionId) -> Option<&RegistryAction> {
        self.registry.as_ref()?.action(id)
    }

    /// Looks up a provider.
    #[must_use]
    pub fn provider(&self, id: &ProviderId) -> Option<&RegistryActionProvider> {
        self.registry.as_ref()?.provider(id)
    }

    /// Looks up a tool spec.
    #[must_use]
    pub fn tool_spec(&self, id: &ActionId) -> Option<&ToolSpec> {
        self.catalog.as_ref()?.get(id)
    }

    /// Looks up the invocable behind an action id.
    #[must_use]
    pub fn invocable(&self, id: &ActionId) -> Option<&Action> {
        self.registry.as_ref()?.invocable(id)
    }

    /// Actions satisfying every set filter, in id order.
    #[must_use]
    pub fn filter_actions(&self, filters: &SearchFilters) -> Vec<&RegistryAction> {
        let (Some(registry), Some(catalog)) = (self.registry.as_ref(), self.catalog.as_ref()) else {
            return Vec::new();
        };
        catalog
            .iter()
            .filter(|spec| filters.matches(spec))
            .filter_map(|spec| registry.action(&spec.id))
            .collect()
    }

    /// Keyword search over the local catalog.
    #[must_use]
    pub fn search_tools_locally(&self, query: &str, limit: usize) -> Vec<ActionMatch> {
        self.search_tools_locally_filtered(query, limit, &SearchFilters::default())
    }

    /// Keyword search over the local catalog restricted by `filters`.
    ///
    /// Each query term scores name, description, provider, tag, and category
    /// hits with fixed weights; totals are scaled to `[0, 1]`. Tools scoring
    /// zero are dropped and ties fall back to id order.
    #[must_use]
    pub fn search_tools_locally_filtered(
        &self,
        query: &str,
        limit: usize,
        filters: &SearchFilters,
    ) -> Vec<ActionMatch> {
        let terms = split_words(query);
        let Some(catalog) = self.catalog.as_ref() else {
            return Vec::new();
        };
        if terms.is_empty() || limit == 0 {
            return Vec::new();
        }

        #[allow(clippy::cast_precision_loss)]
        let ceiling = f64::from(MAX_TERM_SCORE) * terms.len() as f64;
        let mut scored: Vec<(u32, &ToolSpec)> = catalog
            .iter()
            .filter(|spec| filters.matches(spec))
            .map(|spec| (keyword_score(spec, &terms), spec))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(score, spec)| {
                #[allow(clippy::cast_possible_truncation)]
                let score = (f64::from(score) / ceiling).min(1.0) as f32;
                ActionMatch {
                    action: IndexedAction::from_spec(spec),
                    score,
                }
            })
            .collect()
    }

    /// Deletes the vectors of every action owned by `provider`.
    ///
    /// Returns the number of ids submitted; zero without a search service.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotBuilt`] before the first build and
    /// [`RegistryError::Search`] when the delete fails.
    pub async fn remove_provider_vectors(&self, provider: &ProviderId) -> RegistryResult<usize> {
        let catalog = self.catalog.as_ref().ok_or(RegistryError::NotBuilt)?;
        let ids: Vec<ActionId> = catalog.by_provider(provider).map(|spec| spec.id.clone()).collect();
        let Some(search) = self.search.as_ref() else {
            return Ok(0);
        };
        if ids.is_empty() {
            return Ok(0);
        }
        let removed = search.delete_actions(&ids).await?;
        info!(provider = %provider, removed, "provider vectors removed");
        Ok(removed)
    }

    /// Serialises the current catalog as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotBuilt`] before the first build.
    pub fn export_catalog(&self) -> RegistryResult<String> {
        let catalog = self.catalog.as_ref().ok_or(RegistryError::NotBuilt)?;
        Ok(serde_json::to_string_pretty(catalog.as_ref())?)
    }
}

fn keyword_score(spec: &ToolSpec, terms: &[String]) -> u32 {
    let name = spec.name.to_lowercase();
    let description = spec.description.to_lowercase();
    let provider = spec.provider.name.to_lowercase();
    let category = spec.category.as_str();

    terms
        .iter()
        .map(|term| {
            let term = term.as_str();
            let mut score = 0;
            if name.contains(term) {
                score += NAME_WEIGHT;
            }
            if description.contains(term) {
                score += DESCRIPTION_WEIGHT;
            }
            if provider.contains(term) {
                score += PROVIDER_WEIGHT;
            }
            if spec.tags.iter().any(|tag| tag.contains(term)) {
                score += TAG_WEIGHT;
            }
            if category.contains(term) {
                score += CATEGORY_WEIGHT;
            }
            score
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use toolhub_actions::{ActionResult, PerformanceHints, StaticActionProvider};
    use toolhub_config::VectorSearchSettings;
    use toolhub_vector::{InMemoryVectorStore, VectorStoreClient};

    use super::*;

    async fn echo(args: serde_json::Value) -> ActionResult<String> {
        Ok(args.to_string())
    }

    fn action(name: &str, description: &str, wallet: bool) -> Action {
        Action::builder(name, description)
            .schema(json!({
                "type": "object",
                "properties": {
                    "amount": { "type": "number" },
                    "slippageBps": { "type": "number", "default": 50 }
                },
                "required": ["amount"]
            }))
            .requires_wallet(wallet)
            .handler(echo)
            .build()
            .unwrap()
    }

    fn providers() -> Vec<Arc<dyn ActionProvider>> {
        vec![
            Arc::new(
                StaticActionProvider::new(
                    "jupiter",
                    vec![
                        action("jupiter_swap", "Swap tokens on Solana", true),
                        action("get_quote", "Quote a swap route", false),
                    ],
                )
                .with_protocol_families(["svm"]),
            ),
            Arc::new(
                StaticActionProvider::new(
                    "pyth",
                    vec![Action::builder("get_price", "Fetch the latest price feed")
                        .requires_wallet(false)
                        .performance(PerformanceHints {
                            estimated_latency_ms: Some(120),
                            on_chain: false,
                        })
                        .handler(echo)
                        .build()
                        .unwrap()],
                )
                .with_protocol_families(["svm", "evm"]),
            ),
        ]
    }

    fn local_settings() -> RegistrySettings {
        RegistrySettings {
            sync_enabled: false,
            ..RegistrySettings::default()
        }
    }

    fn search_service(store: Arc<InMemoryVectorStore>) -> Arc<VectorSearchService> {
        let mut settings = VectorSearchSettings::default()
            .with_dimension(64)
            .with_namespace("manager");
        settings.readiness_delay_ms = 1;
        Arc::new(VectorSearchService::new(store, settings).unwrap())
    }

    #[tokio::test]
    async fn build_without_search_keeps_registry_and_catalog() {
        let mut manager = RegistryManager::new(local_settings());
        let outcome = manager.build_registry(&providers(), None).await.unwrap();
        assert_eq!(outcome.stats.provider_count, 2);
        assert_eq!(outcome.stats.action_count, 3);
        assert_eq!(outcome.stats.tool_count, 3);
        assert!(outcome.stats.sync.is_none());

        let id: ActionId = "jupiter:swap".parse().unwrap();
        assert_eq!(manager.action(&id).unwrap().name, "jupiter_swap");
        assert!(manager.tool_spec(&id).is_some());
        assert!(manager.invocable(&id).is_some());
        assert_eq!(manager.last_stats(), Some(&outcome.stats));
    }

    #[tokio::test]
    async fn filter_by_wallet_requirement_is_exact() {
        let mut manager = RegistryManager::new(local_settings());
        manager.build_registry(&providers(), None).await.unwrap();

        let filters = SearchFilters {
            requires_wallet: Some(true),
            ..SearchFilters::default()
        };
        let wallet_actions = manager.filter_actions(&filters);
        let expected: Vec<&RegistryAction> = manager
            .registry()
            .unwrap()
            .actions()
            .values()
            .filter(|action| action.requires_wallet)
            .collect();
        assert_eq!(wallet_actions, expected);
        assert!(wallet_actions.iter().all(|action| action.requires_wallet));
    }

    #[tokio::test]
    async fn local_search_ranks_by_weighted_fields() {
        let mut manager = RegistryManager::new(local_settings());
        manager.build_registry(&providers(), None).await.unwrap();

        let results = manager.search_tools_locally("swap", 10);
        let ids: Vec<&str> = results.iter().map(|hit| hit.action.action_id.as_str()).collect();
        assert_eq!(ids, vec!["jupiter:swap", "jupiter:get_quote"]);
        assert!(results[0].score > results[1].score);
        assert!(results.iter().all(|hit| (0.0..=1.0).contains(&hit.score)));

        assert!(manager.search_tools_locally("zebra", 10).is_empty());
        assert!(manager.search_tools_locally("   ", 10).is_empty());
        assert_eq!(manager.search_tools_locally("swap", 1).len(), 1);
    }

    #[tokio::test]
    async fn build_syncs_when_enabled() {
        let store = Arc::new(InMemoryVectorStore::new(64));
        let search = search_service(store.clone());
        let mut manager = RegistryManager::new(RegistrySettings::default()).with_search(search.clone());

        let outcome = manager.build_registry(&providers(), None).await.unwrap();
        assert!(search.is_initialized());
        assert_eq!(outcome.stats.sync.unwrap().upserted, 3);
        let stats = store.describe_index_stats(&search.settings().index_name).await.unwrap();
        assert_eq!(stats.total_vector_count, 3);
    }

    #[tokio::test]
    async fn rebuild_clears_and_restores_setting() {
        let store = Arc::new(InMemoryVectorStore::new(64));
        let search = search_service(store);
        let mut manager = RegistryManager::new(RegistrySettings::default()).with_search(search.clone());

        manager.build_registry(&providers(), None).await.unwrap();
        let outcome = manager.rebuild_and_sync(&providers(), None).await.unwrap();
        assert!(outcome.stats.sync.unwrap().cleared);
        assert!(!search.clear_before_sync());
    }

    #[tokio::test]
    async fn provider_vectors_can_be_removed() {
        let store = Arc::new(InMemoryVectorStore::new(64));
        let search = search_service(store.clone());
        let mut manager = RegistryManager::new(RegistrySettings::default()).with_search(search.clone());
        manager.build_registry(&providers(), None).await.unwrap();

        let jupiter = ProviderId::from_name("jupiter").unwrap();
        assert_eq!(manager.remove_provider_vectors(&jupiter).await.unwrap(), 2);
        let stats = store.describe_index_stats(&search.settings().index_name).await.unwrap();
        assert_eq!(stats.total_vector_count, 1);
    }

    #[tokio::test]
    async fn export_requires_a_build() {
        let mut manager = RegistryManager::new(local_settings());
        assert!(matches!(manager.export_catalog(), Err(RegistryError::NotBuilt)));

        manager.build_registry(&providers(), None).await.unwrap();
        let exported: serde_json::Value = serde_json::from_str(&manager.export_catalog().unwrap()).unwrap();
        assert_eq!(exported["metadata"]["toolCount"], json!(3));
        assert!(exported["tools"]["jupiter:swap"].is_object());
    }
}
