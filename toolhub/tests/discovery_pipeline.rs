use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use toolhub::actions::{
    Action, ActionProvider, ActionResult, ProviderError, StaticActionProvider, WalletContext,
};
use toolhub::config::{RegistrySettings, VectorSearchSettings};
use toolhub::primitives::{ActionId, Network};
use toolhub::registry::{
    ExecuteToolRequest, RegistryManager, SearchFilters, SearchToolsRequest, ToolGateway,
    VectorSearchService,
};
use toolhub::vector::InMemoryVectorStore;

const SWAP_DESCRIPTION: &str = "Swap tokens on Solana through the Jupiter aggregator";

async fn swap(args: Value) -> ActionResult<String> {
    Ok(json!({
        "signature": "5xSig",
        "inAmount": args["amount"],
        "slippageBps": args["slippageBps"],
    })
    .to_string())
}

async fn echo(args: Value) -> ActionResult<String> {
    Ok(args.to_string())
}

fn jupiter() -> Arc<dyn ActionProvider> {
    let swap = Action::builder("jupiter_swap", SWAP_DESCRIPTION)
        .schema(json!({
            "type": "object",
            "properties": {
                "inputMint": { "type": "string" },
                "outputMint": { "type": "string" },
                "amount": { "type": "number" },
                "slippageBps": { "type": "number", "default": 50 }
            },
            "required": ["inputMint", "outputMint", "amount", "slippageBps"]
        }))
        .requires_wallet(true)
        .handler(swap)
        .build()
        .unwrap();
    Arc::new(
        StaticActionProvider::new("jupiter", vec![swap])
            .with_description("Solana DEX aggregator")
            .with_protocol_families(["svm"]),
    )
}

fn pyth() -> Arc<dyn ActionProvider> {
    let price = Action::builder("get_price", "Fetch the latest price feed for a token")
        .schema(json!({
            "type": "object",
            "properties": { "symbol": { "type": "string" } },
            "required": ["symbol"]
        }))
        .requires_wallet(false)
        .handler(echo)
        .build()
        .unwrap();
    Arc::new(StaticActionProvider::new("pyth", vec![price]).with_protocol_families(["svm", "evm"]))
}

struct Exploding;

impl ActionProvider for Exploding {
    fn name(&self) -> &str {
        "exploding"
    }

    fn list_actions(&self, _wallet: Option<&WalletContext>) -> Result<Vec<Action>, ProviderError> {
        Err(ProviderError::introspection("simulated outage"))
    }

    fn supports_network(&self, _network: &Network) -> bool {
        true
    }
}

fn providers() -> Vec<Arc<dyn ActionProvider>> {
    vec![jupiter(), Arc::new(Exploding), pyth()]
}

fn vector_manager() -> RegistryManager {
    let store = Arc::new(InMemoryVectorStore::new(96));
    let mut settings = VectorSearchSettings::default()
        .with_dimension(96)
        .with_namespace("integration");
    settings.readiness_delay_ms = 1;
    let search = VectorSearchService::new(store, settings).unwrap();
    RegistryManager::new(RegistrySettings::default()).with_search(Arc::new(search))
}

#[tokio::test]
async fn jupiter_swap_renders_canonical_embedding_text() {
    let mut manager = RegistryManager::new(RegistrySettings {
        sync_enabled: false,
        ..RegistrySettings::default()
    });
    let outcome = manager.build_registry(&providers(), None).await.unwrap();

    let id: ActionId = "jupiter:swap".parse().unwrap();
    let spec = outcome.catalog.get(&id).unwrap();
    assert_eq!(
        spec.embedding_text,
        format!(
            "jupiter swap | {SWAP_DESCRIPTION} | params: inputMint: string, outputMint: string, \
             amount: number, slippageBps: number (optional) (default: 50)"
        )
    );
    assert_eq!(outcome.stats.skipped_providers, vec!["exploding".to_owned()]);
    assert_eq!(outcome.stats.action_count, 2);
}

#[tokio::test]
async fn rebuilding_keeps_identifiers_stable() {
    let mut manager = RegistryManager::new(RegistrySettings {
        sync_enabled: false,
        ..RegistrySettings::default()
    });
    let first = manager.build_registry(&providers(), None).await.unwrap();
    let second = manager.build_registry(&providers(), None).await.unwrap();

    let ids = |outcome: &toolhub::registry::BuildOutcome| {
        (
            outcome.registry.providers().keys().cloned().collect::<Vec<_>>(),
            outcome.registry.actions().keys().cloned().collect::<Vec<_>>(),
        )
    };
    assert_eq!(ids(&first), ids(&second));
    let price: ActionId = "pyth:get_price".parse().unwrap();
    assert_eq!(
        first.catalog.get(&price).unwrap().embedding_text,
        second.catalog.get(&price).unwrap().embedding_text
    );
}

#[tokio::test]
async fn search_then_execute_round_trip() {
    let mut gateway = ToolGateway::new(vector_manager(), providers());
    let stats = gateway.initialize().await.unwrap();
    assert_eq!(stats.sync.unwrap().upserted, 2);

    let found = gateway
        .search_tools(SearchToolsRequest::new("swap tokens on solana").with_top_k(1))
        .await
        .unwrap();
    assert_eq!(found.total_results, 1);
    let hit = &found.results[0];
    assert_eq!(hit.action.action_id, "jupiter:swap");
    assert!(hit.action.requires_wallet);
    assert!((0.0..=1.0).contains(&hit.score));

    let executed = gateway
        .execute_tool(ExecuteToolRequest::new(
            hit.action.action_id.clone(),
            json!({ "inputMint": "SOL", "outputMint": "USDC", "amount": 1.5 }),
        ))
        .await;
    assert!(executed.success, "{executed:?}");
    assert_eq!(
        executed.result,
        Some(json!({ "signature": "5xSig", "inAmount": 1.5, "slippageBps": 50 }))
    );
}

#[tokio::test]
async fn wallet_filter_is_exact_in_both_paths() {
    let mut gateway = ToolGateway::new(vector_manager(), providers());
    gateway.initialize().await.unwrap();

    let filters = SearchFilters {
        requires_wallet: Some(false),
        ..SearchFilters::default()
    };
    let remote = gateway
        .search_tools(SearchToolsRequest::new("swap tokens").with_filters(filters.clone()))
        .await
        .unwrap();
    assert!(remote.results.iter().all(|hit| !hit.action.requires_wallet));
    assert_eq!(remote.results.len(), 1);

    let local = gateway.manager().filter_actions(&SearchFilters {
        requires_wallet: Some(true),
        ..SearchFilters::default()
    });
    let ids: Vec<&str> = local.iter().map(|action| action.id.as_str()).collect();
    assert_eq!(ids, vec!["jupiter:swap"]);
}

#[tokio::test]
async fn unknown_action_yields_structured_failure() {
    let mut gateway = ToolGateway::new(vector_manager(), providers());
    gateway.initialize().await.unwrap();

    let response = gateway
        .call_tool("execute_tool", json!({ "actionId": "uniswap:swap", "parameters": {} }))
        .await;
    assert_eq!(response["success"], json!(false));
    assert_eq!(response["errorCode"], json!("UNKNOWN_ACTION"));
    assert!(response["timestamp"].is_string());
}

#[tokio::test]
async fn reindex_replaces_vectors() {
    let mut gateway = ToolGateway::new(vector_manager(), providers());
    gateway.initialize().await.unwrap();
    let stats = gateway.reindex().await.unwrap();
    let report = stats.sync.unwrap();
    assert!(report.cleared);
    assert_eq!(report.upserted, 2);

    let search = gateway.manager().search_service().unwrap();
    let index = search.get_index_stats().await.unwrap();
    assert_eq!(index.total_vector_count, 2);
}
