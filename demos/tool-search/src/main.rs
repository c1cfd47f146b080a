//! Command-line demo: build a registry from sample providers, then search and
//! execute through the two-tool gateway.
//!
//! `--offline` keeps vectors in process; otherwise the hosted index is used and
//! `PINECONE_API_KEY` must be set.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use toolhub::actions::{Action, ActionProvider, ActionResult, PerformanceHints, StaticActionProvider};
use toolhub::config::{ToolhubSettings, loader};
use toolhub::registry::{
    ExecuteToolRequest, RegistryManager, SearchFilters, SearchToolsRequest, ToolGateway,
    VectorSearchService,
};
use toolhub::telemetry::init_tracing;
use toolhub::vector::InMemoryVectorStore;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tool-search", about = "Search and execute toolhub actions")]
struct Cli {
    /// JSON settings file; environment variables still apply on top.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the in-process vector store instead of the hosted index.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank actions for a natural-language request.
    Search {
        /// What you want to do.
        query: String,
        /// Number of results.
        #[arg(long, default_value_t = 5)]
        top_k: usize,
        /// Only actions that do not need a wallet.
        #[arg(long)]
        no_wallet: bool,
        /// Restrict to a provider.
        #[arg(long)]
        provider: Vec<String>,
    },
    /// Run an action by id with JSON arguments.
    Execute {
        /// Action id, e.g. `jupiter:swap`.
        action_id: String,
        /// JSON object of arguments.
        #[arg(default_value = "{}")]
        parameters: String,
    },
    /// Print the generated catalog as JSON.
    Catalog,
    /// Print the two tool descriptors.
    Describe,
    /// Clear the namespace and resync every action.
    Reindex,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => loader::from_json_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => loader::from_env().context("failed to read environment")?,
    };
    init_tracing(&settings.telemetry);

    let search = search_service(&settings, cli.offline)?;
    let manager = RegistryManager::new(settings.registry).with_search(Arc::new(search));
    let mut gateway = ToolGateway::new(manager, sample_providers()?);
    let stats = gateway.initialize().await?;
    info!(tools = stats.tool_count, total_ms = stats.total_ms, "ready");

    let output = match cli.command {
        Command::Search {
            query,
            top_k,
            no_wallet,
            provider,
        } => {
            let filters = SearchFilters {
                requires_wallet: no_wallet.then_some(false),
                provider_names: provider,
                ..SearchFilters::default()
            };
            let mut request = SearchToolsRequest::new(query).with_top_k(top_k);
            if !filters.is_empty() {
                request = request.with_filters(filters);
            }
            serde_json::to_value(gateway.search_tools(request).await?)?
        }
        Command::Execute {
            action_id,
            parameters,
        } => {
            let parameters: Value =
                serde_json::from_str(&parameters).context("parameters must be valid JSON")?;
            serde_json::to_value(
                gateway
                    .execute_tool(ExecuteToolRequest::new(action_id, parameters))
                    .await,
            )?
        }
        Command::Catalog => serde_json::from_str(&gateway.manager().export_catalog()?)?,
        Command::Describe => serde_json::to_value(gateway.tool_descriptors())?,
        Command::Reindex => serde_json::to_value(gateway.reindex().await?)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn search_service(settings: &ToolhubSettings, offline: bool) -> Result<VectorSearchService> {
    if offline {
        let mut vector = settings.vector.clone().with_dimension(256);
        vector.readiness_delay_ms = 0;
        let store = Arc::new(InMemoryVectorStore::new(vector.dimension));
        return Ok(VectorSearchService::new(store, vector)?);
    }
    Ok(VectorSearchService::from_settings(settings.vector.clone())?)
}

async fn quote(args: Value) -> ActionResult<String> {
    Ok(json!({
        "inputMint": args["inputMint"],
        "outputMint": args["outputMint"],
        "outAmount": args["amount"].as_f64().unwrap_or_default() * 142.5,
    })
    .to_string())
}

async fn price(args: Value) -> ActionResult<String> {
    Ok(format!("{} trades at 142.50 USD", args["symbol"].as_str().unwrap_or("SOL")))
}

async fn accepted(args: Value) -> ActionResult<String> {
    Ok(json!({ "status": "submitted", "request": args }).to_string())
}

fn sample_providers() -> Result<Vec<Arc<dyn ActionProvider>>> {
    let swap_schema = json!({
        "type": "object",
        "properties": {
            "inputMint": { "type": "string", "description": "Mint to sell" },
            "outputMint": { "type": "string", "description": "Mint to buy" },
            "amount": { "type": "number" },
            "slippageBps": { "type": "number", "default": 50 }
        },
        "required": ["inputMint", "outputMint", "amount"]
    });
    let on_chain = PerformanceHints {
        estimated_latency_ms: Some(2_500),
        on_chain: true,
    };

    let jupiter = StaticActionProvider::new(
        "jupiter",
        vec![
            Action::builder("jupiter_swap", "Swap tokens on Solana through the Jupiter aggregator")
                .schema(swap_schema.clone())
                .requires_wallet(true)
                .performance(on_chain.clone())
                .example("swap 1 SOL for USDC")
                .handler(accepted)
                .build()?,
            Action::builder("get_quote", "Quote the best route for a token swap without trading")
                .schema(swap_schema)
                .requires_wallet(false)
                .handler(quote)
                .build()?,
        ],
    )
    .with_description("Solana DEX aggregator")
    .with_docs_url("https://station.jup.ag/docs")
    .with_protocol_families(["svm"]);

    let pyth = StaticActionProvider::new(
        "pyth",
        vec![Action::builder("get_price", "Fetch the latest oracle price for a token symbol")
            .schema(json!({
                "type": "object",
                "properties": { "symbol": { "type": "string" } },
                "required": ["symbol"]
            }))
            .requires_wallet(false)
            .handler(price)
            .build()?],
    )
    .with_description("Pyth price oracle")
    .with_protocol_families(["svm", "evm"]);

    let opensea = StaticActionProvider::new(
        "opensea",
        vec![Action::builder("list_nft", "List an NFT from a collection for sale")
            .schema(json!({
                "type": "object",
                "properties": {
                    "contractAddress": { "type": "string" },
                    "tokenId": { "type": "string" },
                    "price": { "type": "number" },
                    "currency": { "type": "string", "enum": ["ETH", "WETH"], "default": "ETH" }
                },
                "required": ["contractAddress", "tokenId", "price"]
            }))
            .requires_wallet(true)
            .performance(on_chain)
            .handler(accepted)
            .build()?],
    )
    .with_description("NFT marketplace")
    .with_protocol_families(["evm"]);

    Ok(vec![Arc::new(jupiter), Arc::new(pyth), Arc::new(opensea)])
}
