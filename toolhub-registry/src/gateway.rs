//! Two-tool search/execute gateway.
//!
//! Callers see exactly two tools, [`SEARCH_TOOLS`] and [`EXECUTE_TOOL`],
//! however many actions sit behind them. Every failure leaves the gateway as
//! a JSON envelope carrying `success: false` and a stable `errorCode`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;
use toolhub_actions::{ActionProvider, WalletContext, apply_defaults, validate_arguments};
use toolhub_config::schema::MAX_TOP_K;
use toolhub_primitives::ActionId;
use tracing::{debug, info, warn};

use crate::error::{RegistryError, VectorSearchError};
use crate::manager::{BuildStats, RegistryManager};
use crate::search::{ActionMatch, IndexedAction, SearchFilters, SearchRequest};

/// Name of the discovery tool.
pub const SEARCH_TOOLS: &str = "search_tools";
/// Name of the execution tool.
pub const EXECUTE_TOOL: &str = "execute_tool";
/// Results returned when a search request does not say.
pub const DEFAULT_TOP_K: usize = 5;

/// Gateway-level error codes. Vector search failures keep their own codes.
pub mod codes {
    /// Search or execute called before [`initialize`](super::ToolGateway::initialize).
    pub const NOT_INITIALIZED: &str = "NOT_INITIALIZED";
    /// Tool arguments did not decode into a request.
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    /// Tool name is neither search nor execute.
    pub const UNKNOWN_TOOL: &str = "UNKNOWN_TOOL";
    /// Action id does not resolve.
    pub const UNKNOWN_ACTION: &str = "UNKNOWN_ACTION";
    /// Request or action arguments were rejected.
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    /// The action handler failed.
    pub const EXECUTION_ERROR: &str = "EXECUTION_ERROR";
    /// Registry build failed.
    pub const BUILD_ERROR: &str = "BUILD_ERROR";
}

/// Failure surfaced by the gateway, always convertible to an [`ErrorEnvelope`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct GatewayError {
    code: &'static str,
    message: String,
}

impl GatewayError {
    /// Creates an error with `code`.
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Returns the machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Converts the error into the wire envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::new(self.code, self.message.clone())
    }
}

impl From<VectorSearchError> for GatewayError {
    fn from(err: VectorSearchError) -> Self {
        Self::new(err.code().as_str(), err.message())
    }
}

impl From<RegistryError> for GatewayError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Search(inner) => inner.into(),
            other => Self::new(codes::BUILD_ERROR, other.to_string()),
        }
    }
}

/// Uniform failure payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// Always `false`.
    pub success: bool,
    /// Human-readable message.
    pub error: String,
    /// Machine-readable code.
    pub error_code: String,
    /// Failure time.
    pub timestamp: DateTime<Utc>,
}

impl ErrorEnvelope {
    /// Creates an envelope stamped with the current time.
    #[must_use]
    pub fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            error_code: code.to_owned(),
            timestamp: Utc::now(),
        }
    }

    /// Renders the envelope as JSON.
    #[must_use]
    pub fn to_value(&self) -> Value {
        json!({
            "success": false,
            "error": self.error,
            "errorCode": self.error_code,
            "timestamp": self.timestamp.to_rfc3339(),
        })
    }
}

/// Arguments of [`SEARCH_TOOLS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchToolsRequest {
    /// What the caller wants to do, in natural language. May be empty when
    /// filters are given.
    #[serde(default)]
    pub query: String,
    /// Number of results, at most 50.
    #[serde(default = "default_top_k")]
    #[schemars(range(min = 1, max = 50))]
    pub top_k: usize,
    /// Structured filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchFilters>,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl SearchToolsRequest {
    /// Creates an unfiltered request for the default number of results.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: DEFAULT_TOP_K,
            filters: None,
        }
    }

    /// Overrides the number of results.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Attaches filters.
    #[must_use]
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = Some(filters);
        self
    }
}

/// Result of [`SEARCH_TOOLS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchToolsResponse {
    /// Query as received.
    pub query: String,
    /// Filters as received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchFilters>,
    /// Ranked matches.
    pub results: Vec<ActionMatch>,
    /// Number of matches returned.
    pub total_results: usize,
    /// Response time.
    pub timestamp: DateTime<Utc>,
}

/// Arguments of [`EXECUTE_TOOL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteToolRequest {
    /// Action id returned by a search, e.g. `jupiter:swap`.
    pub action_id: String,
    /// Arguments matching the action's parameter schema.
    #[serde(default = "empty_object")]
    pub parameters: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl ExecuteToolRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(action_id: impl Into<String>, parameters: Value) -> Self {
        Self {
            action_id: action_id.into(),
            parameters,
        }
    }
}

/// Result of [`EXECUTE_TOOL`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteToolResponse {
    /// Requested action id.
    pub action_id: String,
    /// Arguments as received.
    pub parameters: Value,
    /// Whether the action ran and succeeded.
    pub success: bool,
    /// Handler output, parsed as JSON when possible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Response time.
    pub timestamp: DateTime<Utc>,
}

impl ExecuteToolResponse {
    fn succeeded(request: ExecuteToolRequest, output: String) -> Self {
        let result = serde_json::from_str(&output).unwrap_or(Value::String(output));
        Self {
            action_id: request.action_id,
            parameters: request.parameters,
            success: true,
            result: Some(result),
            error: None,
            error_code: None,
            timestamp: Utc::now(),
        }
    }

    fn failed(request: ExecuteToolRequest, code: &str, error: impl Into<String>) -> Self {
        Self {
            action_id: request.action_id,
            parameters: request.parameters,
            success: false,
            result: None,
            error: Some(error.into()),
            error_code: Some(code.to_owned()),
            timestamp: Utc::now(),
        }
    }
}

/// Descriptor of one exposed tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Tool name.
    pub name: String,
    /// What the tool does.
    pub description: String,
    /// JSON Schema of the tool arguments.
    pub input_schema: Value,
}

/// Lifecycle of a [`ToolGateway`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayState {
    /// No registry has been built yet.
    Uninitialized,
    /// A registry is built and, when configured, synced.
    Initialized,
}

/// Search/execute surface over a [`RegistryManager`].
pub struct ToolGateway {
    manager: RegistryManager,
    providers: Vec<Arc<dyn ActionProvider>>,
    wallet: Option<WalletContext>,
    state: GatewayState,
}

impl std::fmt::Debug for ToolGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolGateway")
            .field("providers", &self.providers.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ToolGateway {
    /// Creates an uninitialised gateway.
    #[must_use]
    pub fn new(manager: RegistryManager, providers: Vec<Arc<dyn ActionProvider>>) -> Self {
        Self {
            manager,
            providers,
            wallet: None,
            state: GatewayState::Uninitialized,
        }
    }

    /// Supplies the wallet forwarded to providers that need one.
    #[must_use]
    pub fn with_wallet(mut self, wallet: WalletContext) -> Self {
        self.wallet = Some(wallet);
        self
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> GatewayState {
        self.state
    }

    /// Returns the underlying manager.
    #[must_use]
    pub fn manager(&self) -> &RegistryManager {
        &self.manager
    }

    /// Builds and syncs the registry. A second call is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the build or sync failure and the gateway stays uninitialised.
    /// When only the sync failed the registry is already in place, so
    /// [`execute_tool`](Self::execute_tool) works while search does not.
    pub async fn initialize(&mut self) -> Result<BuildStats, GatewayError> {
        if self.state == GatewayState::Initialized {
            debug!("gateway already initialized");
            return Ok(self.manager.last_stats().cloned().unwrap_or_default());
        }
        let outcome = self
            .manager
            .build_registry(&self.providers, self.wallet.as_ref())
            .await?;
        self.state = GatewayState::Initialized;
        info!(tools = outcome.stats.tool_count, "gateway initialized");
        Ok(outcome.stats)
    }

    /// Reruns the full build and sync cycle, clearing the namespace first.
    ///
    /// # Errors
    ///
    /// Returns the build or sync failure.
    pub async fn reindex(&mut self) -> Result<BuildStats, GatewayError> {
        let outcome = self
            .manager
            .rebuild_and_sync(&self.providers, self.wallet.as_ref())
            .await?;
        self.state = GatewayState::Initialized;
        info!(tools = outcome.stats.tool_count, "gateway reindexed");
        Ok(outcome.stats)
    }

    /// The two tool descriptors exposed to callers.
    #[must_use]
    pub fn tool_descriptors(&self) -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor {
                name: SEARCH_TOOLS.to_owned(),
                description: "Find the actions best matching a natural-language request. \
                              Returns action ids to pass to execute_tool."
                    .to_owned(),
                input_schema: serde_json::to_value(schema_for!(SearchToolsRequest)).unwrap_or_default(),
            },
            ToolDescriptor {
                name: EXECUTE_TOOL.to_owned(),
                description: "Run an action found through search_tools with arguments \
                              matching its parameters."
                    .to_owned(),
                input_schema: serde_json::to_value(schema_for!(ExecuteToolRequest)).unwrap_or_default(),
            },
        ]
    }

    /// Ranks actions for a request.
    ///
    /// A blank query with filters lists matching tools from the local catalog
    /// with score `1.0`. Without a vector search service the local keyword
    /// search answers instead.
    ///
    /// # Errors
    ///
    /// Returns `NOT_INITIALIZED`, `VALIDATION_ERROR` for a blank unfiltered
    /// query or a `topK` outside `1..=50`, or the vector search failure.
    pub async fn search_tools(&self, request: SearchToolsRequest) -> Result<SearchToolsResponse, GatewayError> {
        self.ensure_initialized()?;
        let top_k = request.top_k;
        if top_k == 0 || top_k > MAX_TOP_K {
            return Err(GatewayError::new(
                codes::VALIDATION_ERROR,
                format!("topK must be between 1 and {MAX_TOP_K}, got {top_k}"),
            ));
        }
        let filters = request.filters.clone().unwrap_or_default();
        let query = request.query.trim();

        let results = if query.is_empty() {
            if filters.is_empty() {
                return Err(GatewayError::new(
                    codes::VALIDATION_ERROR,
                    "either a query or at least one filter is required",
                ));
            }
            self.list_filtered(&filters, top_k)
        } else if let Some(search) = self.manager.search_service() {
            let vector_request = SearchRequest::new(query, top_k).with_filters(filters);
            search.search_actions(&vector_request).await?
        } else {
            debug!("no vector search service, answering from local catalog");
            self.manager.search_tools_locally_filtered(query, top_k, &filters)
        };

        debug!(query, results = results.len(), "search_tools answered");
        Ok(SearchToolsResponse {
            total_results: results.len(),
            query: request.query,
            filters: request.filters,
            results,
            timestamp: Utc::now(),
        })
    }

    fn list_filtered(&self, filters: &SearchFilters, limit: usize) -> Vec<ActionMatch> {
        self.manager
            .catalog()
            .map(|catalog| {
                catalog
                    .iter()
                    .filter(|spec| filters.matches(spec))
                    .take(limit)
                    .map(|spec| ActionMatch {
                        action: IndexedAction::from_spec(spec),
                        score: 1.0,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolves and runs an action. Never fails: problems are reported in
    /// the response with `success: false`.
    ///
    /// Declared defaults fill in missing arguments before validation, so a
    /// parameter advertised as optional may be left out even when the schema
    /// lists it as required. Runs whenever a registry exists, including after
    /// an `initialize` whose sync failed.
    pub async fn execute_tool(&self, request: ExecuteToolRequest) -> ExecuteToolResponse {
        if self.manager.registry().is_none() {
            let err = self.not_initialized();
            return ExecuteToolResponse::failed(request, err.code(), err.message());
        }

        let invocable = request
            .action_id
            .parse::<ActionId>()
            .ok()
            .and_then(|id| self.manager.invocable(&id));
        let Some(action) = invocable else {
            warn!(action_id = %request.action_id, "unknown action");
            let message = format!("unknown action `{}`", request.action_id);
            return ExecuteToolResponse::failed(request, codes::UNKNOWN_ACTION, message);
        };

        let arguments = apply_defaults(action.schema(), request.parameters.clone());
        if let Err(err) = validate_arguments(action.schema(), &arguments) {
            debug!(action_id = %request.action_id, error = %err, "arguments rejected");
            return ExecuteToolResponse::failed(request, codes::VALIDATION_ERROR, err.to_string());
        }

        match action.invoke(arguments).await {
            Ok(output) => {
                info!(action_id = %request.action_id, "action executed");
                ExecuteToolResponse::succeeded(request, output)
            }
            Err(err) => {
                warn!(action_id = %request.action_id, error = %err, "action failed");
                ExecuteToolResponse::failed(request, codes::EXECUTION_ERROR, err.to_string())
            }
        }
    }

    /// Dispatches a tool call by name. Always returns a JSON value; failures
    /// come back as an [`ErrorEnvelope`].
    pub async fn call_tool(&self, name: &str, args: Value) -> Value {
        match name {
            SEARCH_TOOLS => match serde_json::from_value::<SearchToolsRequest>(args) {
                Ok(request) => match self.search_tools(request).await {
                    Ok(response) => to_json(&response),
                    Err(err) => err.to_envelope().to_value(),
                },
                Err(err) => ErrorEnvelope::new(codes::INVALID_REQUEST, err.to_string()).to_value(),
            },
            EXECUTE_TOOL => match serde_json::from_value::<ExecuteToolRequest>(args) {
                Ok(request) => to_json(&self.execute_tool(request).await),
                Err(err) => ErrorEnvelope::new(codes::INVALID_REQUEST, err.to_string()).to_value(),
            },
            other => {
                ErrorEnvelope::new(codes::UNKNOWN_TOOL, format!("unknown tool `{other}`")).to_value()
            }
        }
    }

    fn ensure_initialized(&self) -> Result<(), GatewayError> {
        match self.state {
            GatewayState::Initialized => Ok(()),
            GatewayState::Uninitialized => Err(self.not_initialized()),
        }
    }

    fn not_initialized(&self) -> GatewayError {
        debug!(state = ?self.state, "gateway used before initialize");
        GatewayError::new(codes::NOT_INITIALIZED, "gateway has not been initialized")
    }
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value)
        .unwrap_or_else(|err| ErrorEnvelope::new(codes::EXECUTION_ERROR, err.to_string()).to_value())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use toolhub_actions::{Action, ActionError, ActionResult, StaticActionProvider};
    use toolhub_config::{RegistrySettings, VectorSearchSettings};
    use toolhub_vector::InMemoryVectorStore;

    use super::*;
    use crate::search::VectorSearchService;

    async fn swap(args: Value) -> ActionResult<String> {
        Ok(json!({ "filled": args["amount"] }).to_string())
    }

    async fn price(_args: Value) -> ActionResult<String> {
        Ok("42.1 USD".to_owned())
    }

    async fn broken(_args: Value) -> ActionResult<String> {
        Err(ActionError::execution("rpc timeout"))
    }

    fn providers() -> Vec<Arc<dyn ActionProvider>> {
        let swap = Action::builder("jupiter_swap", "Swap tokens on Solana")
            .schema(json!({
                "type": "object",
                "properties": {
                    "amount": { "type": "number" },
                    "slippageBps": { "type": "number", "default": 50 }
                },
                "required": ["amount", "slippageBps"]
            }))
            .requires_wallet(true)
            .handler(swap)
            .build()
            .unwrap();
        let price = Action::builder("get_price", "Latest token price feed")
            .requires_wallet(false)
            .handler(price)
            .build()
            .unwrap();
        let failing = Action::builder("flaky_quote", "Quote that always fails")
            .handler(broken)
            .build()
            .unwrap();
        vec![
            Arc::new(StaticActionProvider::new("jupiter", vec![swap, failing]).with_protocol_families(["svm"])),
            Arc::new(StaticActionProvider::new("pyth", vec![price]).with_protocol_families(["svm", "evm"])),
        ]
    }

    fn local_gateway() -> ToolGateway {
        let settings = RegistrySettings {
            sync_enabled: false,
            ..RegistrySettings::default()
        };
        ToolGateway::new(RegistryManager::new(settings), providers())
    }

    fn vector_gateway() -> ToolGateway {
        let store = Arc::new(InMemoryVectorStore::new(64));
        let mut settings = VectorSearchSettings::default()
            .with_dimension(64)
            .with_namespace("gateway");
        settings.readiness_delay_ms = 1;
        let search = Arc::new(VectorSearchService::new(store, settings).unwrap());
        let manager = RegistryManager::new(RegistrySettings::default()).with_search(search);
        ToolGateway::new(manager, providers())
    }

    #[tokio::test]
    async fn calls_before_initialize_are_rejected() {
        let gateway = local_gateway();
        let err = gateway.search_tools(SearchToolsRequest::new("swap")).await.unwrap_err();
        assert_eq!(err.code(), codes::NOT_INITIALIZED);

        let response = gateway
            .execute_tool(ExecuteToolRequest::new("jupiter:swap", json!({ "amount": 1 })))
            .await;
        assert!(!response.success);
        assert_eq!(response.error_code.as_deref(), Some(codes::NOT_INITIALIZED));
    }

    #[tokio::test]
    async fn vector_search_finds_swap() {
        let mut gateway = vector_gateway();
        let stats = gateway.initialize().await.unwrap();
        assert_eq!(stats.sync.unwrap().upserted, 3);
        assert_eq!(gateway.state(), GatewayState::Initialized);

        let response = gateway
            .search_tools(SearchToolsRequest::new("swap tokens on solana").with_top_k(2))
            .await
            .unwrap();
        assert_eq!(response.total_results, 2);
        assert_eq!(response.results[0].action.action_id, "jupiter:swap");
    }

    #[tokio::test]
    async fn filter_only_search_lists_local_matches() {
        let mut gateway = local_gateway();
        gateway.initialize().await.unwrap();

        let filters = SearchFilters {
            provider_names: vec!["pyth".into()],
            ..SearchFilters::default()
        };
        let response = gateway
            .search_tools(SearchToolsRequest::new("").with_filters(filters))
            .await
            .unwrap();
        assert_eq!(response.total_results, 1);
        assert_eq!(response.results[0].action.action_id, "pyth:get_price");
        assert!((response.results[0].score - 1.0).abs() < f32::EPSILON);

        let err = gateway.search_tools(SearchToolsRequest::new("  ")).await.unwrap_err();
        assert_eq!(err.code(), codes::VALIDATION_ERROR);
    }

    #[tokio::test]
    async fn local_fallback_answers_without_vector_service() {
        let mut gateway = local_gateway();
        gateway.initialize().await.unwrap();
        let response = gateway.search_tools(SearchToolsRequest::new("price")).await.unwrap();
        assert_eq!(response.results[0].action.action_id, "pyth:get_price");
    }

    #[tokio::test]
    async fn execute_runs_validated_actions() {
        let mut gateway = local_gateway();
        gateway.initialize().await.unwrap();

        let ok = gateway
            .execute_tool(ExecuteToolRequest::new("jupiter:swap", json!({ "amount": 5 })))
            .await;
        assert!(ok.success);
        assert_eq!(ok.result, Some(json!({ "filled": 5 })));

        let text = gateway
            .execute_tool(ExecuteToolRequest::new("pyth:get_price", json!({})))
            .await;
        assert_eq!(text.result, Some(json!("42.1 USD")));
    }

    #[tokio::test]
    async fn execute_fills_declared_defaults() {
        let mut gateway = local_gateway();
        gateway.initialize().await.unwrap();

        let response = gateway
            .execute_tool(ExecuteToolRequest::new("jupiter:swap", json!({ "amount": 2 })))
            .await;
        assert!(response.success, "{response:?}");
        assert_eq!(response.parameters, json!({ "amount": 2 }));
    }

    #[tokio::test]
    async fn top_k_out_of_range_is_rejected() {
        let mut gateway = local_gateway();
        gateway.initialize().await.unwrap();

        for top_k in [0, MAX_TOP_K + 1, 500] {
            let err = gateway
                .search_tools(SearchToolsRequest::new("swap").with_top_k(top_k))
                .await
                .unwrap_err();
            assert_eq!(err.code(), codes::VALIDATION_ERROR, "topK {top_k}");
        }
        for top_k in [1, MAX_TOP_K] {
            gateway
                .search_tools(SearchToolsRequest::new("swap").with_top_k(top_k))
                .await
                .unwrap();
        }

        let envelope = gateway
            .call_tool(SEARCH_TOOLS, json!({ "query": "swap", "topK": 0 }))
            .await;
        assert_eq!(envelope["errorCode"], json!(codes::VALIDATION_ERROR));
    }

    #[tokio::test]
    async fn execute_works_after_failed_sync() {
        let store = Arc::new(InMemoryVectorStore::new(64));
        let mut narrow = VectorSearchSettings::default()
            .with_dimension(64)
            .with_namespace("gateway");
        narrow.readiness_delay_ms = 1;
        VectorSearchService::new(store.clone(), narrow.clone())
            .unwrap()
            .initialize()
            .await
            .unwrap();

        let mut wide = narrow;
        wide.dimension = 128;
        let search = Arc::new(VectorSearchService::new(store, wide).unwrap());
        let manager = RegistryManager::new(RegistrySettings::default()).with_search(search);
        let mut gateway = ToolGateway::new(manager, providers());

        let err = gateway.initialize().await.unwrap_err();
        assert_eq!(err.code(), "INITIALIZATION_ERROR");
        assert_eq!(gateway.state(), GatewayState::Uninitialized);

        let search_err = gateway.search_tools(SearchToolsRequest::new("swap")).await.unwrap_err();
        assert_eq!(search_err.code(), codes::NOT_INITIALIZED);

        let response = gateway
            .execute_tool(ExecuteToolRequest::new("jupiter:swap", json!({ "amount": 3 })))
            .await;
        assert!(response.success, "{response:?}");
        assert_eq!(response.result, Some(json!({ "filled": 3 })));
    }

    #[tokio::test]
    async fn execute_reports_structured_failures() {
        let mut gateway = local_gateway();
        gateway.initialize().await.unwrap();

        let unknown = gateway
            .execute_tool(ExecuteToolRequest::new("nope:missing", json!({})))
            .await;
        assert!(!unknown.success);
        assert_eq!(unknown.error_code.as_deref(), Some(codes::UNKNOWN_ACTION));

        let invalid = gateway
            .execute_tool(ExecuteToolRequest::new("jupiter:swap", json!({ "amount": "lots" })))
            .await;
        assert_eq!(invalid.error_code.as_deref(), Some(codes::VALIDATION_ERROR));

        let not_object = gateway
            .execute_tool(ExecuteToolRequest::new("jupiter:swap", json!([1, 2])))
            .await;
        assert_eq!(not_object.error_code.as_deref(), Some(codes::VALIDATION_ERROR));

        let failed = gateway
            .execute_tool(ExecuteToolRequest::new("jupiter:flaky_quote", json!({})))
            .await;
        assert_eq!(failed.error_code.as_deref(), Some(codes::EXECUTION_ERROR));
        assert!(failed.error.unwrap().contains("rpc timeout"));
    }

    #[tokio::test]
    async fn call_tool_always_returns_json() {
        let mut gateway = local_gateway();
        gateway.initialize().await.unwrap();

        let found = gateway.call_tool(SEARCH_TOOLS, json!({ "query": "swap" })).await;
        assert!(found["results"].as_array().is_some_and(|r| !r.is_empty()));

        let bad = gateway.call_tool(SEARCH_TOOLS, json!({ "topK": "five" })).await;
        assert_eq!(bad["errorCode"], json!(codes::INVALID_REQUEST));
        assert_eq!(bad["success"], json!(false));

        let unknown = gateway.call_tool("list_everything", json!({})).await;
        assert_eq!(unknown["errorCode"], json!(codes::UNKNOWN_TOOL));

        let missing = gateway
            .call_tool(EXECUTE_TOOL, json!({ "actionId": "ghost:tool", "parameters": {} }))
            .await;
        assert_eq!(missing["success"], json!(false));
        assert_eq!(missing["errorCode"], json!(codes::UNKNOWN_ACTION));
    }

    #[test]
    fn descriptors_expose_two_tools_with_schemas() {
        let gateway = local_gateway();
        let descriptors = gateway.tool_descriptors();
        let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec![SEARCH_TOOLS, EXECUTE_TOOL]);
        assert!(descriptors[0].input_schema["properties"]["topK"].is_object());
        assert!(descriptors[1].input_schema["required"]
            .as_array()
            .is_some_and(|required| required.contains(&json!("actionId"))));
    }

    #[test]
    fn registry_errors_map_to_codes() {
        let err: GatewayError = RegistryError::NoProviders { attempted: 2 }.into();
        assert_eq!(err.code(), codes::BUILD_ERROR);
        let envelope = err.to_envelope().to_value();
        assert_eq!(envelope["success"], json!(false));
    }
}
