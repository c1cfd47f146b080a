//! Action providers and invocable actions.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use toolhub_primitives::Network;

/// Result alias for action operations.
pub type ActionResult<T> = Result<T, ActionError>;

/// Trait implemented by action handlers.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Invokes the action with validated JSON arguments, returning its textual output.
    async fn invoke(&self, args: Value) -> ActionResult<String>;
}

#[async_trait]
impl<F, Fut> ActionHandler for F
where
    F: Send + Sync + Fn(Value) -> Fut,
    Fut: Future<Output = ActionResult<String>> + Send,
{
    async fn invoke(&self, args: Value) -> ActionResult<String> {
        (self)(args).await
    }
}

/// Wallet handed to providers whose actions sign or read account state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletContext {
    address: String,
    network: Network,
}

impl WalletContext {
    /// Creates a wallet context for `address` on `network`.
    #[must_use]
    pub fn new(address: impl Into<String>, network: Network) -> Self {
        Self {
            address: address.into(),
            network,
        }
    }

    /// Returns the wallet address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the network the wallet is connected to.
    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }
}

/// Hints describing the cost profile of an action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceHints {
    /// Typical latency of a call, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_latency_ms: Option<u64>,
    /// Whether the action submits an on-chain transaction.
    #[serde(default)]
    pub on_chain: bool,
}

/// A single named, invocable capability.
#[derive(Clone)]
pub struct Action {
    name: String,
    description: String,
    schema: Value,
    requires_wallet: Option<bool>,
    tags: Vec<String>,
    examples: Vec<String>,
    performance: PerformanceHints,
    handler: Arc<dyn ActionHandler>,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("requires_wallet", &self.requires_wallet)
            .finish_non_exhaustive()
    }
}

impl Action {
    /// Starts building an action.
    #[must_use]
    pub fn builder(name: impl Into<String>, description: impl Into<String>) -> ActionBuilder {
        ActionBuilder {
            name: name.into(),
            description: description.into(),
            schema: json!({ "type": "object", "properties": {} }),
            requires_wallet: None,
            tags: Vec::new(),
            examples: Vec::new(),
            performance: PerformanceHints::default(),
            handler: None,
        }
    }

    /// Returns the action name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the declared JSON Schema for the arguments.
    #[must_use]
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Returns the explicit wallet requirement, if the action declared one.
    #[must_use]
    pub fn requires_wallet(&self) -> Option<bool> {
        self.requires_wallet
    }

    /// Returns action-level tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns example invocations in natural language.
    #[must_use]
    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    /// Returns performance hints.
    #[must_use]
    pub fn performance(&self) -> &PerformanceHints {
        &self.performance
    }

    /// Executes the underlying handler.
    ///
    /// # Errors
    ///
    /// Propagates any [`ActionError`] returned by the handler.
    pub async fn invoke(&self, args: Value) -> ActionResult<String> {
        self.handler.invoke(args).await
    }
}

/// Builder for [`Action`].
pub struct ActionBuilder {
    name: String,
    description: String,
    schema: Value,
    requires_wallet: Option<bool>,
    tags: Vec<String>,
    examples: Vec<String>,
    performance: PerformanceHints,
    handler: Option<Arc<dyn ActionHandler>>,
}

impl fmt::Debug for ActionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionBuilder")
            .field("name", &self.name)
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

impl ActionBuilder {
    /// Sets the JSON Schema describing the arguments.
    #[must_use]
    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = schema;
        self
    }

    /// Declares whether the action needs a wallet, overriding the provider default.
    #[must_use]
    pub fn requires_wallet(mut self, requires_wallet: bool) -> Self {
        self.requires_wallet = Some(requires_wallet);
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Adds a natural-language usage example.
    #[must_use]
    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    /// Sets performance hints.
    #[must_use]
    pub fn performance(mut self, performance: PerformanceHints) -> Self {
        self.performance = performance;
        self
    }

    /// Sets the handler executed on invocation.
    #[must_use]
    pub fn handler<H>(mut self, handler: H) -> Self
    where
        H: ActionHandler + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Finalises the action.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::InvalidDefinition`] when the name is blank, the
    /// schema is not a JSON object, or no handler was supplied.
    pub fn build(self) -> ActionResult<Action> {
        if self.name.trim().is_empty() {
            return Err(ActionError::invalid_definition("action name cannot be empty"));
        }
        if !self.schema.is_object() {
            return Err(ActionError::invalid_definition(format!(
                "schema for `{}` must be a JSON object",
                self.name
            )));
        }
        let Some(handler) = self.handler else {
            return Err(ActionError::invalid_definition(format!(
                "action `{}` has no handler",
                self.name
            )));
        };

        Ok(Action {
            name: self.name,
            description: self.description,
            schema: self.schema,
            requires_wallet: self.requires_wallet,
            tags: self.tags,
            examples: self.examples,
            performance: self.performance,
            handler,
        })
    }
}

/// Named bundle of related actions plus network-support logic.
pub trait ActionProvider: Send + Sync {
    /// Returns the provider name.
    fn name(&self) -> &str;

    /// Returns a human-readable description, if available.
    fn description(&self) -> Option<&str> {
        None
    }

    /// Returns a documentation link, if available.
    fn docs_url(&self) -> Option<&str> {
        None
    }

    /// Returns the provider's own version string, if it reports one.
    fn version(&self) -> Option<&str> {
        None
    }

    /// Lists the provider's actions.
    ///
    /// `wallet` is supplied only when the registry determined the provider
    /// needs one.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the provider cannot enumerate its actions.
    fn list_actions(&self, wallet: Option<&WalletContext>) -> Result<Vec<Action>, ProviderError>;

    /// Returns whether the provider operates on `network`.
    fn supports_network(&self, network: &Network) -> bool;
}

/// Provider backed by a fixed list of actions.
#[derive(Debug, Clone)]
pub struct StaticActionProvider {
    name: String,
    description: Option<String>,
    docs_url: Option<String>,
    version: Option<String>,
    actions: Vec<Action>,
    protocol_families: Vec<String>,
}

impl StaticActionProvider {
    /// Creates a provider that supports every network.
    #[must_use]
    pub fn new(name: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            name: name.into(),
            description: None,
            docs_url: None,
            version: None,
            actions,
            protocol_families: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the documentation link.
    #[must_use]
    pub fn with_docs_url(mut self, url: impl Into<String>) -> Self {
        self.docs_url = Some(url.into());
        self
    }

    /// Sets the reported version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Restricts support to the listed protocol families (`evm`, `svm`, ...).
    #[must_use]
    pub fn with_protocol_families<I, S>(mut self, families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protocol_families = families.into_iter().map(Into::into).collect();
        self
    }
}

impl ActionProvider for StaticActionProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn docs_url(&self) -> Option<&str> {
        self.docs_url.as_deref()
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn list_actions(&self, _wallet: Option<&WalletContext>) -> Result<Vec<Action>, ProviderError> {
        Ok(self.actions.clone())
    }

    fn supports_network(&self, network: &Network) -> bool {
        self.protocol_families.is_empty()
            || self
                .protocol_families
                .iter()
                .any(|family| family == network.protocol_family())
    }
}

/// Errors returned by providers while listing actions.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider needs a wallet but none was supplied.
    #[error("provider `{provider}` requires a wallet")]
    WalletRequired {
        /// Name of the provider.
        provider: String,
    },

    /// Provider failed to enumerate its actions.
    #[error("provider introspection failed: {reason}")]
    Introspection {
        /// Human-readable reason for the failure.
        reason: String,
    },
}

impl ProviderError {
    /// Creates an introspection error from the supplied reason.
    #[must_use]
    pub fn introspection(reason: impl Into<String>) -> Self {
        Self::Introspection {
            reason: reason.into(),
        }
    }
}

/// Errors produced by action definition and execution.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Action definition failed validation.
    #[error("invalid action definition: {reason}")]
    InvalidDefinition {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Action execution failed.
    #[error("action execution failed: {reason}")]
    Execution {
        /// Human-readable error returned by the handler.
        reason: String,
    },
}

impl ActionError {
    /// Creates an execution error from the supplied reason.
    #[must_use]
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }

    /// Creates a definition error from the supplied reason.
    #[must_use]
    pub fn invalid_definition(reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo() -> Action {
        Action::builder("echo", "Echo the payload back")
            .schema(json!({
                "type": "object",
                "properties": { "message": { "type": "string" } },
                "required": ["message"]
            }))
            .tag("debug")
            .handler(|args: Value| async move { Ok(args.to_string()) })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn builder_produces_invocable_action() {
        let action = echo();
        assert_eq!(action.name(), "echo");
        assert_eq!(action.tags(), ["debug"]);
        let output = action.invoke(json!({ "message": "hi" })).await.unwrap();
        assert_eq!(output, r#"{"message":"hi"}"#);
    }

    #[test]
    fn builder_rejects_missing_handler() {
        let err = Action::builder("noop", "does nothing")
            .build()
            .expect_err("handler is required");
        assert!(matches!(err, ActionError::InvalidDefinition { .. }));
    }

    #[test]
    fn builder_rejects_blank_name_and_non_object_schema() {
        let err = Action::builder(" ", "blank")
            .handler(|_: Value| async move { Ok(String::new()) })
            .build()
            .expect_err("blank name");
        assert!(matches!(err, ActionError::InvalidDefinition { .. }));

        let err = Action::builder("bad", "bad schema")
            .schema(json!("string"))
            .handler(|_: Value| async move { Ok(String::new()) })
            .build()
            .expect_err("non-object schema");
        assert!(matches!(err, ActionError::InvalidDefinition { .. }));
    }

    #[test]
    fn static_provider_filters_by_protocol_family() {
        let provider = StaticActionProvider::new("jupiter", vec![echo()]).with_protocol_families(["svm"]);
        assert!(provider.supports_network(&Network::new("svm").with_network_id("solana-mainnet")));
        assert!(!provider.supports_network(&Network::new("evm").with_network_id("base-mainnet")));
        assert_eq!(provider.list_actions(None).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn handler_errors_propagate() {
        let action = Action::builder("fail", "always fails")
            .handler(|_: Value| async move { Err(ActionError::execution("rpc unavailable")) })
            .build()
            .unwrap();
        let err = action.invoke(Value::Null).await.expect_err("handler error");
        assert!(matches!(err, ActionError::Execution { reason } if reason == "rpc unavailable"));
    }
}
