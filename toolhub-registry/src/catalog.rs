//! Tool spec catalog generation.
//!
//! The embedding text produced here is a wire contract shared with every
//! other writer of the same vector index:
//!
//! ```text
//! {providerName} {actionNameWithoutProviderPrefix} | {description} | params: {parameterString}
//! ```
//!
//! Changing it silently degrades relevance for vectors written by older
//! builds, so the format is pinned by tests.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use toolhub_actions::{ActionParameter, PerformanceHints};
use toolhub_primitives::{ActionCategory, ActionId, ProviderId};
use tracing::{debug, warn};

use crate::heuristics::{normalize_tag, significant_tokens};
use crate::model::{ActionRegistry, RegistryAction, RegistryActionProvider};

/// Tag added to actions that need a wallet.
pub const WALLET_TAG: &str = "wallet-required";
/// Tag added to actions that submit on-chain transactions.
pub const EXPENSIVE_TAG: &str = "expensive";

/// Provider summary embedded in a [`ToolSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummary {
    /// Provider id.
    pub id: ProviderId,
    /// Provider name.
    pub name: String,
    /// Provider description.
    pub description: String,
    /// Provider category.
    pub category: ActionCategory,
}

/// Metadata carried alongside a [`ToolSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpecMetadata {
    /// Usage examples.
    pub examples: Vec<String>,
    /// Cost profile.
    pub performance: PerformanceHints,
    /// Build timestamp of the source action.
    pub last_updated: DateTime<Utc>,
}

/// Search- and execution-oriented view of an action joined with its provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    /// Action id.
    pub id: ActionId,
    /// Action name without the provider prefix.
    pub name: String,
    /// Action description.
    pub description: String,
    /// Owning provider.
    pub provider: ProviderSummary,
    /// Action category.
    pub category: ActionCategory,
    /// Normalised parameters.
    pub parameters: Vec<ActionParameter>,
    /// Comma-joined rendering of [`ToolSpec::parameters`], `none` when empty.
    pub parameter_string: String,
    /// Text fed to the embedding model.
    pub embedding_text: String,
    /// Whether invoking the action needs a wallet.
    pub requires_wallet: bool,
    /// Supported network ids.
    pub networks: Vec<String>,
    /// Protocol families of the supported networks.
    pub protocol_families: Vec<String>,
    /// Search tags.
    pub tags: BTreeSet<String>,
    /// Additional metadata.
    pub metadata: ToolSpecMetadata,
}

impl ToolSpec {
    /// Names of parameters callers must supply.
    pub fn required_parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|parameter| parameter.required)
            .map(|parameter| parameter.name.as_str())
    }

    /// Returns whether the tool runs on `network`, given as a network id or a
    /// protocol family.
    #[must_use]
    pub fn supports_network(&self, network: &str) -> bool {
        self.networks.iter().any(|id| id == network)
            || self.protocol_families.iter().any(|family| family == network)
    }
}

/// Aggregate information about a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMetadata {
    /// Tool specs in the catalog.
    pub tool_count: usize,
    /// Providers contributing at least one tool.
    pub provider_count: usize,
    /// Distinct categories.
    pub category_count: usize,
    /// Distinct tags.
    pub tag_count: usize,
    /// Actions dropped because their provider was missing.
    pub skipped_actions: usize,
    /// Generation timestamp.
    pub generated_at: DateTime<Utc>,
    /// Version of the registry the catalog was generated from.
    pub registry_version: String,
}

/// Tool specs plus category, provider, and tag indexes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpecCatalog {
    tools: BTreeMap<ActionId, ToolSpec>,
    by_category: BTreeMap<ActionCategory, BTreeSet<ActionId>>,
    by_provider: BTreeMap<ProviderId, BTreeSet<ActionId>>,
    by_tag: BTreeMap<String, BTreeSet<ActionId>>,
    metadata: CatalogMetadata,
}

impl ToolSpecCatalog {
    /// Tool specs keyed by action id.
    #[must_use]
    pub fn tools(&self) -> &BTreeMap<ActionId, ToolSpec> {
        &self.tools
    }

    /// Looks up a single spec.
    #[must_use]
    pub fn get(&self, id: &ActionId) -> Option<&ToolSpec> {
        self.tools.get(id)
    }

    /// Number of tool specs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` when the catalog holds no specs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Iterates over specs in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolSpec> {
        self.tools.values()
    }

    /// Specs in `category`.
    pub fn by_category(&self, category: ActionCategory) -> impl Iterator<Item = &ToolSpec> {
        self.lookup(self.by_category.get(&category))
    }

    /// Specs owned by `provider`.
    pub fn by_provider(&self, provider: &ProviderId) -> impl Iterator<Item = &ToolSpec> {
        self.lookup(self.by_provider.get(provider))
    }

    /// Specs carrying `tag`.
    pub fn by_tag(&self, tag: &str) -> impl Iterator<Item = &ToolSpec> {
        self.lookup(self.by_tag.get(tag))
    }

    /// Aggregate metadata.
    #[must_use]
    pub fn metadata(&self) -> &CatalogMetadata {
        &self.metadata
    }

    fn lookup<'a>(&'a self, ids: Option<&'a BTreeSet<ActionId>>) -> impl Iterator<Item = &'a ToolSpec> + 'a {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.tools.get(id))
    }
}

/// Flattens every action of `registry` into a [`ToolSpec`] and builds the
/// inverted indexes in a single pass.
///
/// An action whose provider is missing violates registry integrity; it is
/// logged and left out rather than aborting generation.
#[must_use]
pub fn generate_catalog(registry: &ActionRegistry) -> ToolSpecCatalog {
    let mut catalog = ToolSpecCatalog {
        tools: BTreeMap::new(),
        by_category: BTreeMap::new(),
        by_provider: BTreeMap::new(),
        by_tag: BTreeMap::new(),
        metadata: CatalogMetadata {
            tool_count: 0,
            provider_count: 0,
            category_count: 0,
            tag_count: 0,
            skipped_actions: 0,
            generated_at: Utc::now(),
            registry_version: registry.metadata().version.clone(),
        },
    };

    for action in registry.actions().values() {
        let Some(provider) = registry.provider(&action.provider_id) else {
            warn!(
                action = %action.id,
                provider = %action.provider_id,
                "action references a missing provider, skipping"
            );
            catalog.metadata.skipped_actions += 1;
            continue;
        };

        let spec = build_tool_spec(action, provider);
        catalog
            .by_category
            .entry(spec.category)
            .or_default()
            .insert(spec.id.clone());
        catalog
            .by_provider
            .entry(spec.provider.id.clone())
            .or_default()
            .insert(spec.id.clone());
        for tag in &spec.tags {
            catalog
                .by_tag
                .entry(tag.clone())
                .or_default()
                .insert(spec.id.clone());
        }
        catalog.tools.insert(spec.id.clone(), spec);
    }

    catalog.metadata.tool_count = catalog.tools.len();
    catalog.metadata.provider_count = catalog.by_provider.len();
    catalog.metadata.category_count = catalog.by_category.len();
    catalog.metadata.tag_count = catalog.by_tag.len();
    debug!(
        tools = catalog.metadata.tool_count,
        tags = catalog.metadata.tag_count,
        "catalog generated"
    );
    catalog
}

/// Joins an action with its provider.
#[must_use]
pub fn build_tool_spec(action: &RegistryAction, provider: &RegistryActionProvider) -> ToolSpec {
    let name = strip_provider_prefix(&provider.name, &action.name).to_owned();
    let parameter_string = render_parameters(&action.parameters);
    let embedding_text = embedding_text(&provider.name, &action.name, &action.description, &parameter_string);

    let mut networks = Vec::new();
    let mut protocol_families = Vec::new();
    for network in &action.networks {
        if !networks.iter().any(|id| id == network.id()) {
            networks.push(network.id().to_owned());
        }
        if !protocol_families
            .iter()
            .any(|family| family == network.protocol_family())
        {
            protocol_families.push(network.protocol_family().to_owned());
        }
    }

    let mut tags = BTreeSet::new();
    let declared = provider
        .metadata
        .tags
        .iter()
        .chain(&action.metadata.tags)
        .map(String::as_str)
        .chain([provider.category.as_str(), action.category.as_str(), provider.name.as_str()]);
    tags.extend(declared.filter_map(normalize_tag));
    tags.extend(significant_tokens(&name));
    tags.extend(networks.iter().cloned());
    tags.extend(protocol_families.iter().cloned());
    if action.requires_wallet {
        tags.insert(WALLET_TAG.to_owned());
    }
    if action.metadata.performance.on_chain {
        tags.insert(EXPENSIVE_TAG.to_owned());
    }

    ToolSpec {
        id: action.id.clone(),
        name,
        description: action.description.clone(),
        provider: ProviderSummary {
            id: provider.id.clone(),
            name: provider.name.clone(),
            description: provider.description.clone(),
            category: provider.category,
        },
        category: action.category,
        parameters: action.parameters.clone(),
        parameter_string,
        embedding_text,
        requires_wallet: action.requires_wallet,
        networks,
        protocol_families,
        tags,
        metadata: ToolSpecMetadata {
            examples: action.metadata.examples.clone(),
            performance: action.metadata.performance.clone(),
            last_updated: action.metadata.last_updated,
        },
    }
}

/// Renders parameters as a comma-joined list, or `none` when empty.
#[must_use]
pub fn render_parameters(parameters: &[ActionParameter]) -> String {
    if parameters.is_empty() {
        return "none".to_owned();
    }
    parameters
        .iter()
        .map(ActionParameter::render)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds the canonical embedding text for an action.
#[must_use]
pub fn embedding_text(
    provider_name: &str,
    action_name: &str,
    description: &str,
    parameter_string: &str,
) -> String {
    let action_name = strip_provider_prefix(provider_name, action_name);
    format!("{provider_name} {action_name} | {description} | params: {parameter_string}")
}

/// Removes a leading `{provider_name}_` from `action_name`. The match is
/// exact and case-sensitive; names that would become empty are returned
/// unchanged.
#[must_use]
pub fn strip_provider_prefix<'a>(provider_name: &str, action_name: &'a str) -> &'a str {
    if provider_name.is_empty() {
        return action_name;
    }
    match action_name
        .strip_prefix(provider_name)
        .and_then(|rest| rest.strip_prefix('_'))
    {
        Some(rest) if !rest.is_empty() => rest,
        _ => action_name,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use toolhub_actions::{ParameterType, extract_parameters};
    use toolhub_primitives::Network;

    use super::*;
    use crate::model::{ActionMetadata, ProviderMetadata, RegistryMetadata};

    fn provider(name: &str) -> RegistryActionProvider {
        RegistryActionProvider {
            id: ProviderId::from_name(name).unwrap(),
            name: name.to_owned(),
            description: String::new(),
            category: ActionCategory::Defi,
            networks: vec![Network::new("svm").with_network_id("solana-mainnet")],
            requires_wallet: true,
            metadata: ProviderMetadata {
                tags: vec!["dex".into()],
                docs_url: None,
                version: None,
                last_updated: Utc::now(),
            },
        }
    }

    fn swap_action(provider: &RegistryActionProvider, name: &str) -> RegistryAction {
        let schema = json!({
            "type": "object",
            "properties": {
                "inputMint": { "type": "string" },
                "outputMint": { "type": "string" },
                "amount": { "type": "number" },
                "slippageBps": { "type": "number", "default": 50 }
            },
            "required": ["inputMint", "outputMint", "amount"]
        });
        let display_name = strip_provider_prefix(&provider.name, name).to_owned();
        RegistryAction {
            id: ActionId::derive(&provider.id, &display_name).unwrap(),
            name: name.to_owned(),
            display_name,
            description: "Swap tokens using Jupiter aggregator".into(),
            category: ActionCategory::Defi,
            provider_id: provider.id.clone(),
            provider_name: provider.name.clone(),
            parameters: extract_parameters(&schema),
            schema,
            requires_wallet: true,
            networks: provider.networks.clone(),
            metadata: ActionMetadata {
                tags: vec!["Swap".into()],
                examples: vec![],
                performance: PerformanceHints {
                    estimated_latency_ms: None,
                    on_chain: true,
                },
                last_updated: Utc::now(),
            },
        }
    }

    fn registry(providers: Vec<RegistryActionProvider>, actions: Vec<RegistryAction>) -> ActionRegistry {
        ActionRegistry::from_parts(
            providers.into_iter().map(|p| (p.id.clone(), p)).collect(),
            actions.into_iter().map(|a| (a.id.clone(), a)).collect(),
            HashMap::new(),
            RegistryMetadata {
                provider_count: 1,
                action_count: 1,
                skipped_providers: vec![],
                skipped_actions: 0,
                built_at: Utc::now(),
                version: "test".into(),
            },
        )
    }

    #[test]
    fn jupiter_swap_embedding_text() {
        let jupiter = provider("jupiter");
        let spec = build_tool_spec(&swap_action(&jupiter, "swap"), &jupiter);
        assert_eq!(
            spec.embedding_text,
            "jupiter swap | Swap tokens using Jupiter aggregator | params: inputMint: string, \
             outputMint: string, amount: number, slippageBps: number (optional) (default: 50)"
        );
    }

    #[test]
    fn provider_prefix_is_not_repeated() {
        let jupiter = provider("jupiter");
        let prefixed = build_tool_spec(&swap_action(&jupiter, "jupiter_swap"), &jupiter);
        let plain = build_tool_spec(&swap_action(&jupiter, "swap"), &jupiter);
        assert_eq!(prefixed.embedding_text, plain.embedding_text);
        assert_eq!(prefixed.id.as_str(), "jupiter:swap");
    }

    #[test]
    fn embedding_text_is_stable_across_generations() {
        let jupiter = provider("jupiter");
        let action = swap_action(&jupiter, "swap");
        let first = build_tool_spec(&action, &jupiter);
        let second = build_tool_spec(&action, &jupiter);
        assert_eq!(first.embedding_text, second.embedding_text);
    }

    #[test]
    fn empty_parameters_render_none() {
        assert_eq!(render_parameters(&[]), "none");
        assert_eq!(
            embedding_text("pyth", "get_price", "Latest price", &render_parameters(&[])),
            "pyth get_price | Latest price | params: none"
        );
    }

    #[test]
    fn single_optional_parameter_renders_default() {
        let parameter = ActionParameter {
            name: "slippageBps".into(),
            param_type: ParameterType::Number,
            required: false,
            default: Some(json!(50)),
            enum_values: None,
            description: None,
        };
        assert_eq!(
            render_parameters(&[parameter]),
            "slippageBps: number (optional) (default: 50)"
        );
    }

    #[test]
    fn prefix_stripping_rules() {
        assert_eq!(strip_provider_prefix("jupiter", "jupiter_swap"), "swap");
        assert_eq!(strip_provider_prefix("Jupiter", "jupiter_swap"), "jupiter_swap");
        assert_eq!(
            strip_provider_prefix("Wallet Actions", "wallet_actions_get_balance"),
            "wallet_actions_get_balance"
        );
        assert_eq!(strip_provider_prefix("jupiter", "jupiter_"), "jupiter_");
        assert_eq!(strip_provider_prefix("jupiter", "jupiterswap"), "jupiterswap");
        assert_eq!(strip_provider_prefix("pyth", "get_price"), "get_price");
    }

    #[test]
    fn embedding_text_strips_only_the_literal_provider_prefix() {
        assert_eq!(
            embedding_text("jupiter", "jupiter_swap", "d", "none"),
            "jupiter swap | d | params: none"
        );
        assert_eq!(
            embedding_text("Jupiter", "jupiter_swap", "d", "none"),
            "Jupiter jupiter_swap | d | params: none"
        );
        assert_eq!(
            embedding_text("Wallet Actions", "wallet_actions_get_balance", "d", "none"),
            "Wallet Actions wallet_actions_get_balance | d | params: none"
        );
    }

    #[test]
    fn tags_union_every_source() {
        let jupiter = provider("jupiter");
        let spec = build_tool_spec(&swap_action(&jupiter, "swap"), &jupiter);
        let expected: BTreeSet<String> = [
            "dex", "swap", "defi", "jupiter", "solana-mainnet", "svm", WALLET_TAG, EXPENSIVE_TAG,
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(spec.tags, expected);
    }

    #[test]
    fn catalog_indexes_and_skips_orphans() {
        let jupiter = provider("jupiter");
        let orphan_owner = provider("ghost");
        let registry = registry(
            vec![jupiter.clone()],
            vec![swap_action(&jupiter, "swap"), swap_action(&orphan_owner, "swap")],
        );

        let catalog = generate_catalog(&registry);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.metadata().skipped_actions, 1);
        assert_eq!(catalog.by_category(ActionCategory::Defi).count(), 1);
        assert_eq!(catalog.by_provider(&jupiter.id).count(), 1);
        assert_eq!(catalog.by_tag("svm").count(), 1);
        assert_eq!(catalog.by_tag("nft").count(), 0);
    }
}
