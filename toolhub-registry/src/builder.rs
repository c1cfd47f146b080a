//! Registry builder: providers in, immutable [`ActionRegistry`] out.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use toolhub_actions::{Action, ActionProvider, WalletContext, extract_parameters};
use toolhub_config::RegistrySettings;
use toolhub_primitives::{ActionCategory, ActionId, Network, ProviderId};
use tracing::{debug, info, warn};

use crate::error::{RegistryError, RegistryResult};
use crate::heuristics::{categorize, dominant_category, normalize_tag};
use crate::model::{
    ActionMetadata, ActionRegistry, ProviderMetadata, REGISTRY_VERSION, RegistryAction,
    RegistryActionProvider, RegistryMetadata,
};

/// Builds registries from caller-supplied providers.
///
/// Identifiers are pure functions of provider names and action names, so
/// building twice from the same providers yields the same ids.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    settings: RegistrySettings,
}

struct BuildState {
    providers: BTreeMap<ProviderId, RegistryActionProvider>,
    actions: BTreeMap<ActionId, RegistryAction>,
    invocables: HashMap<ActionId, Action>,
    skipped_providers: Vec<String>,
    skipped_actions: usize,
    built_at: DateTime<Utc>,
}

impl RegistryBuilder {
    /// Creates a builder applying `settings` on top of the built-in heuristics.
    #[must_use]
    pub fn new(settings: RegistrySettings) -> Self {
        Self { settings }
    }

    /// Returns the builder settings.
    #[must_use]
    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    /// Registers every provider that can be introspected.
    ///
    /// Providers and actions that fail are logged and skipped. `wallet` is
    /// forwarded only to providers that need one.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NoProviders`] when no provider registered.
    pub fn build_from_providers(
        &self,
        providers: &[Arc<dyn ActionProvider>],
        wallet: Option<&WalletContext>,
    ) -> RegistryResult<ActionRegistry> {
        let mut state = BuildState {
            providers: BTreeMap::new(),
            actions: BTreeMap::new(),
            invocables: HashMap::new(),
            skipped_providers: Vec::new(),
            skipped_actions: 0,
            built_at: Utc::now(),
        };

        for provider in providers {
            if let Err(reason) = self.register_provider(provider.as_ref(), wallet, &mut state) {
                warn!(provider = provider.name(), %reason, "skipping provider");
                state.skipped_providers.push(provider.name().to_owned());
            }
        }

        if state.providers.is_empty() {
            return Err(RegistryError::NoProviders {
                attempted: providers.len(),
            });
        }

        let metadata = RegistryMetadata {
            provider_count: state.providers.len(),
            action_count: state.actions.len(),
            skipped_providers: state.skipped_providers,
            skipped_actions: state.skipped_actions,
            built_at: state.built_at,
            version: REGISTRY_VERSION.to_owned(),
        };
        info!(
            providers = metadata.provider_count,
            actions = metadata.action_count,
            skipped_providers = metadata.skipped_providers.len(),
            skipped_actions = metadata.skipped_actions,
            "registry built"
        );

        Ok(ActionRegistry::from_parts(
            state.providers,
            state.actions,
            state.invocables,
            metadata,
        ))
    }

    fn register_provider(
        &self,
        provider: &dyn ActionProvider,
        wallet: Option<&WalletContext>,
        state: &mut BuildState,
    ) -> Result<(), String> {
        let name = provider.name().trim();
        if name.is_empty() {
            return Err("provider name is empty".into());
        }
        let description = provider.description().unwrap_or_default().trim().to_owned();

        let id = match self.settings.provider_ids.get(name) {
            Some(explicit) => ProviderId::new(explicit.as_str()),
            None => ProviderId::from_name(name),
        }
        .map_err(|err| err.to_string())?;
        if state.providers.contains_key(&id) {
            return Err(format!("duplicate provider id `{id}`"));
        }

        let explicit_category = self.settings.provider_categories.get(name).copied();
        let named_category = explicit_category.or_else(|| categorize([name, description.as_str()]));
        let requires_wallet = self
            .settings
            .wallet_requirements
            .get(name)
            .copied()
            .unwrap_or_else(|| named_category.is_some_and(ActionCategory::usually_requires_wallet));

        let listed = provider
            .list_actions(if requires_wallet { wallet } else { None })
            .map_err(|err| err.to_string())?;

        let networks = self.settings.provider_networks.get(name).cloned().unwrap_or_else(|| {
            self.settings
                .candidate_networks
                .iter()
                .filter(|network| provider.supports_network(network))
                .cloned()
                .collect()
        });

        let mut drafts: Vec<(ActionId, Action, Option<ActionCategory>)> =
            Vec::with_capacity(listed.len());
        for action in listed {
            let display_name = id_action_name(name, action.name()).trim().to_owned();
            let action_id = match ActionId::derive(&id, &display_name) {
                Ok(action_id) => action_id,
                Err(err) => {
                    warn!(provider = %id, action = action.name(), error = %err, "skipping action");
                    state.skipped_actions += 1;
                    continue;
                }
            };
            if state.actions.contains_key(&action_id)
                || drafts.iter().any(|(existing, _, _)| existing == &action_id)
            {
                warn!(action = %action_id, "duplicate action id, skipping");
                state.skipped_actions += 1;
                continue;
            }
            let heuristic = categorize([display_name.as_str(), action.description()]);
            drafts.push((action_id, action, heuristic));
        }

        let category = named_category
            .or_else(|| dominant_category(drafts.iter().filter_map(|(_, _, heuristic)| *heuristic)))
            .unwrap_or(ActionCategory::Utility);
        let requires_wallet = requires_wallet
            || drafts
                .iter()
                .any(|(_, action, _)| action.requires_wallet() == Some(true));

        let mut tags: Vec<String> = self
            .settings
            .provider_tags
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|tag| normalize_tag(tag))
            .collect();
        tags.sort();
        tags.dedup();

        debug!(provider = %id, actions = drafts.len(), category = %category, "provider introspected");

        for (action_id, action, heuristic) in drafts {
            let registry_action = self.build_action(
                &action_id,
                &id,
                name,
                &action,
                heuristic,
                category,
                requires_wallet,
                &networks,
                state.built_at,
            );
            state.invocables.insert(action_id.clone(), action);
            state.actions.insert(action_id, registry_action);
        }

        state.providers.insert(
            id.clone(),
            RegistryActionProvider {
                id,
                name: name.to_owned(),
                description,
                category,
                networks,
                requires_wallet,
                metadata: ProviderMetadata {
                    tags,
                    docs_url: provider.docs_url().map(str::to_owned),
                    version: provider.version().map(str::to_owned),
                    last_updated: state.built_at,
                },
            },
        );
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn build_action(
        &self,
        action_id: &ActionId,
        provider_id: &ProviderId,
        provider_name: &str,
        action: &Action,
        heuristic: Option<ActionCategory>,
        provider_category: ActionCategory,
        provider_requires_wallet: bool,
        provider_networks: &[Network],
        built_at: DateTime<Utc>,
    ) -> RegistryAction {
        let category = self
            .action_override(&self.settings.action_categories, action_id, action.name())
            .copied()
            .or(heuristic)
            .unwrap_or(provider_category);
        let networks = self
            .action_override(&self.settings.action_networks, action_id, action.name())
            .cloned()
            .unwrap_or_else(|| provider_networks.to_vec());

        let mut tags: Vec<String> = action
            .tags()
            .iter()
            .chain(
                self.action_override(&self.settings.action_tags, action_id, action.name())
                    .into_iter()
                    .flatten(),
            )
            .filter_map(|tag| normalize_tag(tag))
            .collect();
        tags.sort();
        tags.dedup();

        RegistryAction {
            id: action_id.clone(),
            name: action.name().to_owned(),
            display_name: action_id.action_part().to_owned(),
            description: action.description().trim().to_owned(),
            category,
            provider_id: provider_id.clone(),
            provider_name: provider_name.to_owned(),
            parameters: extract_parameters(action.schema()),
            schema: action.schema().clone(),
            requires_wallet: action.requires_wallet().unwrap_or(provider_requires_wallet),
            networks,
            metadata: ActionMetadata {
                tags,
                examples: action.examples().to_vec(),
                performance: action.performance().clone(),
                last_updated: built_at,
            },
        }
    }

    fn action_override<'a, T>(
        &self,
        table: &'a HashMap<String, T>,
        action_id: &ActionId,
        action_name: &str,
    ) -> Option<&'a T> {
        table
            .get(action_id.as_str())
            .or_else(|| table.get(action_name))
    }
}

/// Action part used for id derivation. Unlike the embedding text this drops a
/// `{provider}_` prefix matched ASCII case-insensitively, with spaces and
/// dashes in the provider name read as underscores, so `Wallet Actions` and
/// `wallet_actions_get_balance` yield `wallet-actions:get_balance`.
fn id_action_name<'a>(provider_name: &str, action_name: &'a str) -> &'a str {
    let snake = provider_name
        .trim()
        .chars()
        .map(|ch| if ch == ' ' || ch == '-' { '_' } else { ch })
        .collect::<String>();
    if snake.is_empty() {
        return action_name;
    }
    let Some(head) = action_name.get(..snake.len()) else {
        return action_name;
    };
    if !head.eq_ignore_ascii_case(&snake) {
        return action_name;
    }
    match action_name[snake.len()..].strip_prefix('_') {
        Some(rest) if !rest.is_empty() => rest,
        _ => action_name,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use toolhub_actions::{ActionResult, ProviderError, StaticActionProvider};

    use super::*;

    async fn echo(args: serde_json::Value) -> ActionResult<String> {
        Ok(args.to_string())
    }

    fn action(name: &str, description: &str) -> Action {
        Action::builder(name, description)
            .schema(json!({
                "type": "object",
                "properties": { "amount": { "type": "number" } },
                "required": ["amount"]
            }))
            .handler(echo)
            .build()
            .unwrap()
    }

    fn jupiter() -> Arc<dyn ActionProvider> {
        Arc::new(
            StaticActionProvider::new(
                "jupiter",
                vec![
                    action("jupiter_swap", "Swap tokens on Solana"),
                    action("get_quote", "Quote a swap route"),
                ],
            )
            .with_protocol_families(["svm"]),
        )
    }

    struct Broken;

    impl ActionProvider for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn list_actions(&self, _wallet: Option<&WalletContext>) -> Result<Vec<Action>, ProviderError> {
            Err(ProviderError::introspection("upstream offline"))
        }

        fn supports_network(&self, _network: &Network) -> bool {
            true
        }
    }

    struct WalletProbe;

    impl ActionProvider for WalletProbe {
        fn name(&self) -> &str {
            "wallet"
        }

        fn list_actions(&self, wallet: Option<&WalletContext>) -> Result<Vec<Action>, ProviderError> {
            let Some(wallet) = wallet else {
                return Err(ProviderError::WalletRequired {
                    provider: "wallet".into(),
                });
            };
            Ok(vec![action("get_balance", &format!("Balance of {}", wallet.address()))])
        }

        fn supports_network(&self, network: &Network) -> bool {
            network.protocol_family() == "evm"
        }
    }

    #[test]
    fn id_derivation_tolerates_provider_spelling() {
        assert_eq!(id_action_name("Jupiter", "jupiter_swap"), "swap");
        assert_eq!(id_action_name("Wallet Actions", "wallet_actions_get_balance"), "get_balance");
        assert_eq!(id_action_name("jupiter", "jupiter_"), "jupiter_");
        assert_eq!(id_action_name("pyth", "get_price"), "get_price");
    }

    #[test]
    fn ids_are_stable_across_builds() {
        let builder = RegistryBuilder::default();
        let providers = vec![jupiter()];
        let first = builder.build_from_providers(&providers, None).unwrap();
        let second = builder.build_from_providers(&providers, None).unwrap();
        let ids = |registry: &ActionRegistry| registry.actions().keys().cloned().collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(
            ids(&first).iter().map(ActionId::as_str).collect::<Vec<_>>(),
            vec!["jupiter:get_quote", "jupiter:swap"]
        );
    }

    #[test]
    fn failing_provider_does_not_remove_others() {
        let builder = RegistryBuilder::default();
        let providers: Vec<Arc<dyn ActionProvider>> = vec![Arc::new(Broken), jupiter()];
        let registry = builder.build_from_providers(&providers, None).unwrap();
        assert_eq!(registry.actions().len(), 2);
        assert_eq!(registry.metadata().skipped_providers, vec!["broken".to_owned()]);
    }

    #[test]
    fn zero_registered_providers_is_an_error() {
        let builder = RegistryBuilder::default();
        let providers: Vec<Arc<dyn ActionProvider>> = vec![Arc::new(Broken)];
        let err = builder.build_from_providers(&providers, None).unwrap_err();
        assert!(matches!(err, RegistryError::NoProviders { attempted: 1 }));
    }

    #[test]
    fn wallet_is_forwarded_only_when_required() {
        let builder = RegistryBuilder::default();
        let wallet = WalletContext::new("0xabc", Network::new("evm").with_network_id("base-mainnet"));
        let providers: Vec<Arc<dyn ActionProvider>> = vec![Arc::new(WalletProbe)];

        let registry = builder.build_from_providers(&providers, Some(&wallet)).unwrap();
        let action = registry.actions().values().next().unwrap();
        assert!(action.requires_wallet);
        assert_eq!(action.description, "Balance of 0xabc");
        assert!(action.networks.iter().all(|n| n.protocol_family() == "evm"));

        assert!(builder.build_from_providers(&providers, None).is_err());
    }

    #[test]
    fn heuristics_and_overrides() {
        let mut settings = RegistrySettings::default();
        settings
            .action_categories
            .insert("jupiter:get_quote".into(), ActionCategory::Data);
        settings.provider_tags.insert("jupiter".into(), vec!["Aggregator".into()]);
        let registry = RegistryBuilder::new(settings)
            .build_from_providers(&[jupiter()], None)
            .unwrap();

        let provider = registry.provider(&ProviderId::new("jupiter").unwrap()).unwrap();
        assert_eq!(provider.category, ActionCategory::Defi);
        assert!(provider.requires_wallet);
        assert_eq!(provider.metadata.tags, vec!["aggregator".to_owned()]);
        assert!(provider.networks.iter().all(|n| n.protocol_family() == "svm"));

        let quote = registry.action(&"jupiter:get_quote".parse().unwrap()).unwrap();
        assert_eq!(quote.category, ActionCategory::Data);
        let swap = registry.action(&"jupiter:swap".parse().unwrap()).unwrap();
        assert_eq!(swap.name, "jupiter_swap");
        assert_eq!(swap.display_name, "swap");
        assert_eq!(swap.category, ActionCategory::Defi);
        assert_eq!(swap.parameters.len(), 1);
        assert!(registry.invocable(&swap.id).is_some());
    }

    #[test]
    fn duplicate_actions_are_skipped() {
        let provider: Arc<dyn ActionProvider> = Arc::new(StaticActionProvider::new(
            "jupiter",
            vec![action("swap", "first"), action("jupiter_swap", "second")],
        ));
        let registry = RegistryBuilder::default()
            .build_from_providers(&[provider], None)
            .unwrap();
        assert_eq!(registry.actions().len(), 1);
        assert_eq!(registry.metadata().skipped_actions, 1);
        let swap = registry.actions().values().next().unwrap();
        assert_eq!(swap.description, "first");
    }
}
