//! Registry data model.
//!
//! An [`ActionRegistry`] is built once and never mutated; rebuilding produces
//! a fresh instance. Actions reference their provider by id only.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolhub_actions::{Action, ActionParameter, PerformanceHints};
use toolhub_primitives::{ActionCategory, ActionId, Network, ProviderId};

/// Version stamped on every registry built by this crate.
pub const REGISTRY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Descriptive metadata attached to a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMetadata {
    /// Derived and configured tags.
    pub tags: Vec<String>,
    /// Documentation link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_url: Option<String>,
    /// Provider-reported version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Build timestamp.
    pub last_updated: DateTime<Utc>,
}

/// Provider entry in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryActionProvider {
    /// Stable identifier.
    pub id: ProviderId,
    /// Name as reported by the provider.
    pub name: String,
    /// Description, empty when the provider supplies none.
    pub description: String,
    /// Functional category.
    pub category: ActionCategory,
    /// Networks the provider operates on.
    pub networks: Vec<Network>,
    /// Whether the provider needs a wallet to list or run its actions.
    pub requires_wallet: bool,
    /// Descriptive metadata.
    pub metadata: ProviderMetadata,
}

/// Descriptive metadata attached to an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMetadata {
    /// Action-level tags (declared plus configured).
    pub tags: Vec<String>,
    /// Natural-language usage examples.
    pub examples: Vec<String>,
    /// Cost profile.
    pub performance: PerformanceHints,
    /// Build timestamp.
    pub last_updated: DateTime<Utc>,
}

/// Action entry in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryAction {
    /// Stable identifier, `"{provider_id}:{display_name}"`.
    pub id: ActionId,
    /// Name as declared by the provider.
    pub name: String,
    /// Name with any `{provider}_` prefix removed.
    pub display_name: String,
    /// Description.
    pub description: String,
    /// Functional category.
    pub category: ActionCategory,
    /// Owning provider.
    pub provider_id: ProviderId,
    /// Owning provider's name.
    pub provider_name: String,
    /// Normalised parameters in declaration order.
    pub parameters: Vec<ActionParameter>,
    /// Declared JSON Schema for the arguments.
    pub schema: Value,
    /// Whether invoking the action needs a wallet.
    pub requires_wallet: bool,
    /// Networks the action operates on.
    pub networks: Vec<Network>,
    /// Descriptive metadata.
    pub metadata: ActionMetadata,
}

/// Aggregate information about a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryMetadata {
    /// Providers registered.
    pub provider_count: usize,
    /// Actions registered.
    pub action_count: usize,
    /// Names of providers skipped because introspection failed.
    pub skipped_providers: Vec<String>,
    /// Actions skipped because their definition was unusable or duplicated.
    pub skipped_actions: usize,
    /// Build timestamp.
    pub built_at: DateTime<Utc>,
    /// Registry format version.
    pub version: String,
}

/// Immutable set of providers and actions plus the invocables behind them.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    providers: BTreeMap<ProviderId, RegistryActionProvider>,
    actions: BTreeMap<ActionId, RegistryAction>,
    invocables: HashMap<ActionId, Action>,
    metadata: RegistryMetadata,
}

impl ActionRegistry {
    pub(crate) fn from_parts(
        providers: BTreeMap<ProviderId, RegistryActionProvider>,
        actions: BTreeMap<ActionId, RegistryAction>,
        invocables: HashMap<ActionId, Action>,
        metadata: RegistryMetadata,
    ) -> Self {
        Self {
            providers,
            actions,
            invocables,
            metadata,
        }
    }

    /// Providers keyed by id.
    #[must_use]
    pub fn providers(&self) -> &BTreeMap<ProviderId, RegistryActionProvider> {
        &self.providers
    }

    /// Actions keyed by id.
    #[must_use]
    pub fn actions(&self) -> &BTreeMap<ActionId, RegistryAction> {
        &self.actions
    }

    /// Looks up a provider.
    #[must_use]
    pub fn provider(&self, id: &ProviderId) -> Option<&RegistryActionProvider> {
        self.providers.get(id)
    }

    /// Looks up an action.
    #[must_use]
    pub fn action(&self, id: &ActionId) -> Option<&RegistryAction> {
        self.actions.get(id)
    }

    /// Looks up the invocable behind an action id.
    #[must_use]
    pub fn invocable(&self, id: &ActionId) -> Option<&Action> {
        self.invocables.get(id)
    }

    /// Actions owned by `provider`, in id order.
    pub fn actions_for_provider<'a>(
        &'a self,
        provider: &'a ProviderId,
    ) -> impl Iterator<Item = &'a RegistryAction> + 'a {
        self.actions
            .values()
            .filter(move |action| &action.provider_id == provider)
    }

    /// Aggregate metadata.
    #[must_use]
    pub fn metadata(&self) -> &RegistryMetadata {
        &self.metadata
    }
}
