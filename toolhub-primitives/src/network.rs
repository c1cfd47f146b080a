//! Network descriptors.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Network an action provider may operate on.
///
/// Mirrors the shape providers reason about: a protocol family (`evm`,
/// `svm`, ...) plus an optional concrete network and chain identifier.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    protocol_family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    network_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chain_id: Option<String>,
}

impl Network {
    /// Creates a network descriptor for the supplied protocol family.
    #[must_use]
    pub fn new(protocol_family: impl Into<String>) -> Self {
        Self {
            protocol_family: protocol_family.into(),
            network_id: None,
            chain_id: None,
        }
    }

    /// Sets the concrete network identifier.
    #[must_use]
    pub fn with_network_id(mut self, network_id: impl Into<String>) -> Self {
        self.network_id = Some(network_id.into());
        self
    }

    /// Sets the chain identifier.
    #[must_use]
    pub fn with_chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }

    /// Returns the protocol family.
    #[must_use]
    pub fn protocol_family(&self) -> &str {
        &self.protocol_family
    }

    /// Returns the network identifier, if any.
    #[must_use]
    pub fn network_id(&self) -> Option<&str> {
        self.network_id.as_deref()
    }

    /// Returns the chain identifier, if any.
    #[must_use]
    pub fn chain_id(&self) -> Option<&str> {
        self.chain_id.as_deref()
    }

    /// Identifier used in catalogs and filters: the network id when known,
    /// otherwise the protocol family.
    #[must_use]
    pub fn id(&self) -> &str {
        self.network_id.as_deref().unwrap_or(&self.protocol_family)
    }

    /// Networks probed when a provider does not declare its supported set.
    #[must_use]
    pub fn well_known() -> Vec<Self> {
        vec![
            Self::new("evm").with_network_id("base-mainnet").with_chain_id("8453"),
            Self::new("evm").with_network_id("base-sepolia").with_chain_id("84532"),
            Self::new("evm").with_network_id("ethereum-mainnet").with_chain_id("1"),
            Self::new("evm").with_network_id("ethereum-sepolia").with_chain_id("11155111"),
            Self::new("evm").with_network_id("arbitrum-mainnet").with_chain_id("42161"),
            Self::new("evm").with_network_id("optimism-mainnet").with_chain_id("10"),
            Self::new("evm").with_network_id("polygon-mainnet").with_chain_id("137"),
            Self::new("svm").with_network_id("solana-mainnet"),
            Self::new("svm").with_network_id("solana-devnet"),
        ]
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.network_id {
            Some(id) => write!(f, "{}/{id}", self.protocol_family),
            None => f.write_str(&self.protocol_family),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_prefers_network_id() {
        let network = Network::new("evm").with_network_id("base-mainnet");
        assert_eq!(network.id(), "base-mainnet");
        assert_eq!(Network::new("svm").id(), "svm");
    }

    #[test]
    fn serializes_camel_case() {
        let network = Network::new("evm").with_network_id("base-sepolia");
        let json = serde_json::to_value(&network).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"protocolFamily": "evm", "networkId": "base-sepolia"})
        );
    }
}
