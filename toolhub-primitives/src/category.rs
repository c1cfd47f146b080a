//! Action categories.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Functional grouping assigned to providers and actions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionCategory {
    /// Wallet management: balances, transfers of native assets, addresses.
    Wallet,
    /// Fungible token operations.
    Token,
    /// Swaps, lending, liquidity, staking.
    Defi,
    /// Non-fungible tokens.
    Nft,
    /// Social networks and messaging.
    Social,
    /// Read-only market and chain data.
    Data,
    /// Payments and on/off ramps.
    Payments,
    /// Anything else.
    Utility,
}

impl ActionCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Wallet,
        Self::Token,
        Self::Defi,
        Self::Nft,
        Self::Social,
        Self::Data,
        Self::Payments,
        Self::Utility,
    ];

    /// Returns the lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wallet => "wallet",
            Self::Token => "token",
            Self::Defi => "defi",
            Self::Nft => "nft",
            Self::Social => "social",
            Self::Data => "data",
            Self::Payments => "payments",
            Self::Utility => "utility",
        }
    }

    /// Returns `true` for categories whose actions usually sign transactions.
    #[must_use]
    pub const fn usually_requires_wallet(self) -> bool {
        matches!(
            self,
            Self::Wallet | Self::Token | Self::Defi | Self::Nft | Self::Payments
        )
    }
}

impl Display for ActionCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == needle)
            .ok_or_else(|| Error::UnknownCategory(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("DeFi".parse::<ActionCategory>().unwrap(), ActionCategory::Defi);
        assert!("gaming".parse::<ActionCategory>().is_err());
    }

    #[test]
    fn labels_round_trip() {
        for category in ActionCategory::ALL {
            assert_eq!(category.as_str().parse::<ActionCategory>().unwrap(), category);
        }
    }
}
