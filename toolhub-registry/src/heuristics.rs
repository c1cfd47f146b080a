//! Keyword heuristics for categories, wallet requirements, and tags.

use toolhub_primitives::ActionCategory;

/// Keyword table scanned in order; earlier rows win ties.
const CATEGORY_KEYWORDS: &[(ActionCategory, &[&str])] = &[
    (
        ActionCategory::Nft,
        &["nft", "nfts", "erc721", "erc1155", "collection", "opensea", "zora", "collectible"],
    ),
    (
        ActionCategory::Defi,
        &[
            "swap", "dex", "lend", "borrow", "repay", "stake", "unstake", "yield", "liquidity",
            "pool", "vault", "bridge", "jupiter", "uniswap", "aave", "compound", "morpho", "defi",
            "perp", "leverage",
        ],
    ),
    (
        ActionCategory::Token,
        &["token", "tokens", "erc20", "spl", "mint", "approve", "allowance", "airdrop", "supply"],
    ),
    (
        ActionCategory::Payments,
        &["pay", "payment", "payments", "invoice", "x402", "checkout", "onramp", "offramp", "tip"],
    ),
    (
        ActionCategory::Social,
        &["social", "farcaster", "twitter", "tweet", "cast", "post", "lens", "follow", "message"],
    ),
    (
        ActionCategory::Wallet,
        &["wallet", "balance", "address", "transfer", "send", "sign", "account", "faucet"],
    ),
    (
        ActionCategory::Data,
        &[
            "price", "prices", "oracle", "feed", "pyth", "chainlink", "analytics", "data", "quote",
            "lookup", "stats", "history", "search", "fetch",
        ],
    ),
];

/// Splits text into lower-case words on non-alphanumeric characters and
/// lower-to-upper case transitions (`getTokenPrice` -> `get`, `token`, `price`).
#[must_use]
pub fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;
    for ch in text.chars() {
        if !ch.is_alphanumeric() {
            flush(&mut words, &mut current);
            previous_lower = false;
            continue;
        }
        if ch.is_uppercase() && previous_lower {
            flush(&mut words, &mut current);
        }
        previous_lower = ch.is_lowercase() || ch.is_numeric();
        current.extend(ch.to_lowercase());
    }
    flush(&mut words, &mut current);
    words
}

fn flush(words: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}

/// Scores `texts` against the keyword table. Returns `None` when nothing matched.
#[must_use]
pub fn categorize<'a, I>(texts: I) -> Option<ActionCategory>
where
    I: IntoIterator<Item = &'a str>,
{
    let words: Vec<String> = texts.into_iter().flat_map(split_words).collect();
    let mut best: Option<(ActionCategory, usize)> = None;
    for (category, keywords) in CATEGORY_KEYWORDS {
        let hits = words
            .iter()
            .filter(|word| keywords.contains(&word.as_str()))
            .count();
        if hits > 0 && best.is_none_or(|(_, top)| hits > top) {
            best = Some((*category, hits));
        }
    }
    best.map(|(category, _)| category)
}

/// Most frequent category among `categories`, ties resolved by declaration order.
#[must_use]
pub fn dominant_category<I>(categories: I) -> Option<ActionCategory>
where
    I: IntoIterator<Item = ActionCategory>,
{
    let mut counts = [0_usize; ActionCategory::ALL.len()];
    for category in categories {
        if let Some(slot) = ActionCategory::ALL.iter().position(|c| *c == category) {
            counts[slot] += 1;
        }
    }
    let (slot, count) = counts
        .iter()
        .enumerate()
        .fold((0, 0), |best, (slot, count)| if *count > best.1 { (slot, *count) } else { best });
    (count > 0).then(|| ActionCategory::ALL[slot])
}

/// Words of an action name long enough to be useful as tags.
#[must_use]
pub fn significant_tokens(name: &str) -> Vec<String> {
    split_words(name)
        .into_iter()
        .filter(|word| word.chars().count() > 2)
        .collect()
}

/// Normalises a free-form tag: trimmed, lower-case, inner whitespace as `-`.
#[must_use]
pub fn normalize_tag(tag: &str) -> Option<String> {
    let words: Vec<&str> = tag.split_whitespace().collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join("-").to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_handles_snake_and_camel_case() {
        assert_eq!(split_words("jupiter_swap"), vec!["jupiter", "swap"]);
        assert_eq!(split_words("getTokenPrice"), vec!["get", "token", "price"]);
        assert_eq!(split_words("ERC20 transfer"), vec!["erc20", "transfer"]);
    }

    #[test]
    fn categorize_prefers_most_hits() {
        assert_eq!(categorize(["swap tokens on jupiter"]), Some(ActionCategory::Defi));
        assert_eq!(categorize(["Mint an NFT collection"]), Some(ActionCategory::Nft));
        assert_eq!(categorize(["get_balance", "Wallet balance"]), Some(ActionCategory::Wallet));
        assert_eq!(categorize(["hello world"]), None);
    }

    #[test]
    fn dominant_category_counts_votes() {
        let votes = [ActionCategory::Data, ActionCategory::Defi, ActionCategory::Defi];
        assert_eq!(dominant_category(votes), Some(ActionCategory::Defi));
        assert_eq!(dominant_category([]), None);
    }

    #[test]
    fn significant_tokens_drop_short_words() {
        assert_eq!(significant_tokens("get_nft_by_id"), vec!["get", "nft"]);
    }

    #[test]
    fn tags_are_normalised() {
        assert_eq!(normalize_tag("  Cross Chain "), Some("cross-chain".to_owned()));
        assert_eq!(normalize_tag("   "), None);
    }
}
