//! Universal types shared across the backend.
//!
//! Provider clients deserialize wire payloads into these; routes serialize
//! them straight to the frontend. Apps consume only these — never
//! provider-specific structs.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Chain identifier — the set of networks the dashboard tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Solana,
    Bsc,
    Polygon,
    Avalanche,
    Base,
    Arbitrum,
    Optimism,
}

impl Chain {
    /// Case-insensitive lookup. `None` for chains outside the known set —
    /// callers fall back to pass-through behavior.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "ethereum" | "eth" => Some(Chain::Ethereum),
            "solana" => Some(Chain::Solana),
            "bsc" => Some(Chain::Bsc),
            "polygon" => Some(Chain::Polygon),
            "avalanche" => Some(Chain::Avalanche),
            "base" => Some(Chain::Base),
            "arbitrum" => Some(Chain::Arbitrum),
            "optimism" => Some(Chain::Optimism),
            _ => None,
        }
    }

    /// Query-parameter slug for the Moralis API.
    pub fn api_slug(&self) -> &'static str {
        match self {
            Chain::Ethereum => "eth",
            Chain::Solana => "solana",
            Chain::Bsc => "bsc",
            Chain::Polygon => "polygon",
            Chain::Avalanche => "avalanche",
            Chain::Base => "base",
            Chain::Arbitrum => "arbitrum",
            Chain::Optimism => "optimism",
        }
    }

    /// Logo URL served in the snapshot header.
    pub fn icon_url(&self) -> &'static str {
        match self {
            Chain::Ethereum => constants::ICON_ETHEREUM,
            Chain::Solana => constants::ICON_SOLANA,
            Chain::Bsc => constants::ICON_BNB,
            Chain::Polygon => constants::ICON_POLYGON,
            Chain::Avalanche => constants::ICON_AVALANCHE,
            Chain::Base => constants::ICON_BASE,
            Chain::Arbitrum => constants::ICON_ARBITRUM,
            Chain::Optimism => constants::ICON_OPTIMISM,
        }
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Chain::Ethereum => write!(f, "ethereum"),
            Chain::Solana => write!(f, "solana"),
            Chain::Bsc => write!(f, "bsc"),
            Chain::Polygon => write!(f, "polygon"),
            Chain::Avalanche => write!(f, "avalanche"),
            Chain::Base => write!(f, "base"),
            Chain::Arbitrum => write!(f, "arbitrum"),
            Chain::Optimism => write!(f, "optimism"),
        }
    }
}

/// Raw token balance as reported by the balance provider.
///
/// `balance` is the unscaled integer amount as a decimal string; scale by
/// `10^decimals` to get the human-readable quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletBalance {
    pub token_address: String,
    pub symbol: String,
    pub balance: String,
    #[serde(default)]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub usd_price: Option<f64>,
    #[serde(default)]
    pub usd_value: Option<f64>,
}

/// Where a snapshot came from — a live provider fetch or the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Cached,
}

/// Cost-basis enrichment state for a single asset.
///
/// `NotAttempted` (dust, or outside the top holdings) and `Unavailable`
/// (lookup ran, provider has no estimate) are distinct states; consumers
/// must be able to tell them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CostBasis {
    NotAttempted,
    Unavailable,
    Known {
        avg_buy_price: f64,
        avg_buy_display: String,
        pnl_percent: f64,
        pnl_display: String,
    },
}

/// One priced and formatted holding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioAsset {
    pub symbol: String,
    pub address: String,
    pub quantity: f64,
    pub balance_display: String,
    pub price: f64,
    pub price_display: String,
    pub value: f64,
    pub value_display: String,
    pub logo_url: String,
    pub cost_basis: CostBasis,
}

/// Wallet activity entry. Part of the snapshot contract; population is
/// currently unimplemented and the list is always empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub time: String,
    pub tx_hash: String,
}

/// Aggregated portfolio for one (chain, address) pair — the unit the cache
/// stores and the portfolio endpoint returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub net_worth_usd: f64,
    pub net_worth_display: String,
    /// Ordered descending by USD value.
    pub assets: Vec<PortfolioAsset>,
    pub recent_activity: Vec<ActivityItem>,
    pub source: DataSource,
    pub chain_icon: String,
    pub fetched_at_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_from_name_case_insensitive() {
        assert_eq!(Chain::from_name("Solana"), Some(Chain::Solana));
        assert_eq!(Chain::from_name("BSC"), Some(Chain::Bsc));
        assert_eq!(Chain::from_name("ethereum"), Some(Chain::Ethereum));
        assert_eq!(Chain::from_name("ETH"), Some(Chain::Ethereum));
    }

    #[test]
    fn test_chain_from_name_unknown() {
        assert_eq!(Chain::from_name("All Chains"), None);
        assert_eq!(Chain::from_name("near"), None);
    }

    #[test]
    fn test_chain_api_slug() {
        assert_eq!(Chain::Ethereum.api_slug(), "eth");
        assert_eq!(Chain::Bsc.api_slug(), "bsc");
    }
}
