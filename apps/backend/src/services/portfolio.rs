//! Portfolio aggregation — balances, price repair, PnL enrichment.
//!
//! Composes the balance provider, the price fallback, and the cost-basis
//! provider into a normalized snapshot, behind a single-flight TTL cache
//! keyed by `<provider>_<lowercased chain>_<address>`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures::future::join_all;
use tracing::warn;

use vantage_common::constants::{DEFAULT_TOKEN_LOGO_BASE, ICON_DEFAULT};
use vantage_common::error::VantageResult;
use vantage_common::traits::{BalanceProvider, CostBasisProvider, PriceFallbackSource};
use vantage_common::types::{
    Chain, CostBasis, DataSource, PortfolioAsset, PortfolioSnapshot, WalletBalance,
};

use crate::clients::cache::RequestCache;
use crate::fmt::{format_amount, format_price, format_signed_percent, format_usd};

/// Assets at or below this USD value are dust — excluded from PnL lookups.
const DUST_THRESHOLD_USD: f64 = 1.0;

/// Cost-basis lookups per snapshot; bounds outbound calls to the provider
/// so a long tail of holdings cannot trip its rate limits.
const MAX_COST_BASIS_LOOKUPS: usize = 8;

/// Token decimals assumed when the provider reports none.
const DEFAULT_DECIMALS: u32 = 18;

/// Portfolio aggregation service with caching.
pub struct PortfolioService {
    balances: Arc<dyn BalanceProvider>,
    cost_basis: Arc<dyn CostBasisProvider>,
    price_fallback: Arc<dyn PriceFallbackSource>,
    cache: RequestCache<PortfolioSnapshot>,
}

impl PortfolioService {
    pub fn new(
        balances: Arc<dyn BalanceProvider>,
        cost_basis: Arc<dyn CostBasisProvider>,
        price_fallback: Arc<dyn PriceFallbackSource>,
        ttl: Duration,
    ) -> Self {
        Self {
            balances,
            cost_basis,
            price_fallback,
            cache: RequestCache::new(ttl),
        }
    }

    /// Aggregated portfolio for `(chain, address)`.
    ///
    /// Repeat calls within the cache TTL are served from memory with the
    /// snapshot's source flipped to `cached`; concurrent calls for the same
    /// key share one upstream fetch.
    pub async fn fetch_portfolio(
        &self,
        chain: &str,
        address: &str,
    ) -> VantageResult<PortfolioSnapshot> {
        let key = format!(
            "{}_{}_{}",
            self.balances.name(),
            chain.to_lowercase(),
            address
        );

        let fetch = {
            let balances = Arc::clone(&self.balances);
            let cost_basis = Arc::clone(&self.cost_basis);
            let price_fallback = Arc::clone(&self.price_fallback);
            let chain = chain.to_string();
            let address = address.to_string();
            move || aggregate(balances, cost_basis, price_fallback, chain, address)
        };

        let (snapshot, source) = self.cache.get_or_fetch(&key, fetch).await?;
        Ok(PortfolioSnapshot { source, ..snapshot })
    }
}

/// The cache-miss path: fetch, repair prices, value, sort, enrich.
async fn aggregate(
    balances: Arc<dyn BalanceProvider>,
    cost_basis: Arc<dyn CostBasisProvider>,
    price_fallback: Arc<dyn PriceFallbackSource>,
    chain: String,
    address: String,
) -> VantageResult<PortfolioSnapshot> {
    let wallet_balances = balances.wallet_balances(&address, &chain).await?;

    // Tokens the provider priced at zero/missing need a fallback lookup.
    let unpriced: Vec<String> = wallet_balances
        .iter()
        .filter(|b| is_unpriced(b))
        .map(|b| b.token_address.clone())
        .collect();

    let fallback_prices = if unpriced.is_empty() {
        HashMap::new()
    } else {
        price_fallback.bulk_prices(&unpriced).await?
    };

    let mut net_worth = 0.0;
    let mut assets: Vec<PortfolioAsset> = wallet_balances
        .iter()
        .map(|b| {
            let asset = build_asset(b, &fallback_prices);
            net_worth += asset.value;
            asset
        })
        .collect();

    assets.sort_by(|a, b| b.value.total_cmp(&a.value));

    // Top assets above the dust threshold get cost-basis enrichment; the
    // rest stay `NotAttempted`.
    let targets: Vec<usize> = assets
        .iter()
        .enumerate()
        .filter(|(_, a)| a.value > DUST_THRESHOLD_USD)
        .take(MAX_COST_BASIS_LOOKUPS)
        .map(|(i, _)| i)
        .collect();

    let lookups = targets.into_iter().map(|i| {
        let cost_basis = Arc::clone(&cost_basis);
        let address = address.clone();
        let chain = chain.clone();
        let token = assets[i].address.clone();
        let price = assets[i].price;
        async move {
            let result = cost_basis.estimated_cost_basis(&address, &token, &chain).await;
            (i, resolve_cost_basis(result, price, &token))
        }
    });

    // Order stays fixed by value; each asset is enriched in place.
    for (i, basis) in join_all(lookups).await {
        assets[i].cost_basis = basis;
    }

    Ok(PortfolioSnapshot {
        net_worth_usd: net_worth,
        net_worth_display: format_usd(net_worth),
        assets,
        recent_activity: Vec::new(),
        source: DataSource::Live,
        chain_icon: chain_icon(&chain).to_string(),
        fetched_at_ms: epoch_ms(),
    })
}

/// Both the unit price and the total USD value are zero or absent.
fn is_unpriced(balance: &WalletBalance) -> bool {
    balance.usd_price.unwrap_or(0.0) == 0.0 && balance.usd_value.unwrap_or(0.0) == 0.0
}

/// Scale, price, and format one balance.
///
/// Price precedence: provider unit price, fallback by lowercased address,
/// unit price derived from the provider's total USD value, zero. Value
/// falls back to the provider's reported total when no unit price resolves.
fn build_asset(balance: &WalletBalance, fallback: &HashMap<String, f64>) -> PortfolioAsset {
    let decimals = balance.decimals.unwrap_or(DEFAULT_DECIMALS);
    let quantity = balance.balance.parse::<f64>().unwrap_or(0.0) / 10f64.powi(decimals as i32);

    let mut price = balance.usd_price.unwrap_or(0.0);
    if price == 0.0 {
        if let Some(repaired) = fallback.get(&balance.token_address.to_lowercase()) {
            price = *repaired;
        }
    }
    let usd_value = balance.usd_value.unwrap_or(0.0);
    if price == 0.0 && usd_value > 0.0 && quantity > 0.0 {
        price = usd_value / quantity;
    }

    let value = if price > 0.0 { quantity * price } else { usd_value };

    let logo_url = balance
        .logo
        .clone()
        .unwrap_or_else(|| format!("{DEFAULT_TOKEN_LOGO_BASE}{}", balance.symbol));

    PortfolioAsset {
        symbol: balance.symbol.clone(),
        address: balance.token_address.clone(),
        quantity,
        balance_display: format!("{} {}", format_amount(quantity), balance.symbol),
        price,
        price_display: format_price(price),
        value,
        value_display: format_usd(value),
        logo_url,
        cost_basis: CostBasis::NotAttempted,
    }
}

/// Cost-basis lookup outcome → enrichment state. A failed lookup degrades
/// the one asset instead of failing the snapshot.
fn resolve_cost_basis(result: VantageResult<f64>, current_price: f64, token: &str) -> CostBasis {
    match result {
        Ok(avg_buy) if avg_buy > 0.0 => {
            let pnl_percent = (current_price - avg_buy) / avg_buy * 100.0;
            CostBasis::Known {
                avg_buy_price: avg_buy,
                avg_buy_display: format_price(avg_buy),
                pnl_percent,
                pnl_display: format_signed_percent(pnl_percent),
            }
        }
        // Zero: the provider has no estimate for this token.
        Ok(_) => CostBasis::Unavailable,
        Err(err) => {
            warn!("cost basis lookup failed for {token}: {err}");
            CostBasis::Unavailable
        }
    }
}

/// Icon for the snapshot header; unknown chains get the default.
fn chain_icon(chain: &str) -> &'static str {
    Chain::from_name(chain).map_or(ICON_DEFAULT, |c| c.icon_url())
}

fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
