//! Provider contracts — every external data source implements these.
//!
//! This is the seam between the aggregation layer and the outside world.
//! The backend wires concrete HTTP clients in; tests substitute mocks.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::VantageResult;
use crate::types::WalletBalance;

/// Primary wallet-data source — token balances with provider pricing.
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Provider tag, used as the cache-key prefix.
    fn name(&self) -> &'static str;

    /// All token balances held by `address` on `chain`.
    async fn wallet_balances(
        &self,
        address: &str,
        chain: &str,
    ) -> VantageResult<Vec<WalletBalance>>;
}

/// Secondary unit-price source for tokens the primary provider cannot price.
#[async_trait]
pub trait PriceFallbackSource: Send + Sync {
    /// Unit prices in USD keyed by lowercased token address.
    ///
    /// Absent entries mean "no fallback available", not an error. Callers
    /// must not invoke this with an empty address set.
    async fn bulk_prices(
        &self,
        token_addresses: &[String],
    ) -> VantageResult<HashMap<String, f64>>;
}

/// Estimated average acquisition price per held token.
#[async_trait]
pub trait CostBasisProvider: Send + Sync {
    /// Average buy price in USD for `token` held by `wallet` on `chain`.
    /// Zero means "unknown", not an error.
    async fn estimated_cost_basis(
        &self,
        wallet: &str,
        token: &str,
        chain: &str,
    ) -> VantageResult<f64>;
}
