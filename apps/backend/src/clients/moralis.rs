//! Moralis Data API client — wallet balances and cost-basis estimates.
//!
//! Multi-chain wallet data keyed by an `X-API-Key` header. Rate-limit aware
//! with exponential backoff on 429 responses.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use vantage_common::constants::MORALIS_API_BASE;
use vantage_common::error::{VantageError, VantageResult};
use vantage_common::traits::{BalanceProvider, CostBasisProvider};
use vantage_common::types::{Chain, WalletBalance};

/// Moralis client authenticated with an API key.
#[derive(Clone)]
pub struct MoralisClient {
    http: Client,
    api_key: String,
}

// ── Response Types ──────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct WalletTokensResponse {
    result: Vec<WalletBalance>,
}

#[derive(Deserialize, Debug)]
struct ProfitabilityResponse {
    #[serde(default)]
    result: Vec<TokenProfitability>,
}

#[derive(Deserialize, Debug)]
struct TokenProfitability {
    #[serde(default)]
    avg_buy_price_usd: Option<f64>,
}

impl MoralisClient {
    /// Create a new Moralis client with the given API key.
    pub fn new(api_key: &str) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build Moralis HTTP client");

        Self {
            http,
            api_key: api_key.to_string(),
        }
    }

    /// Chain name → Moralis query slug. Unknown chains pass through
    /// lowercased.
    fn chain_slug(chain: &str) -> String {
        match Chain::from_name(chain) {
            Some(c) => c.api_slug().to_string(),
            None => chain.to_lowercase(),
        }
    }

    /// Execute a GET request with retry on 429.
    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> VantageResult<T> {
        let mut retries = 0u32;
        let max_retries = 3;

        loop {
            let resp = self
                .http
                .get(url)
                .header("X-API-Key", &self.api_key)
                .query(query)
                .send()
                .await
                .map_err(|e| VantageError::Network(e.to_string()))?;

            if resp.status() == 429 {
                retries += 1;
                if retries > max_retries {
                    return Err(VantageError::RateLimited(format!(
                        "Moralis rate limited after {max_retries} retries"
                    )));
                }
                let wait = Duration::from_millis(1000 * 2u64.pow(retries - 1));
                warn!("Moralis 429 — retrying in {:?} (attempt {retries}/{max_retries})", wait);
                tokio::time::sleep(wait).await;
                continue;
            }

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(VantageError::Provider {
                    provider: "moralis".to_string(),
                    message: format!("{status}: {body}"),
                });
            }

            return resp
                .json::<T>()
                .await
                .map_err(|e| VantageError::Decode(e.to_string()));
        }
    }
}

#[async_trait]
impl BalanceProvider for MoralisClient {
    fn name(&self) -> &'static str {
        "moralis"
    }

    /// GET /wallets/:address/tokens — balances with provider pricing.
    async fn wallet_balances(
        &self,
        address: &str,
        chain: &str,
    ) -> VantageResult<Vec<WalletBalance>> {
        let url = format!("{MORALIS_API_BASE}/wallets/{address}/tokens");
        let slug = Self::chain_slug(chain);
        let resp: WalletTokensResponse = self.get(&url, &[("chain", slug.as_str())]).await?;
        Ok(resp.result)
    }
}

#[async_trait]
impl CostBasisProvider for MoralisClient {
    /// GET /wallets/:address/profitability — estimated average buy price.
    /// An empty result or missing field maps to 0.0 ("unknown").
    async fn estimated_cost_basis(
        &self,
        wallet: &str,
        token: &str,
        chain: &str,
    ) -> VantageResult<f64> {
        let url = format!("{MORALIS_API_BASE}/wallets/{wallet}/profitability");
        let slug = Self::chain_slug(chain);
        let resp: ProfitabilityResponse = self
            .get(&url, &[("chain", slug.as_str()), ("token_addresses[0]", token)])
            .await?;

        Ok(resp
            .result
            .first()
            .and_then(|t| t.avg_buy_price_usd)
            .unwrap_or(0.0))
    }
}
