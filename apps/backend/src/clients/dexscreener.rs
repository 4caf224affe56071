//! DexScreener API client — bulk unit-price lookups by token address.
//!
//! Public API, no auth. Used as the price fallback for tokens the primary
//! provider cannot price; tokens DexScreener has never seen simply stay
//! absent from the result map.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use vantage_common::constants::DEXSCREENER_API_BASE;
use vantage_common::error::{VantageError, VantageResult};
use vantage_common::traits::PriceFallbackSource;

/// DexScreener HTTP client.
#[derive(Clone)]
pub struct DexScreenerClient {
    http: Client,
}

// ── Response Types ──────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct TokensResponse {
    #[serde(default)]
    pairs: Option<Vec<DexPair>>,
}

#[derive(Deserialize, Debug)]
struct DexPair {
    #[serde(rename = "baseToken")]
    base_token: BaseToken,
    #[serde(rename = "priceUsd", default)]
    price_usd: Option<String>,
}

#[derive(Deserialize, Debug)]
struct BaseToken {
    address: String,
}

impl DexScreenerClient {
    pub fn new() -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build DexScreener HTTP client");

        Self { http }
    }
}

impl Default for DexScreenerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceFallbackSource for DexScreenerClient {
    /// GET /tokens/:addr1,:addr2,... — one call for the whole batch.
    async fn bulk_prices(
        &self,
        token_addresses: &[String],
    ) -> VantageResult<HashMap<String, f64>> {
        let url = format!("{DEXSCREENER_API_BASE}/tokens/{}", token_addresses.join(","));

        let mut retries = 0u32;
        let max_retries = 3;

        let resp: TokensResponse = loop {
            let resp = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|e| VantageError::Network(e.to_string()))?;

            if resp.status() == 429 {
                retries += 1;
                if retries > max_retries {
                    return Err(VantageError::RateLimited(format!(
                        "DexScreener rate limited after {max_retries} retries"
                    )));
                }
                let wait = Duration::from_millis(1000 * 2u64.pow(retries - 1));
                warn!("DexScreener 429 — retrying in {:?} (attempt {retries}/{max_retries})", wait);
                tokio::time::sleep(wait).await;
                continue;
            }

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(VantageError::Provider {
                    provider: "dexscreener".to_string(),
                    message: format!("{status}: {body}"),
                });
            }

            break resp
                .json()
                .await
                .map_err(|e| VantageError::Decode(e.to_string()))?;
        };

        let mut prices = HashMap::new();
        for pair in resp.pairs.unwrap_or_default() {
            let Some(price) = pair.price_usd.as_deref().and_then(|p| p.parse::<f64>().ok())
            else {
                continue;
            };
            if price > 0.0 {
                // First pair wins — DexScreener lists highest-liquidity first.
                prices
                    .entry(pair.base_token.address.to_lowercase())
                    .or_insert(price);
            }
        }
        Ok(prices)
    }
}
