//! Shared application state for the API server.

use std::sync::Arc;
use std::time::Duration;

use vantage_common::traits::{BalanceProvider, CostBasisProvider};

use crate::clients::dexscreener::DexScreenerClient;
use crate::clients::moralis::MoralisClient;
use crate::services::portfolio::PortfolioService;

/// Portfolio snapshots stay fresh for one minute.
const PORTFOLIO_TTL: Duration = Duration::from_secs(60);

/// Backend application state — shared across all request handlers.
pub struct AppState {
    pub portfolio: Option<Arc<PortfolioService>>,
}

impl AppState {
    /// Build state from the environment. Without `MORALIS_API_KEY` the
    /// portfolio service stays unconfigured and routes answer with a
    /// configuration error.
    pub fn from_env() -> Self {
        let portfolio = match std::env::var("MORALIS_API_KEY") {
            Ok(key) if !key.is_empty() => {
                let moralis = Arc::new(MoralisClient::new(&key));
                Some(Arc::new(PortfolioService::new(
                    Arc::clone(&moralis) as Arc<dyn BalanceProvider>,
                    moralis as Arc<dyn CostBasisProvider>,
                    Arc::new(DexScreenerClient::new()),
                    PORTFOLIO_TTL,
                )))
            }
            _ => {
                tracing::warn!("MORALIS_API_KEY not set — portfolio routes disabled");
                None
            }
        };

        Self { portfolio }
    }
}
