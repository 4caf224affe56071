//! Portfolio API routes.
//!
//! GET /api/portfolio/:chain/:address — aggregated wallet portfolio

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/portfolio/{chain}/{address}", get(get_portfolio))
}

/// GET /api/portfolio/:chain/:address
async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    Path((chain, address)): Path<(String, String)>,
) -> Json<Value> {
    let service = match &state.portfolio {
        Some(s) => s,
        None => {
            return Json(json!({
                "error": "Moralis API not configured. Set MORALIS_API_KEY env var."
            }))
        }
    };

    match service.fetch_portfolio(&chain, &address).await {
        Ok(snapshot) => Json(json!(snapshot)),
        Err(e) => Json(json!({ "error": e.to_string() })),
    }
}
