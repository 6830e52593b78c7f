//! Catalogue and usage counts.

use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use crate::error::Result;
use crate::models::StoreStats;
use crate::state::AppState;

/// Build the stats router.
pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}

#[instrument(skip(state))]
async fn get_stats(State(state): State<AppState>) -> Result<Json<StoreStats>> {
    Ok(Json(state.store().stats().await?))
}
