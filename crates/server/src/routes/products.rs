//! Product catalogue route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use storechat_core::{ProductId, parse_id};

use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;

/// Products returned when the search box is empty.
const DEFAULT_LISTING_LIMIT: usize = 20;

/// Page size for `GET /api/products` when `limit` is absent, and its ceiling.
const MAX_PAGE_SIZE: usize = 100;

/// Build the products router.
///
/// `/products/search` is a static segment, so it wins over `/products/{id}`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/search", get(search_products))
        .route("/products/{id}", get(get_product))
}

/// Paging parameters for the catalogue listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

/// List a page of the catalogue, in stock or not.
#[instrument(skip(state))]
async fn list_products(
    State(state): State<AppState>,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Product>>> {
    let Query(params) = params.map_err(|e| AppError::Validation(e.body_text()))?;
    let skip = params.skip.unwrap_or(0);
    let limit = params.limit.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE);
    Ok(Json(state.store().list_products(skip, limit).await?))
}

/// Get a single product.
#[instrument(skip(state))]
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let product_id: ProductId = parse_id("product", &id).map_err(AppError::Validation)?;
    state
        .store()
        .get_product(product_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))
}

/// Search in-stock products, or list the first few when `q` is blank.
#[instrument(skip(state))]
async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Product>>> {
    let products = match params.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => state.store().search_products(q).await?,
        _ => state.store().list_products(0, DEFAULT_LISTING_LIMIT).await?,
    };
    Ok(Json(products))
}
