//! API Handlers
//!
//! HTTP request handlers for storefront reads and cache diagnostics.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};

use crate::error::{CacheError, Result};
use crate::models::{
    AvailabilityResponse, CleanResponse, HealthResponse, InvalidateRequest, MessageResponse,
    ProductListResponse, ProductsResponse, SearchQuery, StatsResponse, StrategiesResponse,
};
use crate::products::{Product, ProductCache};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<ProductCache>,
}

impl AppState {
    pub fn new(products: Arc<ProductCache>) -> Self {
        Self { products }
    }
}

// == Storefront Reads ==

/// Handler for GET /products
pub async fn products_handler(State(state): State<AppState>) -> Json<ProductsResponse> {
    let cache_valid = state.products.is_cache_valid().await;
    Json(ProductsResponse::new(state.products.state().await, cache_valid))
}

/// Handler for GET /product/:id
pub async fn product_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>> {
    state
        .products
        .get_product_by_id(id)
        .await
        .map(Json)
        .ok_or_else(|| CacheError::NotFound(format!("product {}", id)))
}

/// Handler for GET /products/featured
pub async fn featured_handler(State(state): State<AppState>) -> Json<ProductListResponse> {
    Json(ProductListResponse::new(
        state.products.get_featured_products().await,
    ))
}

/// Handler for GET /products/category/:category
pub async fn category_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Json<ProductListResponse> {
    Json(ProductListResponse::new(
        state.products.get_products_by_category(&category).await,
    ))
}

/// Handler for GET /products/search?q=
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<ProductListResponse> {
    Json(ProductListResponse::new(
        state.products.search_products(&query.q).await,
    ))
}

// == Cache Control ==

/// Handler for POST /products/refresh
///
/// Always answers with the resulting state; a failed fetch shows up in `error`.
pub async fn refresh_handler(State(state): State<AppState>) -> Json<ProductsResponse> {
    state.products.refresh_cache().await;
    products_handler(State(state)).await
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.products.clear_cache().await;
    Json(MessageResponse::new("Product cache cleared"))
}

/// Handler for POST /cache/invalidate
///
/// A body that does not parse is answered with 400 and a JSON error.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<InvalidateRequest>, JsonRejection>,
) -> Result<Json<ProductsResponse>> {
    let Json(req) = payload?;
    state
        .products
        .invalidate_cache(req.action, req.data_type)
        .await;
    Ok(products_handler(State(state)).await)
}

/// Handler for POST /cache/clean
pub async fn clean_handler(State(state): State<AppState>) -> Json<CleanResponse> {
    Json(CleanResponse {
        removed: state.products.cache().clean_expired(),
    })
}

// == Diagnostics ==

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.products.cache().get_stats().into())
}

/// Handler for GET /cache/available
pub async fn available_handler(State(state): State<AppState>) -> Json<AvailabilityResponse> {
    Json(AvailabilityResponse {
        available: state.products.cache().is_available(),
    })
}

/// Handler for GET /cache/strategies
pub async fn strategies_handler(State(state): State<AppState>) -> Json<StrategiesResponse> {
    let strategies = state
        .products
        .invalidation()
        .get_strategies()
        .iter()
        .map(|s| s.info())
        .collect();
    Json(StrategiesResponse { strategies })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
