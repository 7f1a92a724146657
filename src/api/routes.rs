//! API Routes
//!
//! Configures the Axum router with storefront and cache diagnostics endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    available_handler, category_handler, clean_handler, clear_handler, featured_handler,
    health_handler, invalidate_handler, product_handler, products_handler, refresh_handler,
    search_handler, stats_handler, strategies_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/products", get(products_handler))
        .route("/products/featured", get(featured_handler))
        .route("/products/category/:category", get(category_handler))
        .route("/products/search", get(search_handler))
        .route("/products/refresh", post(refresh_handler))
        .route("/product/:id", get(product_handler))
        .route("/cache", delete(clear_handler))
        .route("/cache/invalidate", post(invalidate_handler))
        .route("/cache/clean", post(clean_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/available", get(available_handler))
        .route("/cache/strategies", get(strategies_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheService, MemoryStore};
    use crate::invalidation::InvalidationManager;
    use crate::products::testing::ScriptedSource;
    use crate::products::ProductCache;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let cache = Arc::new(CacheService::new(Arc::new(MemoryStore::new())));
        let invalidation = Arc::new(InvalidationManager::new(cache.clone()));
        let source = Arc::new(ScriptedSource::default());
        let products = Arc::new(ProductCache::new(cache, invalidation, source));
        create_router(AppState::new(products))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/cache/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_product_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/product/42").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_invalidate_body() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/cache/invalidate")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"action":"not-a-thing"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }
}
