//! Response DTOs for the storefront cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, EntryStats};
use crate::invalidation::StrategyInfo;
use crate::products::{Product, ProductCacheState};

/// Response body for `GET /products`
#[derive(Debug, Clone, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_fetch: Option<i64>,
    /// Whether the in-memory list is younger than the cache TTL
    pub cache_valid: bool,
}

impl ProductsResponse {
    pub fn new(state: ProductCacheState, cache_valid: bool) -> Self {
        Self {
            products: state.products,
            loading: state.loading,
            error: state.error,
            last_fetch: state.last_fetch,
            cache_valid,
        }
    }
}

/// Response body for filtered product lists (featured, category, search)
#[derive(Debug, Clone, Serialize)]
pub struct ProductListResponse {
    pub count: usize,
    pub products: Vec<Product>,
}

impl ProductListResponse {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            count: products.len(),
            products,
        }
    }
}

/// Response body for `GET /cache/stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub total_entries: usize,
    pub total_size: usize,
    pub entries: Vec<EntryStats>,
    pub hits: u64,
    pub misses: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self {
            total_entries: stats.total_entries,
            total_size: stats.total_size,
            entries: stats.entries,
            hits: stats.hits,
            misses: stats.misses,
            hit_rate,
        }
    }
}

/// Response body for `GET /cache/available`
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

/// Response body for `GET /cache/strategies`
#[derive(Debug, Clone, Serialize)]
pub struct StrategiesResponse {
    pub strategies: Vec<StrategyInfo>,
}

/// Response body for `POST /cache/clean`
#[derive(Debug, Clone, Serialize)]
pub struct CleanResponse {
    pub removed: usize,
}

/// Response body for actions without a payload of their own
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
