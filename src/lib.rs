//! Storefront Cache - TTL product cache for a storefront backend
//!
//! Persists the product catalogue in a namespaced key-value store, evicts it
//! through pluggable invalidation strategies and refetches on demand.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod invalidation;
pub mod models;
pub mod products;
pub mod tasks;

pub use api::AppState;
pub use cache::CacheService;
pub use config::Config;
pub use invalidation::InvalidationManager;
pub use products::ProductCache;
pub use tasks::spawn_cleanup_task;
