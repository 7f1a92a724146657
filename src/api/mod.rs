//! API Module
//!
//! HTTP handlers and routing for the storefront cache.
//!
//! # Endpoints
//! - `GET /products` - Current product list with loading/error state
//! - `GET /product/:id` - Single product by id
//! - `GET /products/featured` - Featured products
//! - `GET /products/category/:category` - Products in a category
//! - `GET /products/search?q=` - Case-insensitive search
//! - `POST /products/refresh` - Refetch from the backend
//! - `DELETE /cache` - Clear the product cache
//! - `POST /cache/invalidate` - Fire an invalidation event
//! - `POST /cache/clean` - Sweep expired entries now
//! - `GET /cache/stats` - Entry sizes, ages and hit/miss counts
//! - `GET /cache/available` - Persistent store availability
//! - `GET /cache/strategies` - Registered invalidation strategies
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
