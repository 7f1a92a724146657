//! Invalidation Module
//!
//! Separates "when to evict" (strategies) from "how to evict" (cache service).

mod context;
mod manager;
pub mod strategy;

pub use context::{DataType, InvalidationContext, UserAction};
pub use manager::InvalidationManager;
pub use strategy::{
    InvalidationStrategy, StrategyInfo, DEFAULT_MAX_AGE_MS, DEFAULT_STALE_THRESHOLD_MS,
};
