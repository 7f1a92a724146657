//! Invalidation strategies.
//!
//! A strategy pairs a predicate ("should this context evict?") with an
//! action ("evict what?"). The four built-ins cover age, staleness, admin
//! actions and backend data changes.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::cache::{CacheKey, CacheService};
use crate::error::{CacheError, Result};
use crate::invalidation::{DataType, InvalidationContext};

pub type Predicate = Arc<dyn Fn(&InvalidationContext) -> bool + Send + Sync>;
pub type Action = Arc<dyn Fn(&InvalidationContext, &CacheService) -> Result<()> + Send + Sync>;

/// Threshold for the time-based strategy (5 minutes)
pub const DEFAULT_MAX_AGE_MS: i64 = 300_000;

/// Threshold for the stale-data strategy (10 minutes)
pub const DEFAULT_STALE_THRESHOLD_MS: i64 = 600_000;

// == Invalidation Strategy ==
/// Named predicate + action pair. Cheap to clone.
#[derive(Clone)]
pub struct InvalidationStrategy {
    name: String,
    description: String,
    predicate: Predicate,
    action: Action,
}

impl InvalidationStrategy {
    pub fn new<P, A>(
        name: impl Into<String>,
        description: impl Into<String>,
        predicate: P,
        action: A,
    ) -> Self
    where
        P: Fn(&InvalidationContext) -> bool + Send + Sync + 'static,
        A: Fn(&InvalidationContext, &CacheService) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            predicate: Arc::new(predicate),
            action: Arc::new(action),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn matches(&self, ctx: &InvalidationContext) -> bool {
        (self.predicate)(ctx)
    }

    /// Runs the action. Failures come back as [`CacheError::Strategy`]
    /// naming this strategy.
    pub fn apply(&self, ctx: &InvalidationContext, cache: &CacheService) -> Result<()> {
        (self.action)(ctx, cache).map_err(|e| match e {
            CacheError::Strategy { .. } => e,
            other => CacheError::Strategy {
                name: self.name.clone(),
                reason: other.to_string(),
            },
        })
    }

    pub fn info(&self) -> StrategyInfo {
        StrategyInfo {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

impl fmt::Debug for InvalidationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvalidationStrategy")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Serializable description of a registered strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyInfo {
    pub name: String,
    pub description: String,
}

// == Built-in Strategies ==
fn remove_products(_: &InvalidationContext, cache: &CacheService) -> Result<()> {
    cache.try_remove(CacheKey::Products)
}

/// Evicts products once an entry is older than `max_age_ms`.
pub fn time_based(max_age_ms: i64) -> InvalidationStrategy {
    InvalidationStrategy::new(
        "time-based",
        format!("Invalidate cache entries older than {} ms", max_age_ms),
        move |ctx| ctx.cache_age.is_some_and(|age| age > max_age_ms),
        remove_products,
    )
}

/// Evicts products after an admin adds, updates or deletes a product.
pub fn user_action() -> InvalidationStrategy {
    InvalidationStrategy::new(
        "user-action",
        "Invalidate products after product add, update or delete",
        |ctx| ctx.user_action.is_some_and(|a| a.touches_catalogue()),
        remove_products,
    )
}

/// Evicts products when products, categories or pricing change; a
/// categories change also evicts the categories entry.
pub fn data_change() -> InvalidationStrategy {
    InvalidationStrategy::new(
        "data-change",
        "Invalidate products when products, categories or pricing change",
        |ctx| {
            matches!(
                ctx.data_changed,
                Some(DataType::Products | DataType::Categories | DataType::Pricing)
            )
        },
        |ctx, cache| {
            cache.try_remove(CacheKey::Products)?;
            if ctx.data_changed == Some(DataType::Categories) {
                cache.try_remove(CacheKey::Categories)?;
            }
            Ok(())
        },
    )
}

/// Evicts products once the last fetch is older than `threshold_ms`.
pub fn stale_data(threshold_ms: i64) -> InvalidationStrategy {
    InvalidationStrategy::new(
        "stale-data",
        format!("Invalidate data not refreshed within {} ms", threshold_ms),
        move |ctx| ctx.time_since_last_fetch.is_some_and(|t| t > threshold_ms),
        remove_products,
    )
}

/// The four built-ins in evaluation order.
pub fn builtin_strategies(max_age_ms: i64, stale_threshold_ms: i64) -> Vec<InvalidationStrategy> {
    vec![
        time_based(max_age_ms),
        user_action(),
        data_change(),
        stale_data(stale_threshold_ms),
    ]
}
