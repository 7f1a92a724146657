//! Invalidation Manager
//!
//! Ordered registry of strategies. Decides when to evict by OR-ing every
//! strategy's predicate, and runs each matching action in isolation.

use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::cache::lock::{rw_read, rw_write};
use crate::cache::CacheService;
use crate::config::Config;
use crate::invalidation::strategy::builtin_strategies;
use crate::invalidation::{
    DataType, InvalidationContext, InvalidationStrategy, UserAction, DEFAULT_MAX_AGE_MS,
    DEFAULT_STALE_THRESHOLD_MS,
};

const SOURCE: &str = "invalidation::manager";

// == Invalidation Manager ==
#[derive(Debug)]
pub struct InvalidationManager {
    cache: Arc<CacheService>,
    strategies: RwLock<Vec<InvalidationStrategy>>,
}

impl InvalidationManager {
    // == Constructors ==
    /// Manager with the built-in strategies at their default thresholds.
    pub fn new(cache: Arc<CacheService>) -> Self {
        Self::with_thresholds(cache, DEFAULT_MAX_AGE_MS, DEFAULT_STALE_THRESHOLD_MS)
    }

    /// Manager with the built-in strategies at the given thresholds.
    pub fn with_thresholds(cache: Arc<CacheService>, max_age_ms: i64, stale_threshold_ms: i64) -> Self {
        Self::with_strategies(cache, builtin_strategies(max_age_ms, stale_threshold_ms))
    }

    pub fn from_config(cache: Arc<CacheService>, config: &Config) -> Self {
        Self::with_thresholds(cache, config.max_age_ms, config.stale_threshold_ms)
    }

    pub fn with_strategies(cache: Arc<CacheService>, strategies: Vec<InvalidationStrategy>) -> Self {
        Self {
            cache,
            strategies: RwLock::new(strategies),
        }
    }

    pub fn cache(&self) -> &Arc<CacheService> {
        &self.cache
    }

    // == Evaluation ==
    /// True if any registered strategy matches `ctx`.
    pub fn should_invalidate(&self, ctx: &InvalidationContext) -> bool {
        rw_read(&self.strategies, SOURCE, "should_invalidate")
            .iter()
            .any(|s| s.matches(ctx))
    }

    /// Runs the action of every strategy matching `ctx`.
    ///
    /// A failing action is logged and skipped; the rest still run. Returns
    /// the names of the strategies whose actions succeeded.
    pub fn invalidate(&self, ctx: &InvalidationContext) -> Vec<String> {
        // Snapshot so actions may add or remove strategies
        let matching: Vec<InvalidationStrategy> = rw_read(&self.strategies, SOURCE, "invalidate")
            .iter()
            .filter(|s| s.matches(ctx))
            .cloned()
            .collect();

        let mut applied = Vec::with_capacity(matching.len());
        for strategy in matching {
            match strategy.apply(ctx, &self.cache) {
                Ok(()) => {
                    info!(strategy = strategy.name(), "Cache invalidated");
                    applied.push(strategy.name().to_string());
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "Invalidation strategy failed");
                }
            }
        }
        applied
    }

    pub fn invalidate_for_user_action(&self, action: UserAction) -> Vec<String> {
        debug!(action = %action, "Invalidating for user action");
        let ctx = InvalidationContext::at(self.cache.now_ms()).with_user_action(action);
        self.invalidate(&ctx)
    }

    pub fn invalidate_for_data_change(&self, data_type: DataType) -> Vec<String> {
        debug!(data_type = %data_type, "Invalidating for data change");
        let ctx = InvalidationContext::at(self.cache.now_ms()).with_data_changed(data_type);
        self.invalidate(&ctx)
    }

    /// Feeds every cached entry's age through the strategy table.
    ///
    /// Age is used as both `cache_age` and `time_since_last_fetch`. Returns
    /// how many entries triggered at least one strategy.
    pub fn check_and_invalidate_stale(&self) -> usize {
        let stats = self.cache.get_stats();
        let now = self.cache.now_ms();

        let mut triggered = 0;
        for entry in &stats.entries {
            let ctx = InvalidationContext::at(now)
                .with_cache_age(entry.age)
                .with_time_since_last_fetch(entry.age);
            if self.should_invalidate(&ctx) {
                debug!(key = %entry.key, age = entry.age, "Stale cache entry");
                self.invalidate(&ctx);
                triggered += 1;
            }
        }
        triggered
    }

    // == Registry ==
    /// Copy of the registered strategies, in evaluation order.
    pub fn get_strategies(&self) -> Vec<InvalidationStrategy> {
        rw_read(&self.strategies, SOURCE, "get_strategies").clone()
    }

    /// Registers `strategy`, replacing any existing one with the same name.
    pub fn add_strategy(&self, strategy: InvalidationStrategy) {
        let mut strategies = rw_write(&self.strategies, SOURCE, "add_strategy");
        match strategies.iter_mut().find(|s| s.name() == strategy.name()) {
            Some(existing) => *existing = strategy,
            None => strategies.push(strategy),
        }
    }

    /// Unregisters the strategy called `name`. Returns false if there was none.
    pub fn remove_strategy(&self, name: &str) -> bool {
        let mut strategies = rw_write(&self.strategies, SOURCE, "remove_strategy");
        let before = strategies.len();
        strategies.retain(|s| s.name() != name);
        strategies.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, KeyValueStore, ManualClock, MemoryStore};
    use crate::error::CacheError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const START: i64 = 1_700_000_000_000;

    fn setup() -> (InvalidationManager, Arc<CacheService>, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(START));
        let cache = Arc::new(CacheService::new(store.clone()).with_clock(clock.clone()));
        let manager = InvalidationManager::new(cache.clone());
        (manager, cache, store, clock)
    }

    fn counting(name: &str, hits: Arc<AtomicUsize>, fire: bool) -> InvalidationStrategy {
        InvalidationStrategy::new(
            name,
            "test",
            move |_| fire,
            move |_, _| {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )
    }

    #[test]
    fn test_builtins_registered() {
        let (manager, _, _, _) = setup();
        assert_eq!(manager.get_strategies().len(), 4);
    }

    #[test]
    fn test_user_action_removes_products() {
        let (manager, cache, _, _) = setup();
        cache.set(CacheKey::Products, &vec![1]);

        let applied = manager.invalidate_for_user_action(UserAction::ProductUpdate);

        assert_eq!(applied, vec!["user-action"]);
        assert!(cache.get::<Vec<i32>>(CacheKey::Products).is_none());
    }

    #[test]
    fn test_non_catalogue_action_keeps_products() {
        let (manager, cache, _, _) = setup();
        cache.set(CacheKey::Products, &vec![1]);

        assert!(manager.invalidate_for_user_action(UserAction::CartUpdate).is_empty());
        assert!(cache.get::<Vec<i32>>(CacheKey::Products).is_some());
    }

    #[test]
    fn test_categories_change_removes_both() {
        let (manager, cache, _, _) = setup();
        cache.set(CacheKey::Products, &vec![1]);
        cache.set(CacheKey::Categories, &vec!["a"]);

        manager.invalidate_for_data_change(DataType::Categories);

        assert!(cache.get::<Vec<i32>>(CacheKey::Products).is_none());
        assert!(cache.get::<Vec<String>>(CacheKey::Categories).is_none());
    }

    #[test]
    fn test_pricing_change_keeps_categories() {
        let (manager, cache, _, _) = setup();
        cache.set(CacheKey::Products, &vec![1]);
        cache.set(CacheKey::Categories, &vec!["a"]);

        manager.invalidate_for_data_change(DataType::Pricing);

        assert!(cache.get::<Vec<i32>>(CacheKey::Products).is_none());
        assert!(cache.get::<Vec<String>>(CacheKey::Categories).is_some());
    }

    #[test]
    fn test_or_semantics_runs_only_matching() {
        let (_, cache, _, _) = setup();
        let counters: Vec<Arc<AtomicUsize>> = (0..4).map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let manager = InvalidationManager::with_strategies(
            cache,
            vec![
                counting("a", counters[0].clone(), true),
                counting("b", counters[1].clone(), false),
                counting("c", counters[2].clone(), true),
                counting("d", counters[3].clone(), false),
            ],
        );
        let ctx = InvalidationContext::at(START);

        assert!(manager.should_invalidate(&ctx));
        assert_eq!(manager.invalidate(&ctx), vec!["a", "c"]);

        let runs: Vec<usize> = counters.iter().map(|c| c.load(Ordering::SeqCst)).collect();
        assert_eq!(runs, vec![1, 0, 1, 0]);
    }

    #[test]
    fn test_no_match_means_no_invalidation() {
        let (manager, _, _, _) = setup();
        let ctx = InvalidationContext::at(START).with_cache_age(10);

        assert!(!manager.should_invalidate(&ctx));
        assert!(manager.invalidate(&ctx).is_empty());
    }

    #[test]
    fn test_failing_action_does_not_stop_others() {
        let (_, cache, _, _) = setup();
        let hits = Arc::new(AtomicUsize::new(0));
        let manager = InvalidationManager::with_strategies(
            cache,
            vec![
                InvalidationStrategy::new(
                    "broken",
                    "always fails",
                    |_| true,
                    |_, _| {
                        Err(CacheError::Strategy {
                            name: "broken".into(),
                            reason: "boom".into(),
                        })
                    },
                ),
                counting("after", hits.clone(), true),
            ],
        );

        let applied = manager.invalidate(&InvalidationContext::at(START));

        assert_eq!(applied, vec!["after"]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_store_failure_is_contained() {
        let (manager, _, store, _) = setup();
        store.set_available(false);

        let applied = manager.invalidate_for_user_action(UserAction::ProductDelete);
        assert!(applied.is_empty());
    }

    #[test]
    fn test_double_eviction_is_harmless() {
        let (manager, cache, _, _) = setup();
        cache.set(CacheKey::Products, &vec![1]);
        let ctx = InvalidationContext::at(START)
            .with_user_action(UserAction::ProductAdd)
            .with_data_changed(DataType::Products)
            .with_cache_age(DEFAULT_MAX_AGE_MS + 1);

        let applied = manager.invalidate(&ctx);

        assert_eq!(applied, vec!["time-based", "user-action", "data-change"]);
        assert!(cache.get::<Vec<i32>>(CacheKey::Products).is_none());
    }

    #[test]
    fn test_check_and_invalidate_stale() {
        let (manager, cache, store, clock) = setup();
        cache.set_with_ttl(CacheKey::Products, &vec![1], 3_600_000);

        clock.advance(60_000);
        assert_eq!(manager.check_and_invalidate_stale(), 0);
        assert!(store.get_item("storefront_products_cache").unwrap().is_some());

        clock.advance(DEFAULT_MAX_AGE_MS);
        assert_eq!(manager.check_and_invalidate_stale(), 1);
        assert!(store.get_item("storefront_products_cache").unwrap().is_none());
    }

    #[test]
    fn test_add_replaces_and_remove_is_noop_when_missing() {
        let (manager, _, _, _) = setup();
        let hits = Arc::new(AtomicUsize::new(0));

        manager.add_strategy(counting("inventory", hits.clone(), false));
        manager.add_strategy(counting("inventory", hits, true));
        assert_eq!(manager.get_strategies().len(), 5);
        assert!(manager.should_invalidate(&InvalidationContext::at(START)));

        assert!(manager.remove_strategy("inventory"));
        assert!(!manager.remove_strategy("inventory"));
        assert_eq!(manager.get_strategies().len(), 4);
    }

    #[test]
    fn test_get_strategies_is_a_copy() {
        let (manager, _, _, _) = setup();

        let mut copy = manager.get_strategies();
        copy.clear();

        assert_eq!(manager.get_strategies().len(), 4);
    }
}
