//! Product Cache Orchestrator
//!
//! Owns the in-memory product list and decides when to trust the persisted
//! cache and when to go back to the backend. The only component that calls
//! [`ProductSource::fetch_products`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::lock::mutex_lock;
use crate::cache::{CacheKey, CacheService};
use crate::config::DEFAULT_CLEANUP_INTERVAL_MS;
use crate::invalidation::{DataType, InvalidationManager, UserAction};
use crate::products::{Product, ProductSource};
use crate::tasks::spawn_cleanup_task;

const SOURCE: &str = "products::orchestrator";

// == Product Cache State ==
/// What the storefront currently sees.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductCacheState {
    pub products: Vec<Product>,
    /// True while at least one refresh is in flight
    pub loading: bool,
    /// Message of the last failed refresh, cleared by the next success
    pub error: Option<String>,
    /// When the in-memory list was last filled (Unix milliseconds)
    pub last_fetch: Option<i64>,
}

/// State plus refresh bookkeeping.
///
/// Every refresh takes a new generation; a result is applied only when no
/// newer generation has been applied already, so a slow response cannot
/// overwrite a fresher one.
#[derive(Debug, Default)]
struct Inner {
    view: ProductCacheState,
    next_generation: u64,
    applied_generation: u64,
}

/// Counts one refresh as in flight until dropped, including when the
/// refresh future is cancelled mid-fetch.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

// == Product Cache ==
#[derive(Debug)]
pub struct ProductCache {
    cache: Arc<CacheService>,
    invalidation: Arc<InvalidationManager>,
    source: Arc<dyn ProductSource>,
    inner: RwLock<Inner>,
    in_flight: AtomicUsize,
    cleanup_interval: Duration,
    cleanup: Mutex<Option<JoinHandle<()>>>,
}

impl ProductCache {
    // == Constructor ==
    pub fn new(
        cache: Arc<CacheService>,
        invalidation: Arc<InvalidationManager>,
        source: Arc<dyn ProductSource>,
    ) -> Self {
        Self {
            cache,
            invalidation,
            source,
            inner: RwLock::new(Inner::default()),
            in_flight: AtomicUsize::new(0),
            cleanup_interval: Duration::from_millis(DEFAULT_CLEANUP_INTERVAL_MS),
            cleanup: Mutex::new(None),
        }
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    pub fn cache(&self) -> &Arc<CacheService> {
        &self.cache
    }

    pub fn invalidation(&self) -> &Arc<InvalidationManager> {
        &self.invalidation
    }

    // == Lifecycle ==
    /// Starts background cleanup and fills the product list.
    pub async fn mount(&self) {
        {
            let mut cleanup = mutex_lock(&self.cleanup, SOURCE, "mount");
            if cleanup.as_ref().map_or(true, |handle| handle.is_finished()) {
                *cleanup = Some(spawn_cleanup_task(self.invalidation.clone(), self.cleanup_interval));
            }
        }
        self.load_from_cache().await;
    }

    /// Stops background cleanup. In-memory state is kept.
    pub fn unmount(&self) {
        if let Some(handle) = mutex_lock(&self.cleanup, SOURCE, "unmount").take() {
            handle.abort();
            debug!("Product cache cleanup task stopped");
        }
    }

    pub fn is_mounted(&self) -> bool {
        mutex_lock(&self.cleanup, SOURCE, "is_mounted")
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // == Load ==
    /// Serves the persisted products if still valid, otherwise refreshes.
    pub async fn load_from_cache(&self) {
        match self.cache.get::<Vec<Product>>(CacheKey::Products) {
            Some(products) => {
                debug!(count = products.len(), "Products loaded from cache");
                let now = self.cache.now_ms();
                let mut inner = self.inner.write().await;
                inner.view.products = products;
                inner.view.last_fetch = Some(now);
                inner.view.error = None;
            }
            None => self.refresh_cache().await,
        }
    }

    // == Refresh ==
    /// Fetches from the backend and writes the result through to the cache.
    ///
    /// A failed fetch records its message in `error` and keeps whatever
    /// products were already in memory.
    pub async fn refresh_cache(&self) {
        let _in_flight = InFlight::enter(&self.in_flight);
        let generation = {
            let mut inner = self.inner.write().await;
            inner.next_generation += 1;
            inner.next_generation
        };

        info!(generation, "Fetching products from backend");
        let result = self.source.fetch_products().await;

        let mut inner = self.inner.write().await;
        if generation < inner.applied_generation {
            debug!(
                generation,
                applied = inner.applied_generation,
                "Discarding superseded product fetch"
            );
            return;
        }
        inner.applied_generation = generation;

        match result {
            Ok(products) => {
                info!(count = products.len(), "Products refreshed");
                self.cache.set(CacheKey::Products, &products);
                inner.view.products = products;
                inner.view.last_fetch = Some(self.cache.now_ms());
                inner.view.error = None;
            }
            Err(e) => {
                warn!(error = %e, kept = inner.view.products.len(), "Product fetch failed");
                inner.view.error = Some(format!("{:#}", e));
            }
        }
    }

    // == Clear ==
    /// Drops the persisted entry and empties the in-memory view.
    pub async fn clear_cache(&self) {
        self.cache.remove(CacheKey::Products);
        self.inner.write().await.view = ProductCacheState::default();
        info!("Product cache cleared");
    }

    // == Invalidate ==
    /// Runs the invalidation strategies for `action` (and `data_type`, if
    /// given), then reloads so the view follows whatever was evicted.
    pub async fn invalidate_cache(&self, action: UserAction, data_type: Option<DataType>) {
        self.invalidation.invalidate_for_user_action(action);
        if let Some(data_type) = data_type {
            self.invalidation.invalidate_for_data_change(data_type);
        }
        self.load_from_cache().await;
    }

    // == Validity ==
    /// True while the in-memory list is younger than the cache TTL.
    pub async fn is_cache_valid(&self) -> bool {
        let now = self.cache.now_ms();
        let ttl = self.cache.default_ttl();
        self.inner
            .read()
            .await
            .view
            .last_fetch
            .is_some_and(|fetched| now.saturating_sub(fetched) < ttl)
    }

    // == Accessors ==
    pub async fn state(&self) -> ProductCacheState {
        let mut state = self.inner.read().await.view.clone();
        state.loading = self.is_loading();
        state
    }

    pub async fn products(&self) -> Vec<Product> {
        self.inner.read().await.view.products.clone()
    }

    pub async fn loading(&self) -> bool {
        self.is_loading()
    }

    fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.read().await.view.error.clone()
    }

    // == Queries ==
    pub async fn get_product_by_id(&self, id: i64) -> Option<Product> {
        self.inner
            .read()
            .await
            .view
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub async fn get_products_by_category(&self, category: &str) -> Vec<Product> {
        self.filtered(|p| p.category == category).await
    }

    pub async fn get_featured_products(&self) -> Vec<Product> {
        self.filtered(|p| p.featured).await
    }

    /// Case-insensitive search over title, description and category.
    /// A blank query returns every product.
    pub async fn search_products(&self, query: &str) -> Vec<Product> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.products().await;
        }
        self.filtered(|p| p.matches_query(&needle)).await
    }

    async fn filtered(&self, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        self.inner
            .read()
            .await
            .view
            .products
            .iter()
            .filter(|&p| keep(p))
            .cloned()
            .collect()
    }
}

impl Drop for ProductCache {
    fn drop(&mut self) {
        self.unmount();
    }
}
