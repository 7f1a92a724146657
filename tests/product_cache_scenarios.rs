//! End-to-end product cache scenarios over the file-backed store.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use storefront_cache::{
    cache::{CacheKey, CacheService, FileStore, KeyValueStore, ManualClock},
    invalidation::{DataType, InvalidationStrategy, UserAction},
    products::{Product, ProductCache, ProductSource},
    InvalidationManager,
};

const START: i64 = 1_700_000_000_000;

#[derive(Debug, Default)]
struct FlakySource {
    calls: AtomicUsize,
    failing: AtomicBool,
}

#[async_trait]
impl ProductSource for FlakySource {
    async fn fetch_products(&self) -> anyhow::Result<Vec<Product>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("backend returned 503");
        }
        Ok(vec![Product {
            id: call as i64,
            title: format!("Tote bag #{}", call),
            price: 30.0,
            image: "tote.jpg".into(),
            description: "Canvas".into(),
            sizes: vec![],
            images: vec![],
            category: "bags".into(),
            in_stock: true,
            featured: call % 2 == 1,
        }])
    }
}

struct Harness {
    products: ProductCache,
    store: Arc<FileStore>,
    source: Arc<FlakySource>,
    clock: Arc<ManualClock>,
}

fn harness(path: &Path, clock: Arc<ManualClock>) -> Harness {
    let store = Arc::new(FileStore::open(path).unwrap());
    let cache = Arc::new(CacheService::new(store.clone()).with_clock(clock.clone()));
    let invalidation = Arc::new(InvalidationManager::new(cache.clone()));
    let source = Arc::new(FlakySource::default());
    let products = ProductCache::new(cache, invalidation, source.clone())
        .with_cleanup_interval(Duration::from_millis(20));
    Harness {
        products,
        store,
        source,
        clock,
    }
}

#[tokio::test]
async fn cache_survives_restart_and_skips_backend() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let clock = Arc::new(ManualClock::new(START));

    let first = harness(&path, clock.clone());
    first.products.mount().await;
    assert_eq!(first.source.calls.load(Ordering::SeqCst), 1);
    let fetched = first.products.products().await;
    drop(first);

    clock.advance(1_000);
    let second = harness(&path, clock);
    second.products.mount().await;

    assert_eq!(second.source.calls.load(Ordering::SeqCst), 0);
    assert_eq!(second.products.products().await, fetched);
    assert!(!second.products.loading().await);
}

#[tokio::test]
async fn expired_entry_forces_refetch_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let clock = Arc::new(ManualClock::new(START));

    harness(&path, clock.clone()).products.mount().await;

    clock.advance(300_000);
    let restarted = harness(&path, clock);
    restarted.products.mount().await;

    assert_eq!(restarted.source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn backend_outage_keeps_last_good_list() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(&dir.path().join("cache.json"), Arc::new(ManualClock::new(START)));
    h.products.mount().await;
    let before = h.products.products().await;

    h.source.failing.store(true, Ordering::SeqCst);
    h.products.refresh_cache().await;

    let state = h.products.state().await;
    assert_eq!(state.products, before);
    assert_eq!(state.error.as_deref(), Some("backend returned 503"));
    assert!(!state.loading);
}

#[tokio::test]
async fn categories_change_evicts_categories_entry() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(&dir.path().join("cache.json"), Arc::new(ManualClock::new(START)));
    h.products.mount().await;
    h.products.cache().set(CacheKey::Categories, &vec!["bags", "hats"]);

    h.products
        .invalidate_cache(UserAction::ProductAdd, Some(DataType::Categories))
        .await;

    assert!(h.store.get_item("storefront_categories_cache").unwrap().is_none());
    // Reload after eviction wrote a fresh products entry
    assert!(h.store.get_item("storefront_products_cache").unwrap().is_some());
    assert_eq!(h.source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn custom_strategy_extends_invalidation() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(&dir.path().join("cache.json"), Arc::new(ManualClock::new(START)));
    h.products.mount().await;

    h.products.invalidation().add_strategy(InvalidationStrategy::new(
        "inventory-updated",
        "Invalidate products when stock levels change",
        |ctx| ctx.data_changed == Some(DataType::Inventory),
        |_, cache| cache.try_remove(CacheKey::Products),
    ));
    h.products
        .invalidate_cache(UserAction::CartUpdate, Some(DataType::Inventory))
        .await;

    assert_eq!(h.source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn background_cleanup_sweeps_unread_entries() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(&dir.path().join("cache.json"), Arc::new(ManualClock::new(START)));
    h.products.cache().set_with_ttl(CacheKey::SearchHistory, &vec!["dress"], 1_000);
    h.products.mount().await;

    h.clock.advance(1_000);
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(h.store.get_item("storefront_search-history_cache").unwrap().is_none());
    h.products.unmount();
}

#[tokio::test]
async fn background_stale_check_evicts_old_products() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(&dir.path().join("cache.json"), Arc::new(ManualClock::new(START)));
    let seeded = vec![Product {
        id: 7,
        title: "Wool scarf".into(),
        price: 45.0,
        image: "scarf.jpg".into(),
        description: "Merino".into(),
        sizes: vec![],
        images: vec![],
        category: "scarves".into(),
        in_stock: true,
        featured: false,
    }];
    h.products
        .cache()
        .set_with_ttl(CacheKey::Products, &seeded, 3_600_000);
    h.products.mount().await;
    assert_eq!(h.source.calls.load(Ordering::SeqCst), 0);

    // Still inside its own TTL, but past the time-based age limit
    h.clock.advance(400_000);
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(h.store.get_item("storefront_products_cache").unwrap().is_none());
    h.products.unmount();
}
