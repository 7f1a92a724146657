//! Cache Cleanup Task
//!
//! Background task that periodically sweeps expired cache entries and runs
//! the stale check through the invalidation strategies. Reads already drop
//! expired entries lazily; the sweep bounds how much dead data accumulates
//! for keys that are written but never read again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::invalidation::InvalidationManager;

/// Spawns a task that, every `interval`, calls
/// [`CacheService::clean_expired`](crate::cache::CacheService::clean_expired)
/// and then [`InvalidationManager::check_and_invalidate_stale`].
///
/// The task runs until the returned handle is aborted; the product cache
/// aborts it on unmount.
///
/// # Example
/// ```ignore
/// let handle = spawn_cleanup_task(invalidation.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task(
    invalidation: Arc<InvalidationManager>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting cache cleanup task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = invalidation.cache().clean_expired();
            if removed > 0 {
                info!("Cache cleanup: removed {} expired entries", removed);
            } else {
                debug!("Cache cleanup: no expired entries found");
            }

            let stale = invalidation.check_and_invalidate_stale();
            if stale > 0 {
                info!("Cache cleanup: {} stale entries triggered invalidation", stale);
            }
        }
    })
}
