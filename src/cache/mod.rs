//! Cache Module
//!
//! Provides a namespaced TTL cache persisted through a key-value store adapter.

mod clock;
mod entry;
mod keys;
pub(crate) mod lock;
mod service;
mod stats;
mod storage;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, RawEntry};
pub use keys::{namespace_prefix, storage_key, CacheKey};
pub use service::CacheService;
pub use stats::{CacheStats, EntryStats, HitCounters};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

// == Public Constants ==
/// TTL applied when none is given (5 minutes)
pub const DEFAULT_TTL_MS: i64 = 300_000;

/// Envelope version written and accepted by default
pub const CACHE_VERSION: &str = "1.0";

/// Namespace prefix used when none is configured
pub const DEFAULT_PREFIX: &str = "storefront";
