//! Cache Statistics Module
//!
//! Diagnostic snapshot of the namespaced entries plus hit/miss counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Entry Stats ==
/// Size and age of a single stored entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryStats {
    /// Full store key
    pub key: String,
    /// Serialized size in bytes
    pub size: usize,
    /// Milliseconds since the entry was written
    pub age: i64,
}

// == Cache Stats ==
/// Snapshot returned by `CacheService::get_stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub total_size: usize,
    pub entries: Vec<EntryStats>,
    /// Reads that returned data
    pub hits: u64,
    /// Reads that found nothing usable
    pub misses: u64,
}

impl CacheStats {
    /// Builds a snapshot from per-entry figures, aggregating count and size.
    pub fn from_entries(entries: Vec<EntryStats>, counters: &HitCounters) -> Self {
        Self {
            total_entries: entries.len(),
            total_size: entries.iter().map(|e| e.size).sum(),
            entries,
            hits: counters.hits(),
            misses: counters.misses(),
        }
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Hit Counters ==
/// Lock-free read counters owned by the cache service.
#[derive(Debug, Default)]
pub struct HitCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl HitCounters {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
