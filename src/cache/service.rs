//! Cache Service Module
//!
//! Generic TTL cache over a [`KeyValueStore`], scoped to a key namespace.
//! Every public operation is best-effort: store failures are logged and
//! degrade to a miss or a no-op instead of reaching the caller.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::cache::keys::{namespace_prefix, storage_key};
use crate::cache::{
    CacheEntry, CacheStats, Clock, EntryStats, HitCounters, KeyValueStore, RawEntry, SystemClock,
    CACHE_VERSION, DEFAULT_PREFIX, DEFAULT_TTL_MS,
};
use crate::config::Config;
use crate::error::Result;

const PROBE_NAME: &str = "__availability_probe__";

// == Cache Service ==
/// Namespaced, versioned TTL cache.
#[derive(Debug)]
pub struct CacheService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    /// Namespace every key is stored under
    prefix: String,
    /// Envelope version written and accepted
    version: String,
    /// TTL in milliseconds used by `set`
    default_ttl: i64,
    counters: HitCounters,
}

impl CacheService {
    // == Constructor ==
    /// Creates a service with the default namespace, version and TTL.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            prefix: DEFAULT_PREFIX.to_string(),
            version: CACHE_VERSION.to_string(),
            default_ttl: DEFAULT_TTL_MS,
            counters: HitCounters::default(),
        }
    }

    /// Creates a service using the namespace, version and TTL from `config`.
    pub fn from_config(store: Arc<dyn KeyValueStore>, config: &Config) -> Self {
        Self::new(store)
            .with_prefix(config.cache_prefix.clone())
            .with_version(config.cache_version.clone())
            .with_default_ttl(config.default_ttl_ms)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_default_ttl(mut self, ttl_ms: i64) -> Self {
        self.default_ttl = ttl_ms.max(0);
        self
    }

    // == Accessors ==
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn default_ttl(&self) -> i64 {
        self.default_ttl
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Full store key for a logical cache name.
    pub fn key_for(&self, name: &str) -> String {
        storage_key(&self.prefix, name)
    }

    // == Set ==
    /// Stores `data` under `name` with the default TTL.
    pub fn set<T: Serialize>(&self, name: impl AsRef<str>, data: &T) {
        self.set_with_ttl(name, data, self.default_ttl);
    }

    /// Stores `data` under `name`, overwriting any previous entry.
    ///
    /// Negative TTLs are stored as zero. Encoding or store failures are
    /// logged and nothing is written.
    pub fn set_with_ttl<T: Serialize>(&self, name: impl AsRef<str>, data: &T, ttl_ms: i64) {
        let key = self.key_for(name.as_ref());
        let entry = CacheEntry::new(data, self.now_ms(), ttl_ms.max(0), self.version.as_str());

        let written = entry
            .to_json()
            .and_then(|json| self.store.set_item(&key, &json));

        match written {
            Ok(()) => debug!(key = %key, ttl_ms = entry.ttl, "Cache entry written"),
            Err(e) => warn!(key = %key, error = %e, "Cache write skipped"),
        }
    }

    // == Get ==
    /// Returns the cached value for `name` if present, current and decodable.
    ///
    /// Version mismatches, expired entries and corrupted entries are removed
    /// from the store and reported as a miss.
    pub fn get<T: DeserializeOwned>(&self, name: impl AsRef<str>) -> Option<T> {
        let key = self.key_for(name.as_ref());

        let raw = match self.store.get_item(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %key, "Cache miss");
                self.counters.record_miss();
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed");
                self.counters.record_miss();
                return None;
            }
        };

        match self.decode_valid::<T>(&raw) {
            Ok(data) => {
                debug!(key = %key, "Cache hit");
                self.counters.record_hit();
                Some(data)
            }
            Err(reason) => {
                debug!(key = %key, reason, "Cache entry discarded");
                self.remove_key(&key);
                self.counters.record_miss();
                None
            }
        }
    }

    fn decode_valid<T: DeserializeOwned>(&self, raw: &str) -> std::result::Result<T, &'static str> {
        let entry = RawEntry::parse(raw).map_err(|_| "corrupted")?;
        if entry.version != self.version {
            return Err("version mismatch");
        }
        if entry.is_expired(self.now_ms()) {
            return Err("expired");
        }
        entry.decode::<T>().map(|e| e.data).map_err(|_| "corrupted")
    }

    // == Remove ==
    /// Deletes the entry for `name`. Idempotent; failures are logged.
    pub fn remove(&self, name: impl AsRef<str>) {
        let key = self.key_for(name.as_ref());
        self.remove_key(&key);
    }

    /// Deletes the entry for `name`, reporting store failures.
    pub fn try_remove(&self, name: impl AsRef<str>) -> Result<()> {
        self.store.remove_item(&self.key_for(name.as_ref()))
    }

    fn remove_key(&self, key: &str) -> bool {
        match self.store.remove_item(key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache remove failed");
                false
            }
        }
    }

    // == Clear ==
    /// Removes every entry in the namespace; other keys are left alone.
    ///
    /// Returns the number of entries removed.
    pub fn clear(&self) -> usize {
        let removed = self
            .namespaced_keys()
            .iter()
            .filter(|key| self.remove_key(key))
            .count();
        info!(removed, "Cache cleared");
        removed
    }

    // == Clean Expired ==
    /// Removes expired, corrupted and foreign-version entries in the namespace.
    ///
    /// Returns the number of entries removed.
    pub fn clean_expired(&self) -> usize {
        let now = self.now_ms();
        let mut removed = 0;

        for key in self.namespaced_keys() {
            let stale = match self.store.get_item(&key) {
                Ok(Some(raw)) => match RawEntry::parse(&raw) {
                    Ok(entry) => !entry.is_valid(now, &self.version),
                    Err(_) => true,
                },
                Ok(None) => false,
                Err(e) => {
                    warn!(key = %key, error = %e, "Cache read failed during cleanup");
                    false
                }
            };

            if stale && self.remove_key(&key) {
                removed += 1;
            }
        }

        if removed > 0 {
            info!(removed, "Expired cache entries cleaned");
        } else {
            debug!("No expired cache entries found");
        }
        removed
    }

    // == Stats ==
    /// Lists every decodable entry in the namespace with its size and age.
    ///
    /// Read-only: corrupted entries are skipped, not removed.
    pub fn get_stats(&self) -> CacheStats {
        let now = self.now_ms();
        let entries = self
            .namespaced_keys()
            .into_iter()
            .filter_map(|key| {
                let raw = self.store.get_item(&key).ok().flatten()?;
                let entry = RawEntry::parse(&raw).ok()?;
                Some(EntryStats {
                    size: raw.len(),
                    age: entry.age(now),
                    key,
                })
            })
            .collect();

        CacheStats::from_entries(entries, &self.counters)
    }

    // == Availability ==
    /// Trial write and remove inside the namespace.
    pub fn is_available(&self) -> bool {
        let key = self.key_for(PROBE_NAME);
        let probe = self
            .store
            .set_item(&key, "1")
            .and_then(|_| self.store.remove_item(&key));

        match probe {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Persistent store unavailable");
                false
            }
        }
    }

    fn namespaced_keys(&self) -> Vec<String> {
        let ns = namespace_prefix(&self.prefix);
        match self.store.keys() {
            Ok(keys) => keys.into_iter().filter(|k| k.starts_with(&ns)).collect(),
            Err(e) => {
                warn!(error = %e, "Cache key listing failed");
                Vec::new()
            }
        }
    }
}
