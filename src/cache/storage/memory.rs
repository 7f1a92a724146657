//! In-process store with an optional byte quota.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::cache::lock::mutex_lock;
use crate::cache::storage::KeyValueStore;
use crate::error::{CacheError, Result};

const SOURCE: &str = "cache::storage::memory";

// == Memory Store ==
/// Map-backed store. Data lives as long as the value does.
#[derive(Debug)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<String, String>>,
    /// Maximum summed key + value bytes, None = unbounded
    quota: Option<usize>,
    available: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            quota: None,
            available: AtomicBool::new(true),
        }
    }

    /// Creates a store that rejects writes once `quota` bytes are in use.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::new()
        }
    }

    /// Toggles availability; an unavailable store fails every call.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::StoreUnavailable(
                "memory store is disabled".to_string(),
            ))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.ensure_available()?;
        Ok(mutex_lock(&self.items, SOURCE, "get_item").get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_available()?;
        let mut items = mutex_lock(&self.items, SOURCE, "set_item");

        if let Some(quota) = self.quota {
            let used: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = used + key.len() + value.len();
            if needed > quota {
                return Err(CacheError::QuotaExceeded { needed, quota });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.ensure_available()?;
        mutex_lock(&self.items, SOURCE, "remove_item").remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.ensure_available()?;
        Ok(mutex_lock(&self.items, SOURCE, "keys").keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();

        store.set_item("a", "1").unwrap();
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("1"));

        store.remove_item("a").unwrap();
        assert!(store.get_item("a").unwrap().is_none());

        // Absent key removal is fine
        store.remove_item("a").unwrap();
    }

    #[test]
    fn test_keys_are_sorted() {
        let store = MemoryStore::new();
        store.set_item("b", "x").unwrap();
        store.set_item("a", "y").unwrap();

        assert_eq!(store.keys().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let store = MemoryStore::with_quota(10);
        store.set_item("k", "1234").unwrap();

        let result = store.set_item("other", "123456");
        assert!(matches!(result, Err(CacheError::QuotaExceeded { .. })));

        // Overwriting the same key only counts the new value
        store.set_item("k", "123456789").unwrap();
    }

    #[test]
    fn test_unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_available(false);

        assert!(matches!(store.get_item("a"), Err(CacheError::StoreUnavailable(_))));
        assert!(store.set_item("a", "1").is_err());
        assert!(store.remove_item("a").is_err());
        assert!(store.keys().is_err());

        store.set_available(true);
        assert!(store.set_item("a", "1").is_ok());
    }
}
