//! Persistent Key-Value Store Adapter
//!
//! A synchronous string-to-string store, shared with unrelated application
//! data. The cache service only ever touches keys inside its own namespace.

mod file;
mod memory;

use std::fmt::Debug;

use crate::error::Result;

pub use file::FileStore;
pub use memory::MemoryStore;

// == Key-Value Store Trait ==
/// Origin-scoped string store the cache persists into.
///
/// Every call may fail when the store is disabled, blocked or full; the
/// cache service turns those failures into misses and no-ops.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Returns the raw value stored at `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` at `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Removing an absent key succeeds.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Lists every key currently held, in ascending order.
    fn keys(&self) -> Result<Vec<String>>;
}
