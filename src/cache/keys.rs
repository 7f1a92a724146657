//! Cache Key Module
//!
//! Named slots in the cache namespace and the storage-key convention.

use std::fmt;

// == Cache Key ==
/// Well-known logical cache names.
///
/// Only `Products` and `Categories` are read and written by the product
/// cache; the rest are reserved so other features share one namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Products,
    Categories,
    UserPreferences,
    SearchHistory,
    Wishlist,
    Cart,
}

impl CacheKey {
    pub const ALL: [CacheKey; 6] = [
        CacheKey::Products,
        CacheKey::Categories,
        CacheKey::UserPreferences,
        CacheKey::SearchHistory,
        CacheKey::Wishlist,
        CacheKey::Cart,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKey::Products => "products",
            CacheKey::Categories => "categories",
            CacheKey::UserPreferences => "user-preferences",
            CacheKey::SearchHistory => "search-history",
            CacheKey::Wishlist => "wishlist",
            CacheKey::Cart => "cart",
        }
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Key Helpers ==
/// Builds the store key for a logical name: `<prefix>_<name>_cache`.
pub fn storage_key(prefix: &str, name: &str) -> String {
    format!("{}_{}_cache", prefix, name)
}

/// Prefix every key in the namespace starts with.
pub fn namespace_prefix(prefix: &str) -> String {
    format!("{}_", prefix)
}
