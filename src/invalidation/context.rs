//! Invalidation signals.
//!
//! Closed enumerations of the events producers may fire, and the per-check
//! context strategies are evaluated against.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

// == User Action ==
/// Something a user (usually an admin) just did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserAction {
    ProductUpdate,
    ProductDelete,
    ProductAdd,
    CartUpdate,
    WishlistUpdate,
}

impl UserAction {
    pub const ALL: [UserAction; 5] = [
        UserAction::ProductUpdate,
        UserAction::ProductDelete,
        UserAction::ProductAdd,
        UserAction::CartUpdate,
        UserAction::WishlistUpdate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserAction::ProductUpdate => "product-update",
            UserAction::ProductDelete => "product-delete",
            UserAction::ProductAdd => "product-add",
            UserAction::CartUpdate => "cart-update",
            UserAction::WishlistUpdate => "wishlist-update",
        }
    }

    /// True for actions that change the product catalogue.
    pub fn touches_catalogue(&self) -> bool {
        matches!(
            self,
            UserAction::ProductUpdate | UserAction::ProductDelete | UserAction::ProductAdd
        )
    }
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserAction {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| CacheError::InvalidRequest(format!("Unknown user action: {}", s)))
    }
}

// == Data Type ==
/// Kind of backend data that changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataType {
    Products,
    Categories,
    Pricing,
    Inventory,
}

impl DataType {
    pub const ALL: [DataType; 4] = [
        DataType::Products,
        DataType::Categories,
        DataType::Pricing,
        DataType::Inventory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Products => "products",
            DataType::Categories => "categories",
            DataType::Pricing => "pricing",
            DataType::Inventory => "inventory",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| CacheError::InvalidRequest(format!("Unknown data type: {}", s)))
    }
}

// == Invalidation Context ==
/// Signals for one invalidation check. Built fresh each time, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationContext {
    /// When the check was made (Unix milliseconds)
    pub timestamp: i64,
    pub user_action: Option<UserAction>,
    pub data_changed: Option<DataType>,
    /// Age of the entry under consideration
    pub cache_age: Option<i64>,
    pub time_since_last_fetch: Option<i64>,
}

impl InvalidationContext {
    /// Empty context stamped at `timestamp`.
    pub fn at(timestamp: i64) -> Self {
        Self {
            timestamp,
            user_action: None,
            data_changed: None,
            cache_age: None,
            time_since_last_fetch: None,
        }
    }

    pub fn with_user_action(mut self, action: UserAction) -> Self {
        self.user_action = Some(action);
        self
    }

    pub fn with_data_changed(mut self, data_type: DataType) -> Self {
        self.data_changed = Some(data_type);
        self
    }

    pub fn with_cache_age(mut self, age_ms: i64) -> Self {
        self.cache_age = Some(age_ms);
        self
    }

    pub fn with_time_since_last_fetch(mut self, elapsed_ms: i64) -> Self {
        self.time_since_last_fetch = Some(elapsed_ms);
        self
    }
}
