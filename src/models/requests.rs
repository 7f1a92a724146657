//! Request DTOs for the storefront cache API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::invalidation::{DataType, UserAction};

/// Request body for `POST /cache/invalidate`
///
/// # Fields
/// - `action`: The user action that happened (e.g. `"product-update"`)
/// - `data_type`: Optional kind of backend data that changed
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    pub action: UserAction,
    #[serde(default)]
    pub data_type: Option<DataType>,
}

/// Query string for `GET /products/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}
