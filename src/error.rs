//! Error types for the storefront cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache, its store adapter and the HTTP surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Requested item does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Underlying persistent store is disabled or blocked
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Write would exceed the store's byte quota
    #[error("Store quota exceeded: {needed} bytes needed, {quota} bytes allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Stored entry could not be decoded
    #[error("Corrupted entry: {0}")]
    Corrupted(String),

    /// Payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure in a file-backed store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Strategy action reported a failure
    #[error("Strategy '{name}' failed: {reason}")]
    Strategy { name: String, reason: String },
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::StoreUnavailable(_) | CacheError::QuotaExceeded { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            CacheError::Corrupted(_)
            | CacheError::Serialization(_)
            | CacheError::Io(_)
            | CacheError::Strategy { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for CacheError {
    fn from(rejection: JsonRejection) -> Self {
        CacheError::InvalidRequest(rejection.body_text())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the storefront cache.
pub type Result<T> = std::result::Result<T, CacheError>;
