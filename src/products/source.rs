//! Backend product listing.
//!
//! The storefront's data store is an external collaborator; the cache only
//! needs its "list every product" call.

use std::fmt::Debug;
use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;

use crate::products::Product;

// == Product Source ==
/// Authoritative product listing.
#[async_trait]
pub trait ProductSource: Send + Sync + Debug {
    /// Returns the complete product list, or the reason it could not be fetched.
    async fn fetch_products(&self) -> anyhow::Result<Vec<Product>>;
}

// == File Product Source ==
/// Reads the catalogue from a JSON array on disk.
#[derive(Debug, Clone)]
pub struct FileProductSource {
    path: PathBuf,
}

impl FileProductSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProductSource for FileProductSource {
    async fn fetch_products(&self) -> anyhow::Result<Vec<Product>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let products = serde_json::from_slice(&bytes)
            .with_context(|| format!("invalid product list in {}", self.path.display()))?;
        Ok(products)
    }
}
