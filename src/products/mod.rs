//! Products Module
//!
//! Product model, backend source and the caching orchestrator in front of it.

mod model;
mod orchestrator;
mod source;

pub use model::Product;
pub use orchestrator::{ProductCache, ProductCacheState};
pub use source::{FileProductSource, ProductSource};
