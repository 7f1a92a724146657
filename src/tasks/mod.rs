//! Background Tasks Module
//!
//! # Tasks
//! - Cache Cleanup: sweeps expired cache entries at a configured interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
