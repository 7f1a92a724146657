//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::{CACHE_VERSION, DEFAULT_PREFIX, DEFAULT_TTL_MS};
use crate::invalidation::{DEFAULT_MAX_AGE_MS, DEFAULT_STALE_THRESHOLD_MS};

/// Default interval between background cleanup runs.
pub const DEFAULT_CLEANUP_INTERVAL_MS: u64 = 60_000;

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL in milliseconds applied to every write-through
    pub default_ttl_ms: i64,
    /// Envelope version tag; entries with another tag are discarded
    pub cache_version: String,
    /// Namespace prefix shared by every cache key
    pub cache_prefix: String,
    /// Threshold for the time-based strategy
    pub max_age_ms: i64,
    /// Threshold for the stale-data strategy
    pub stale_threshold_ms: i64,
    /// Background cleanup task interval in milliseconds
    pub cleanup_interval_ms: u64,
    /// File backing the persistent store, None keeps it in memory
    pub store_path: Option<PathBuf>,
    /// JSON file the product source reads from
    pub products_path: PathBuf,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - Entry TTL (default: 300000)
    /// - `CACHE_VERSION` - Envelope version tag (default: "1.0")
    /// - `CACHE_PREFIX` - Key namespace (default: "storefront")
    /// - `MAX_AGE_MS` - Time-based strategy threshold (default: 300000)
    /// - `STALE_THRESHOLD_MS` - Stale-data strategy threshold (default: 600000)
    /// - `CLEANUP_INTERVAL_MS` - Cleanup frequency (default: 60000)
    /// - `CACHE_STORE_PATH` - Persistent store file (default: in-memory)
    /// - `PRODUCTS_PATH` - Product catalogue file (default: "products.json")
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl_ms: parse_var("DEFAULT_TTL_MS").unwrap_or(defaults.default_ttl_ms),
            cache_version: env::var("CACHE_VERSION").unwrap_or(defaults.cache_version),
            cache_prefix: env::var("CACHE_PREFIX")
                .ok()
                .filter(|p| !p.is_empty())
                .unwrap_or(defaults.cache_prefix),
            max_age_ms: parse_var("MAX_AGE_MS").unwrap_or(defaults.max_age_ms),
            stale_threshold_ms: parse_var("STALE_THRESHOLD_MS")
                .unwrap_or(defaults.stale_threshold_ms),
            cleanup_interval_ms: parse_var("CLEANUP_INTERVAL_MS")
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.cleanup_interval_ms),
            store_path: env::var("CACHE_STORE_PATH").ok().map(PathBuf::from),
            products_path: env::var("PRODUCTS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.products_path),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_TTL_MS,
            cache_version: CACHE_VERSION.to_string(),
            cache_prefix: DEFAULT_PREFIX.to_string(),
            max_age_ms: DEFAULT_MAX_AGE_MS,
            stale_threshold_ms: DEFAULT_STALE_THRESHOLD_MS,
            cleanup_interval_ms: DEFAULT_CLEANUP_INTERVAL_MS,
            store_path: None,
            products_path: PathBuf::from("products.json"),
            server_port: 3000,
        }
    }
}
