//! Storefront Cache - TTL product cache for a storefront backend
//!
//! Serves the cached catalogue and the cache diagnostics over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_cache::api::{create_router, AppState};
use storefront_cache::cache::{CacheService, FileStore, KeyValueStore, MemoryStore};
use storefront_cache::products::{FileProductSource, ProductCache};
use storefront_cache::{Config, InvalidationManager};

/// Main entry point for the storefront cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the persistent store, falling back to memory
/// 4. Build cache service, invalidation manager and product cache
/// 5. Mount the product cache (cleanup task + initial load)
/// 6. Start HTTP server on configured port
/// 7. Unmount on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Storefront Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={}ms, prefix={}, version={}, port={}, cleanup_interval={}ms",
        config.default_ttl_ms,
        config.cache_prefix,
        config.cache_version,
        config.server_port,
        config.cleanup_interval_ms
    );

    let store = open_store(&config);
    let cache = Arc::new(CacheService::from_config(store, &config));
    if !cache.is_available() {
        warn!("Persistent store unavailable, every read will go to the backend");
    }

    let invalidation = Arc::new(InvalidationManager::from_config(cache.clone(), &config));
    let source = Arc::new(FileProductSource::new(&config.products_path));
    let products = Arc::new(
        ProductCache::new(cache, invalidation, source)
            .with_cleanup_interval(Duration::from_millis(config.cleanup_interval_ms)),
    );

    products.mount().await;
    info!("Product cache mounted");

    let app = create_router(AppState::new(products.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    products.unmount();
    info!("Server shutdown complete");
    Ok(())
}

/// Opens the configured file store, or an in-memory store when none is
/// configured or the file cannot be opened.
fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    match &config.store_path {
        Some(path) => match FileStore::open(path) {
            Ok(store) => {
                info!(path = %path.display(), "Using file-backed cache store");
                Arc::new(store)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Falling back to in-memory cache store");
                Arc::new(MemoryStore::new())
            }
        },
        None => Arc::new(MemoryStore::new()),
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
