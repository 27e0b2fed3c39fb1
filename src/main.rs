//! Tracking Cache - A capacity-bounded cache over a key-value store
//!
//! HTTP server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tracking_cache::api::create_router;
use tracking_cache::{
    spawn_expiry_sweep, AppState, CacheEngine, Config, MemoryStore, StoreBackend,
};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the engine over the configured store backend
/// 4. Start the expiry sweep when the store is in-process
/// 5. Serve the Axum router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracking_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tracking Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, capacity={}, default_ttl={}s, policy={}, port={}",
        config.store_backend,
        config.capacity,
        config.default_ttl,
        config.eviction_policy,
        config.server_port
    );

    let (state, sweep_handle) = build_state(&config).await?;

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Builds the application state for the configured backend.
///
/// A Redis store that cannot be reached leaves the server running
/// unconfigured; `PUT /cache/config` can attach one later.
async fn build_state(config: &Config) -> anyhow::Result<(AppState, Option<JoinHandle<()>>)> {
    let cache_config = config.cache_config();

    match config.store_backend {
        StoreBackend::Memory => {
            let store = Arc::new(MemoryStore::new());
            let sweep = spawn_expiry_sweep(store.clone(), config.cleanup_interval);
            info!("Expiry sweep started");

            let engine = CacheEngine::new(store, cache_config)
                .context("invalid cache configuration")?;
            Ok((AppState::new(engine), Some(sweep)))
        }
        StoreBackend::Redis => {
            match CacheEngine::configure(
                &config.store_host,
                config.store_port,
                cache_config.clone(),
            )
            .await
            {
                Ok(engine) => Ok((AppState::new(engine), None)),
                Err(e) => {
                    warn!(
                        "Store at {}:{} unavailable, starting unconfigured: {}",
                        config.store_host, config.store_port, e
                    );
                    Ok((AppState::unconfigured().with_defaults(cache_config), None))
                }
            }
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the expiry sweep and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("Expiry sweep aborted");
    }
}
