//! Product Gateway - data-access layer with cache-aside reads and manual failover
//!
//! # Startup Sequence
//! 1. Initialize tracing subscriber for logging
//! 2. Load configuration from environment variables
//! 3. Connect the cache port (degraded no-cache mode if Redis is down)
//! 4. Build the store ports and the failover coordinator
//! 5. Start the background health-check task
//! 6. Create Axum router with all endpoints
//! 7. Start HTTP server on configured port
//! 8. Handle graceful shutdown on SIGINT/SIGTERM

mod api;
mod config;
mod error;
mod models;
mod ports;
mod service;
mod tasks;
mod topology;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use config::Config;
use ports::{
    CommandProxyControl, DisabledCache, LogOnlyProxyControl, PgHealthProbe, PgPromoter, PgStore,
    ProductCache, ProxyControl, RedisCache,
};
use service::{GatewayStats, ProductService};
use tasks::spawn_health_task;
use topology::{FailoverCoordinator, TopologyState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "product_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Product Gateway");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: ttl={}s, fallback={:?}, port={}, health_interval={}s",
        config.cache_ttl_seconds,
        config.reader_fallback,
        config.server_port,
        config.health_check_interval
    );

    // Cache port; an unreachable Redis only costs hit-rate, never reads
    let cache_timeout = Duration::from_millis(config.cache_timeout_ms);
    let cache: Arc<dyn ProductCache> =
        match RedisCache::connect(&config.redis_url, cache_timeout).await {
            Ok(cache) => {
                info!(url = %config.redis_url, "Cache connected");
                Arc::new(cache)
            }
            Err(e) => {
                warn!(error = %e, "Cache unreachable at startup, serving without it");
                Arc::new(DisabledCache)
            }
        };

    // Store ports and topology
    let store_timeout = Duration::from_millis(config.store_timeout_ms);
    let store = Arc::new(PgStore::new(store_timeout));
    let proxy: Arc<dyn ProxyControl> = match &config.proxy_repoint_cmd {
        Some(cmd) => Arc::new(CommandProxyControl::new(cmd.clone())),
        None => Arc::new(LogOnlyProxyControl),
    };
    let coordinator = Arc::new(FailoverCoordinator::new(
        TopologyState::new(&config.primary_dsn, &config.replica_dsn),
        Arc::new(PgPromoter::new(store_timeout)),
        proxy,
        config.promote_confirm_attempts,
        Duration::from_millis(config.promote_confirm_delay_ms),
    ));

    let stats = Arc::new(GatewayStats::new());
    let service = Arc::new(ProductService::new(
        store.clone(),
        store,
        cache,
        coordinator.clone(),
        config.reader_fallback,
        config.cache_ttl_seconds,
        stats.clone(),
    ));
    let state = AppState::new(service, coordinator.clone(), stats);
    info!("Gateway wired");

    // Start background health-check task
    let probe = Arc::new(PgHealthProbe::new(store_timeout));
    let health_handle = spawn_health_task(coordinator, probe, config.health_check_interval);
    info!("Background health-check task started");

    // Create router with all endpoints
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(health_handle))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the health task and allows graceful shutdown.
async fn shutdown_signal(health_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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

    // Abort the health task
    health_handle.abort();
    warn!("Health-check task aborted");
}
