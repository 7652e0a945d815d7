//! Yank Paste - Personal paste-bin with bounded history
//!
//! Standalone server: rolling text history plus a small file drop, both
//! capped, behind a REST API and a static web UI.

use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod constants;
mod errors;
mod handlers;
mod metrics;
mod middleware;
mod store;
mod validation;

use config::ServerConfig;
use constants::{GRACEFUL_SHUTDOWN_TIMEOUT_SECS, STORE_FLUSH_TIMEOUT_SECS};
use handlers::{build_api_routes, build_ops_routes, AppContext, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Console logging, level controlled via RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Register Prometheus metrics
    metrics::register_metrics().expect("Failed to register metrics");
    info!("📊 Metrics registered at /metrics");

    info!("📋 Starting Yank Paste server...");

    // Load configuration from environment
    let server_config = ServerConfig::from_env();
    server_config.log();

    // Open both stores under the configured data directory
    let (history, files) = store::open_stores(&server_config)?;
    let state: AppState = Arc::new(AppContext::new(history, files, server_config.clone()));

    // Keep a reference for shutdown cleanup (clone BEFORE moving into router)
    let state_for_shutdown = Arc::clone(&state);

    // Configure rate limiting from config
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(server_config.rate_limit_per_second)
        .burst_size(server_config.rate_limit_burst)
        .finish()
        .expect("Failed to build governor rate limiter configuration");

    let governor_layer = GovernorLayer::new(governor_conf);

    info!(
        "⚡ Rate limiting enabled: {} req/sec, burst of {}",
        server_config.rate_limit_per_second, server_config.rate_limit_burst
    );

    // Build CORS layer from configuration
    let cors = server_config.cors.to_layer();

    // API routes get the rate limiter; ops routes (health, metrics, static)
    // must always be reachable for monitoring
    let api_routes = build_api_routes(state.clone()).layer(governor_layer);
    let ops_routes = build_ops_routes(state);

    // Concurrency limiting for production resilience
    let max_concurrent = server_config.max_concurrent_requests;
    info!("🔄 Concurrency limiting enabled: max_concurrent={max_concurrent}");

    let app = Router::new()
        .merge(ops_routes)
        .merge(api_routes)
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(ConcurrencyLimitLayer::new(max_concurrent))
        .layer(cors);

    // Start server using host/port from config
    let listener =
        tokio::net::TcpListener::bind((server_config.host.as_str(), server_config.port)).await?;
    info!(
        "🚀 Server listening on http://{}:{}",
        server_config.host, server_config.port
    );

    // Run the server - it will wait until shutdown signal is received
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("🔒 Shutdown signal received, flushing stores...");

    // Wrap cleanup with a timeout so a stuck flush cannot hang shutdown
    let cleanup_future = async {
        let flush_future = async { state_for_shutdown.flush_stores() };

        match tokio::time::timeout(
            std::time::Duration::from_secs(STORE_FLUSH_TIMEOUT_SECS),
            flush_future,
        )
        .await
        {
            Ok(Ok(())) => info!("✅ Stores flushed successfully"),
            Ok(Err(e)) => tracing::error!("❌ Failed to flush stores: {}", e),
            Err(_) => tracing::error!(
                "⏱️  Store flush timed out after {}s",
                STORE_FLUSH_TIMEOUT_SECS
            ),
        }
    };

    // Enforce overall cleanup timeout with force-exit fallback
    match tokio::time::timeout(
        std::time::Duration::from_secs(GRACEFUL_SHUTDOWN_TIMEOUT_SECS),
        cleanup_future,
    )
    .await
    {
        Ok(()) => {
            info!("👋 Server shutdown complete");
        }
        Err(_) => {
            tracing::error!(
                "⏱️  Graceful shutdown timed out after {}s, forcing exit",
                GRACEFUL_SHUTDOWN_TIMEOUT_SECS
            );
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Handle graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received, starting graceful shutdown");
}
