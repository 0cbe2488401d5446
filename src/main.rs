//! Template Relay - A resilient caching relay for a workflow template catalog
//!
//! Serves normalized template, category, and export data over REST, backed
//! by a tiered TTL cache and a retrying upstream fetcher.

mod api;
mod cache;
mod catalog;
mod config;
mod error;
mod fetch;
mod models;
mod tasks;

use std::net::SocketAddr;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use config::Config;
use tasks::spawn_cleanup_task;

/// Main entry point for the template relay.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the catalog service and shared state
/// 4. Start background TTL cleanup task
/// 5. Probe upstream health once
/// 6. Create Axum router with all endpoints
/// 7. Start HTTP server on configured port
/// 8. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "template_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting template relay");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: api_base={}, port={}, max_retries={}, cleanup_interval={}s",
        config.api_base, config.server_port, config.max_retries, config.cleanup_interval
    );

    // Create application state with the catalog service
    let state = AppState::from_config(&config);
    info!("Catalog service initialized");

    // Start background cleanup task
    let cleanup_handle = spawn_cleanup_task(state.service.cache(), config.cleanup_interval);
    info!("Background cleanup task started");

    // Probe the upstream once so a dead catalog shows up at startup
    if state.service.health_check().await {
        info!("Upstream catalog is reachable");
    } else {
        warn!("Upstream catalog is unreachable; serving from cache until it recovers");
    }

    // Create router with all endpoints
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
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

    // Abort the cleanup task
    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
