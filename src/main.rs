//! Shell Cache - An offline caching agent for a web application shell
//!
//! Serves the shell through network-first and cache-first policies backed by
//! generation-versioned cache stores.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shell_cache::api::create_router;
use shell_cache::{spawn_registration_task, AppState, Config};

/// Main entry point for the caching agent.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the agent with its cache storage and network client
/// 4. Start background registration (install + activate)
/// 5. Create Axum router with the proxy and admin endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shell_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Shell Cache agent");

    let config = Config::from_env();
    info!(
        "Configuration loaded: generation={}, upstream={}, page_origin={}, manifest={:?}, port={}",
        config.generation,
        config.upstream_url,
        config.page_origin,
        config.static_manifest,
        config.server_port
    );

    let state = AppState::from_config(&config).context("Invalid agent configuration")?;
    info!(
        "Cache stores: {}",
        state.agent.options().cache_names().join(", ")
    );

    // Registration failure is not fatal; requests pass through until it succeeds.
    let registration_handle =
        spawn_registration_task(state.agent.clone(), config.registration_retry);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Agent listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(registration_handle))
        .await
        .context("Server error")?;

    info!("Agent shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts a still-running registration task.
async fn shutdown_signal(registration_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
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

    if !registration_handle.is_finished() {
        registration_handle.abort();
        warn!("Registration task aborted");
    }
}
