//! DDUP Server: multi-tenant identity backend.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use ddup_auth::SessionCleanup;
use ddup_core::config::AppConfig;
use ddup_core::error::AppError;
use ddup_database::Stores;
use ddup_database::probe::spawn_liveness_probe;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from `config/default.toml`, the `DDUP_ENV` overlay, and
/// `DDUP__*` environment variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("DDUP_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        driver = %config.database.driver,
        "Starting DDUP"
    );

    // ── Step 1: Storage ──────────────────────────────────────────
    let stores = Stores::from_config(&config.database).await?;

    // ── Step 2: Auth components and services ─────────────────────
    let config = Arc::new(config);
    let state = ddup_api::app::build_state(Arc::clone(&config), stores.clone())?;

    // ── Step 3: Background tasks ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let probe_handle = spawn_liveness_probe(
        stores.clone(),
        config.database.health_check_interval(),
        shutdown_rx.clone(),
    );
    let cleanup_handle =
        SessionCleanup::new(stores.sessions.clone(), &config.session).spawn(shutdown_rx);

    // ── Step 4: HTTP server ──────────────────────────────────────
    let app = ddup_api::build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(addr = %addr, "DDUP server listening");

    // ── Step 5: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 6: Wait for background tasks ────────────────────────
    tracing::info!("Waiting for background tasks to complete...");
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let _ = tokio::time::timeout(grace, probe_handle).await;
    let _ = tokio::time::timeout(grace, cleanup_handle).await;

    stores.close().await;

    tracing::info!("DDUP server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
