use std::net::SocketAddr;

use anyhow::Context;

use vitals_worker::config::WorkerConfig;
use vitals_worker::router::build_app_router;
use vitals_worker::state::AppState;
use vitals_worker::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration (needed first for the log format) ---
    let config = WorkerConfig::from_env();
    logging::init(
        config
            .as_ref()
            .map(|c| c.log_format)
            .unwrap_or_default(),
    );
    let config = config.context("Invalid worker configuration")?;

    tracing::info!(
        host = %config.host,
        port = config.port,
        event_hub = config.event_hub_name.as_deref().unwrap_or("<unset>"),
        event_hub_connection_set = config.event_hub_connection_set,
        consumer_group = %config.consumer_group,
        storage_configured = config.storage_connection_string.is_some(),
        container = %config.container_name,
        webhook_configured = config.webhook_url.is_some(),
        "Loaded worker configuration"
    );

    // --- Collaborators ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    let state = AppState::from_config(config).context("Failed to build worker state")?;
    let app = build_app_router(state);

    // --- Start server ---
    tracing::info!(%addr, "Starting telemetry worker");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the worker stops
/// cleanly whether run interactively or by the function host.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
