use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;

mod handlers;
mod middleware;
mod routes;
mod state;


use common::config::Settings;
use common::db::DbPool;
use common::services::{HttpOAuthVerifier, LogMailer, OpenAiClient};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Settings::load()?;

    common::telemetry::init_logging(
        &config.observability.log_level,
        config.observability.tracing_endpoint.as_deref(),
    )?;
    tracing::info!("Starting API server");

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        api_prefix = %config.server.api_prefix,
        "Configuration loaded"
    );

    if let Err(e) = common::telemetry::init_metrics(config.observability.metrics_port) {
        tracing::error!(error = %e, "Failed to start metrics exporter");
    }

    // Initialize database connection pool
    let db_pool = DbPool::new(&config.database).await?;
    tracing::info!("Database connection pool established");

    if config.database.run_migrations {
        db_pool.run_migrations().await?;
        tracing::info!("Database migrations applied");
    }

    tokio::fs::create_dir_all(&config.storage.upload_dir).await?;

    let oauth = HttpOAuthVerifier::new(config.auth.google_client_id.clone())?;
    let completions = OpenAiClient::new(config.openai.clone())?;
    if config.openai.api_key.is_none() {
        tracing::warn!("OpenAI API key not configured, chat replies will fail");
    }

    let state = AppState::new(
        db_pool.clone(),
        config.clone(),
        Arc::new(LogMailer),
        Arc::new(oauth),
        Arc::new(completions),
    );

    let app = routes::create_router(state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));
    tracing::info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_pool.close().await;
    common::telemetry::shutdown_tracer();
    tracing::info!("API server stopped");
    Ok(())
}

/// Graceful shutdown signal handler
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Initiating graceful shutdown");
}
