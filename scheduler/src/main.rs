// Scheduler binary entry point

use common::config::Settings;
use common::db::DbPool;
use common::scheduler::{Scheduler, SchedulerEngine};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = Settings::load()?;

    common::telemetry::init_logging(
        &settings.observability.log_level,
        settings.observability.tracing_endpoint.as_deref(),
    )?;

    info!("Starting finance scheduler");

    settings.validate().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        e
    })?;

    info!(
        timezone = %settings.scheduler.timezone,
        weekly_report_cron = %settings.scheduler.weekly_report_cron,
        bill_check_cron = %settings.scheduler.bill_check_cron,
        "Configuration loaded"
    );

    if let Err(e) = common::telemetry::init_metrics(settings.observability.metrics_port) {
        error!(error = %e, "Failed to start metrics exporter");
    }

    let db_pool = DbPool::new(&settings.database).await.map_err(|e| {
        error!(error = %e, "Failed to initialize database pool");
        e
    })?;
    info!("Database connection pool initialized");

    let scheduler = Arc::new(SchedulerEngine::from_config(
        db_pool.clone(),
        &settings.scheduler,
    )?);
    info!(jobs = ?scheduler.job_names(), "Scheduler engine created");

    let scheduler_for_shutdown = scheduler.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, stopping scheduler");
        if let Err(e) = scheduler_for_shutdown.stop().await {
            error!(error = %e, "Error during scheduler shutdown");
        }
    });

    if let Err(e) = scheduler.start().await {
        error!(error = %e, "Scheduler error");
        return Err(e);
    }

    db_pool.close().await;
    common::telemetry::shutdown_tracer();
    info!("Scheduler stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to listen for SIGTERM");
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
