// Telemetry module for structured logging, metrics, and tracing

use anyhow::Result;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    trace::{RandomIdGenerator, Sampler, TracerProvider},
    Resource,
};
use std::net::SocketAddr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const SERVICE_NAME: &str = "finance-backend";

/// Initialize structured logging with JSON formatting
///
/// `RUST_LOG` takes precedence over `log_level`. When `tracing_endpoint` is set,
/// spans are also exported over OTLP.
#[tracing::instrument(skip_all)]
pub fn init_logging(log_level: &str, tracing_endpoint: Option<&str>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    let registry = tracing_subscriber::registry().with(json_layer);

    if let Some(endpoint) = tracing_endpoint {
        let tracer = init_tracer(endpoint)?;
        let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);
        registry
            .with(telemetry_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;
    } else {
        registry
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;
    }

    tracing::info!(
        log_level = log_level,
        tracing_endpoint = tracing_endpoint,
        "Structured logging initialized"
    );

    Ok(())
}

#[tracing::instrument(skip_all)]
fn init_tracer(endpoint: &str) -> Result<opentelemetry_sdk::trace::Tracer> {
    use opentelemetry_sdk::runtime::Tokio;

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint)
        .build_span_exporter()
        .map_err(|e| anyhow::anyhow!("Failed to build span exporter: {}", e))?;

    let tracer_provider = TracerProvider::builder()
        .with_batch_exporter(exporter, Tokio)
        .with_config(
            opentelemetry_sdk::trace::Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(Resource::new(vec![
                    KeyValue::new("service.name", SERVICE_NAME),
                    KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                ])),
        )
        .build();

    global::set_tracer_provider(tracer_provider.clone());
    let tracer = tracer_provider.tracer(SERVICE_NAME);

    tracing::info!(endpoint = endpoint, "OpenTelemetry tracer initialized");

    Ok(tracer)
}

/// Flush remaining spans on shutdown
pub fn shutdown_tracer() {
    global::shutdown_tracer_provider();
}

/// Initialize the Prometheus exporter and describe the service metrics
#[tracing::instrument(skip_all)]
pub fn init_metrics(metrics_port: u16) -> Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", metrics_port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid metrics port: {}", e))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    describe_counter!("http_requests_total", "Total number of handled HTTP requests");
    describe_counter!(
        "transactions_created_total",
        "Total number of transactions recorded"
    );
    describe_counter!(
        "notifications_created_total",
        "Total number of notifications created"
    );
    describe_counter!("exports_total", "Report exports by format and status");
    describe_histogram!(
        "export_duration_seconds",
        "Time spent generating report exports"
    );
    describe_counter!(
        "chat_completions_total",
        "Chat completion requests by status"
    );
    describe_counter!("scheduler_job_runs_total", "Scheduler job runs by status");
    describe_histogram!(
        "scheduler_job_duration_seconds",
        "Duration of scheduler job runs in seconds"
    );

    tracing::info!(
        metrics_port = metrics_port,
        metrics_endpoint = format!("http://0.0.0.0:{}/metrics", metrics_port),
        "Prometheus metrics exporter initialized"
    );

    Ok(())
}

#[inline]
pub fn record_http_request(method: &str, status: u16) {
    counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

#[inline]
pub fn record_transaction_created(transaction_type: &str) {
    counter!("transactions_created_total", "type" => transaction_type.to_string()).increment(1);
}

#[inline]
pub fn record_notification_created(notification_type: &str) {
    counter!(
        "notifications_created_total",
        "type" => notification_type.to_string()
    )
    .increment(1);
}

/// Record a finished export and how long rendering took
#[inline]
pub fn record_export(format: &str, status: &str, duration_seconds: f64) {
    counter!(
        "exports_total",
        "format" => format.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("export_duration_seconds", "format" => format.to_string()).record(duration_seconds);
}

#[inline]
pub fn record_chat_completion(status: &str) {
    counter!("chat_completions_total", "status" => status.to_string()).increment(1);
}

/// Record a scheduler job run
#[inline]
pub fn record_job_run(job_name: &str, status: &str, duration_seconds: f64) {
    counter!(
        "scheduler_job_runs_total",
        "job" => job_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("scheduler_job_duration_seconds", "job" => job_name.to_string())
        .record(duration_seconds);
}
