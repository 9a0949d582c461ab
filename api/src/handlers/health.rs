use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// Service banner at the root URL
#[tracing::instrument]
pub async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Personal Finance API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Health check endpoint
#[tracing::instrument]
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus { status: "healthy" })
}
