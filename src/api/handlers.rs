//! HTTP API handlers.

use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::metrics::Metrics;

/// Content type of the Prometheus text exposition format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=1.0.0; charset=utf-8";

/// Application state shared with handlers and middleware.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Request metrics registry.
    pub metrics: Metrics,
}

impl AppState {
    /// Create new app state around a metrics registry.
    pub fn new(metrics: Metrics) -> Self {
        Self { metrics }
    }
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Status: "ok".
    #[schema(example = "ok")]
    pub status: String,
}

/// Health check handler - always returns 200.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Metrics handler - Prometheus text exposition of request metrics.
#[utoipa::path(
    get,
    path = "/api/metrics",
    tag = "metrics",
    responses(
        (
            status = 200,
            description = "Prometheus metrics",
            body = String,
            content_type = "text/plain; version=1.0.0; charset=utf-8"
        )
    )
)]
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics.render(),
    )
}
