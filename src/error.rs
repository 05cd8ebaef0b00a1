//! Unified error types for the API service.

use thiserror::Error;

/// Unified error type for the API service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Metrics registry construction error.
    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Metrics registry errors.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// The exporter rejected the histogram bucket configuration.
    #[error("invalid latency buckets: {0}")]
    InvalidBuckets(#[from] metrics_exporter_prometheus::BuildError),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;
