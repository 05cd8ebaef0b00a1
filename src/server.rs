//! HTTP server startup.

use tokio::net::TcpListener;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::metrics::Metrics;
use crate::utils::shutdown_signal;

/// Validate the configuration, build the metrics registry and serve the API
/// until a shutdown signal arrives.
pub async fn run(config: &Config) -> Result<()> {
    config.validate().map_err(ServiceError::InvalidConfig)?;

    let metrics = Metrics::new(&config.latency_buckets)?;
    let router = create_router(AppState::new(metrics));

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}
