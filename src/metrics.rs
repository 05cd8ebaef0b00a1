//! Prometheus metrics for HTTP request counting and latency tracking.
//!
//! The registry is an owned [`Metrics`] handle rather than a globally installed
//! recorder: the application builds one at startup and hands it to the router,
//! and tests build a fresh one each. Recording goes through the `metrics`
//! macros against this handle's recorder.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use tracing::{debug, error};

use crate::error::MetricsError;
use crate::exposition::{self, FamilyHeader};

// === Metric Name Constants ===

/// Request counter metric name.
pub const METRIC_REQUESTS_TOTAL: &str = "app_requests_total";
/// Request latency histogram metric name.
pub const METRIC_REQUEST_LATENCY: &str = "request_latency_seconds";

const REQUESTS_TOTAL_HELP: &str = "Total HTTP requests";
const REQUEST_LATENCY_HELP: &str = "HTTP request latency in seconds";

/// Families exposed on every render, observed or not.
const FAMILIES: &[FamilyHeader] = &[
    FamilyHeader {
        name: METRIC_REQUESTS_TOTAL,
        kind: "counter",
        help: REQUESTS_TOTAL_HELP,
    },
    FamilyHeader {
        name: METRIC_REQUEST_LATENCY,
        kind: "histogram",
        help: REQUEST_LATENCY_HELP,
    },
];

/// Default latency bucket bounds in seconds.
pub const DEFAULT_LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Shared metrics registry. Clones share the same series.
#[derive(Clone)]
pub struct Metrics {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl Metrics {
    /// Build a registry whose latency histogram uses the given bucket bounds.
    pub fn new(buckets: &[f64]) -> Result<Self, MetricsError> {
        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Full(METRIC_REQUEST_LATENCY.to_string()), buckets)?;
        debug!(buckets = buckets.len(), "Latency buckets configured");
        Ok(Self::from_builder(builder))
    }

    /// Build a registry with [`DEFAULT_LATENCY_BUCKETS`].
    pub fn with_default_buckets() -> Self {
        match Self::new(DEFAULT_LATENCY_BUCKETS) {
            Ok(metrics) => metrics,
            // The exporter only rejects an empty bound list and
            // DEFAULT_LATENCY_BUCKETS is non-empty; a summary registry keeps
            // the service up if that ever changes.
            Err(e) => {
                error!("Default latency buckets rejected, falling back to summaries: {}", e);
                Self::from_builder(PrometheusBuilder::new())
            }
        }
    }

    fn from_builder(builder: PrometheusBuilder) -> Self {
        let recorder = builder.build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_counter!(METRIC_REQUESTS_TOTAL, REQUESTS_TOTAL_HELP);
            describe_histogram!(METRIC_REQUEST_LATENCY, Unit::Seconds, REQUEST_LATENCY_HELP);
        });

        debug!("Metrics initialized");

        Self {
            recorder: Arc::new(recorder),
            handle,
        }
    }

    /// Increment the request counter for a label pair.
    pub fn increment_counter(&self, method: &str, endpoint: &str) {
        metrics::with_local_recorder(self.recorder.as_ref(), || {
            counter!(
                METRIC_REQUESTS_TOTAL,
                "endpoint" => endpoint.to_string(),
                "method" => method.to_string()
            )
            .increment(1);
        });
    }

    /// Record one latency sample, in seconds, for a label pair.
    pub fn observe_latency(&self, method: &str, endpoint: &str, duration_seconds: f64) {
        metrics::with_local_recorder(self.recorder.as_ref(), || {
            histogram!(
                METRIC_REQUEST_LATENCY,
                "endpoint" => endpoint.to_string(),
                "method" => method.to_string()
            )
            .record(duration_seconds);
        });
    }

    /// Start timing a request. The returned guard records on drop.
    pub fn start_timer(&self, method: impl Into<String>, endpoint: impl Into<String>) -> RequestTimer {
        RequestTimer {
            metrics: self.clone(),
            method: method.into(),
            endpoint: endpoint.into(),
            start: Instant::now(),
        }
    }

    /// Render all series in the Prometheus text exposition format.
    ///
    /// Output is sorted, so two renders with no observations in between are
    /// identical.
    pub fn render(&self) -> String {
        exposition::canonicalize(&self.handle.render(), FAMILIES)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::with_default_buckets()
    }
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

/// RAII guard for timing one request.
/// Increments the request counter and records latency exactly once when dropped,
/// including when the request future panics or is cancelled.
#[derive(Debug)]
pub struct RequestTimer {
    metrics: Metrics,
    method: String,
    endpoint: String,
    start: Instant,
}

impl RequestTimer {
    /// Elapsed time since the timer started (without recording).
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Method label.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Endpoint label.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed().as_secs_f64();
        self.metrics.increment_counter(&self.method, &self.endpoint);
        self.metrics
            .observe_latency(&self.method, &self.endpoint, elapsed);
    }
}
