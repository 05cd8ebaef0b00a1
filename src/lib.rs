//! cy-weather API service.
//!
//! A small HTTP service exposing a health check, Prometheus metrics and
//! generated API documentation. Every routed request is counted and timed:
//!
//! ```text
//! app_requests_total{endpoint="/api/health",method="GET"} 3
//! request_latency_seconds_count{endpoint="/api/health",method="GET"} 3
//! request_latency_seconds_sum{endpoint="/api/health",method="GET"} 0.000412
//! ```
//!
//! The `endpoint` label is the matched route template, not the raw path, so
//! path parameters do not grow label cardinality.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`metrics`]: Request metrics registry and timing guard
//! - [`exposition`]: Deterministic Prometheus text rendering
//! - [`api`]: HTTP routes, handlers, middleware and docs
//! - [`server`]: HTTP server startup
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod exposition;
pub mod metrics;
pub mod server;
pub mod utils;

pub use crate::config::Config;
pub use crate::error::{Result, ServiceError};
pub use crate::metrics::Metrics;
