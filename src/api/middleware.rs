//! Request metrics middleware.
//!
//! Every routed request increments `app_requests_total` and records its
//! latency in `request_latency_seconds`, labelled by method and the matched
//! route template. Recording happens when the [`RequestTimer`] guard drops, so
//! error responses, handler panics and cancelled requests are counted too.
//!
//! [`RequestTimer`]: crate::metrics::RequestTimer

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::handlers::AppState;

/// Endpoint label for requests that matched no route.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Route template for the request, never the raw path.
fn endpoint_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_ENDPOINT.to_owned())
}

/// Middleware that counts and times every request.
pub async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let timer = state
        .metrics
        .start_timer(request.method().as_str(), endpoint_label(&request));

    let response = next.run(request).await;

    debug!(
        method = timer.method(),
        endpoint = timer.endpoint(),
        status = response.status().as_u16(),
        elapsed_ms = timer.elapsed().as_secs_f64() * 1000.0,
        "Request completed"
    );

    response
}
