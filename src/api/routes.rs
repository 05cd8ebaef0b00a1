//! HTTP API route definitions.

use axum::{middleware, routing::get, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::docs::docs_router;
use super::handlers::{health, metrics, AppState};
use super::middleware::track_requests;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/metrics", get(metrics))
        .merge(docs_router());

    instrument(routes, state)
}

/// Wrap routes with CORS, tracing, panic recovery and request metrics.
///
/// Layers are added innermost first. The metrics middleware sits inside the
/// panic catcher so a panicking handler is recorded before it becomes a 500.
/// `CorsLayer` needs a `Default` inner body, so every layer gets its own
/// `layer` call rather than one stacked service.
pub fn instrument(routes: Router<AppState>, state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = create_router(AppState::default());

        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_endpoint_returns_ok() {
        let app = create_router(AppState::default());

        let response = app
            .oneshot(Request::builder().uri("/api/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn instrumented_router_applies_cors_and_records() {
        let state = AppState::default();
        let app = create_router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("origin", "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert!(state
            .metrics
            .render()
            .contains(r#"app_requests_total{endpoint="/api/health",method="GET"} 1.0"#));
    }

    #[tokio::test]
    async fn unknown_path_returns_404() {
        let app = create_router(AppState::default());

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
