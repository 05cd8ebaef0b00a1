//! OpenAPI document and documentation UIs.

use axum::Router;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{self, AppState, HealthResponse};
use crate::error::Result;

/// Path of the generated OpenAPI document.
pub const OPENAPI_PATH: &str = "/api/openapi.json";
/// Swagger UI mount point.
pub const SWAGGER_PATH: &str = "/api/docs";
/// ReDoc mount point.
pub const REDOC_PATH: &str = "/docs";

/// OpenAPI description of the service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "cy-weather API",
        description = "Health check and Prometheus metrics for the cy-weather service"
    ),
    paths(handlers::health, handlers::metrics),
    components(schemas(HealthResponse)),
    tags(
        (name = "health", description = "Liveness check"),
        (name = "metrics", description = "Prometheus scraping")
    )
)]
pub struct ApiDoc;

/// The OpenAPI document as pretty-printed JSON.
pub fn openapi_json() -> Result<String> {
    Ok(ApiDoc::openapi().to_pretty_json()?)
}

/// Routes serving the OpenAPI document, Swagger UI and ReDoc.
pub fn docs_router() -> Router<AppState> {
    Router::new()
        .merge(SwaggerUi::new(SWAGGER_PATH).url(OPENAPI_PATH, ApiDoc::openapi()))
        .merge(Redoc::with_url(REDOC_PATH, ApiDoc::openapi()))
}
