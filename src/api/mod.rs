//! HTTP API module for health, metrics, and documentation endpoints.

pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use docs::ApiDoc;
pub use handlers::AppState;
pub use routes::{create_router, instrument};
