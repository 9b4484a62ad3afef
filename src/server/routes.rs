//! Router configuration for the web server.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let max_body = state.max_upload_bytes;
    Router::new()
        .route("/api/health", get(handlers::api_health))
        .route("/api/annotate", post(handlers::api_annotate))
        .route("/api/process", post(handlers::api_process))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
