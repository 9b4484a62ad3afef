//! HTTP request handlers for the web server.

mod api;
mod helpers;
mod process;

// Re-export handlers for use by the router
pub use api::{api_annotate, api_health, AnnotateRequest, HealthResponse};
pub use helpers::{ApiError, ErrorBody};
pub use process::api_process;
