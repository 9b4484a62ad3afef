//! JSON API handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::super::AppState;
use super::helpers::ApiError;
use crate::models::AnnotatedText;
use crate::pipeline::with_timeout;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Body of `POST /api/annotate`.
#[derive(Debug, Deserialize)]
pub struct AnnotateRequest {
    pub text: String,
    #[serde(default)]
    pub translate: bool,
}

/// API: liveness probe.
pub async fn api_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// API: annotate raw text.
pub async fn api_annotate(
    State(state): State<AppState>,
    Json(request): Json<AnnotateRequest>,
) -> Result<Json<AnnotatedText>, ApiError> {
    let annotated = with_timeout(
        state.request_timeout,
        state.pipeline.annotate_text(&request.text, request.translate),
    )
    .await?;
    Ok(Json(annotated))
}
