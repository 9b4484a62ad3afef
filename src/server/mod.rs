//! Web server exposing the document pipeline as a JSON API.
//!
//! Routes:
//! - `GET  /api/health`   liveness probe
//! - `POST /api/annotate` annotate JSON `{text, translate?}`
//! - `POST /api/process`  multipart image upload, recognized and annotated

mod handlers;
mod routes;

pub use handlers::{AnnotateRequest, ErrorBody, HealthResponse};
pub use routes::create_router;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::pipeline::DocumentPipeline;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DocumentPipeline>,
    /// Where uploads are written, one fresh file name per request.
    pub uploads_dir: PathBuf,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let pipeline = DocumentPipeline::from_config(config)?;
        Ok(Self {
            pipeline: Arc::new(pipeline),
            uploads_dir: config.uploads_dir(),
            request_timeout: config.server.request_timeout(),
            max_upload_bytes: config.server.max_upload_bytes,
        })
    }
}

/// Start the web server.
pub async fn serve(config: &Config, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(config)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
