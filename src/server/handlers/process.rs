//! Image upload processing handler.

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;
use tracing::{debug, info};

use super::super::AppState;
use super::helpers::{parse_flag, ApiError};
use crate::models::ProcessedDocument;
use crate::ocr::RecognitionMode;
use crate::pipeline::with_timeout;

/// Fields collected from the multipart form.
#[derive(Default)]
struct ProcessForm {
    image: Option<(String, Bytes)>,
    text_type: Option<String>,
    translate: bool,
}

async fn read_form(mut multipart: Multipart) -> Result<ProcessForm, ApiError> {
    let mut form = ProcessForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed form data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
                form.image = Some((filename, data));
            }
            "text_type" | "translate" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Bad form field: {}", e)))?;
                if name == "text_type" {
                    form.text_type = Some(value);
                } else {
                    form.translate = parse_flag(&value);
                }
            }
            other => debug!("Ignoring form field {:?}", other),
        }
    }
    Ok(form)
}

/// Unique path under `dir` keeping the upload's extension.
fn upload_path(dir: &Path, filename: &str) -> PathBuf {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();
    dir.join(format!("{}{}", uuid::Uuid::new_v4(), ext))
}

/// API: recognize an uploaded image and annotate its text.
pub async fn api_process(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ProcessedDocument>, ApiError> {
    let form = read_form(multipart).await?;

    let (Some((filename, data)), Some(text_type)) = (form.image, form.text_type) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };
    if filename.trim().is_empty() {
        return Err(ApiError::bad_request("No file selected"));
    }
    let mode = RecognitionMode::from_str(text_type.trim())
        .ok_or_else(|| ApiError::bad_request("Invalid text_type"))?;

    let image = image::load_from_memory(&data)
        .map_err(|e| ApiError::bad_request(format!("Unreadable image: {}", e)))?;

    let path = upload_path(&state.uploads_dir, &filename);
    tokio::fs::create_dir_all(&state.uploads_dir)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to prepare uploads: {}", e)))?;
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to save upload: {}", e)))?;
    info!("Saved upload {:?} as {}", filename, path.display());

    let doc = with_timeout(
        state.request_timeout,
        state.pipeline.process(&image, mode, form.translate),
    )
    .await?;
    Ok(Json(doc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_paths_are_unique() {
        let dir = Path::new("/tmp/uploads");
        let a = upload_path(dir, "scan.PNG");
        let b = upload_path(dir, "scan.PNG");
        assert_ne!(a, b);
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("png"));
        assert!(a.starts_with(dir));
    }

    #[test]
    fn test_upload_path_without_extension() {
        let path = upload_path(Path::new("up"), "../../etc/passwd");
        assert!(path.extension().is_none());
        assert_eq!(path.parent(), Some(Path::new("up")));
    }
}
