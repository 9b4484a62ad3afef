//! OCR backend abstraction.
//!
//! Two external collaborators feed the line pipeline:
//! - `TextDetector`: word/fragment-level boxes for a whole page image
//! - `LineRecognizer`: text for one cropped line image
//!
//! Backends are built once at startup and shared read-only (`Arc<dyn ...>`)
//! across requests.

use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::DetectionBox;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Which kind of text the page holds, selecting the recognition path.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum RecognitionMode {
    /// Machine-printed text: detector readings are used directly.
    #[serde(rename = "ocr")]
    #[value(name = "ocr", alias = "printed")]
    Printed,
    /// Handwriting: lines are cropped and re-read by the line recognizer.
    #[default]
    #[serde(rename = "htr")]
    #[value(name = "htr", alias = "handwritten")]
    Handwritten,
}

impl RecognitionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecognitionMode::Printed => "ocr",
            RecognitionMode::Handwritten => "htr",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ocr" | "printed" => Some(RecognitionMode::Printed),
            "htr" | "handwritten" => Some(RecognitionMode::Handwritten),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecognitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Page-level text detector.
#[async_trait]
pub trait TextDetector: Send + Sync {
    /// Human-readable backend identifier.
    fn backend_id(&self) -> &str;

    /// Check if this backend is available (binaries installed, models present).
    fn is_available(&self) -> bool {
        true
    }

    /// Description of what's needed to make this backend available.
    fn availability_hint(&self) -> String {
        String::new()
    }

    /// Detect text fragments in `image`, in no particular order.
    async fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectionBox>, OcrError>;
}

/// Single-line text recognizer.
#[async_trait]
pub trait LineRecognizer: Send + Sync {
    /// Human-readable backend identifier.
    fn backend_id(&self) -> &str;

    /// Check if this backend is available.
    fn is_available(&self) -> bool {
        true
    }

    /// Description of what's needed to make this backend available.
    fn availability_hint(&self) -> String {
        String::new()
    }

    /// Read the text of one cropped line image.
    async fn recognize_line(&self, line: &DynamicImage) -> Result<String, OcrError>;
}

/// Configuration for OCR backends and line segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language code(s), e.g. "rus" or "rus+eng".
    pub language: String,
    /// Tesseract binary name or path.
    pub tesseract_path: String,
    /// Maximum vertical-center distance for a box to join the current line.
    pub line_tolerance: f32,
    /// Line recognitions allowed in flight at once (1 = strictly sequential).
    pub concurrency: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "rus".to_string(),
            tesseract_path: "tesseract".to_string(),
            line_tolerance: super::line_grouping::DEFAULT_LINE_TOLERANCE,
            concurrency: 1,
        }
    }
}

impl OcrConfig {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
