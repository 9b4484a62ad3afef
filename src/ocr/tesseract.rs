//! Tesseract OCR backend implementation.
//!
//! Drives the `tesseract` command-line tool for both collaborators:
//! word detection through its TSV output, and single-line recognition
//! with page segmentation mode 7 ("treat the image as a single text line").

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use image::DynamicImage;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

use super::backend::{LineRecognizer, OcrConfig, OcrError, TextDetector};
use super::model_utils::check_binary;
use crate::models::DetectionBox;

/// TSV row level for individual words.
const WORD_LEVEL: &str = "5";

/// Tesseract OCR backend.
pub struct TesseractBackend {
    config: OcrConfig,
}

impl TesseractBackend {
    /// Create a new Tesseract backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: OcrConfig::default(),
        }
    }

    /// Create a new Tesseract backend with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Write `image` to a temporary PNG that lives as long as the returned dir.
    fn stage_image(&self, image: &DynamicImage) -> Result<(TempDir, PathBuf), OcrError> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("input.png");
        image.save(&path)?;
        Ok((temp_dir, path))
    }

    /// Run Tesseract on an image file with extra trailing arguments.
    async fn run_tesseract(&self, image_path: &Path, extra: &[&str]) -> Result<String, OcrError> {
        let start = Instant::now();
        let output = Command::new(&self.config.tesseract_path)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.config.language])
            .args(extra)
            .output()
            .await;

        match output {
            Ok(output) => {
                if output.status.success() {
                    debug!(
                        "tesseract {:?} finished in {}ms",
                        extra,
                        start.elapsed().as_millis()
                    );
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!("tesseract failed: {}", stderr)))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::BackendNotAvailable(format!(
                    "{} not found (install tesseract-ocr)",
                    self.config.tesseract_path
                )))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse Tesseract TSV output into word boxes.
///
/// Only word-level rows with non-empty text and a non-negative confidence
/// are kept. Confidence is rescaled from 0-100 to 0-1.
pub fn parse_tsv_words(tsv: &str) -> Vec<DetectionBox> {
    tsv.lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.splitn(12, '\t').collect();
            if cols.len() < 12 || cols[0] != WORD_LEVEL {
                return None;
            }
            let text = cols[11].trim();
            let conf: f32 = cols[10].trim().parse().ok()?;
            if text.is_empty() || conf < 0.0 {
                return None;
            }
            let left: f32 = cols[6].parse().ok()?;
            let top: f32 = cols[7].parse().ok()?;
            let width: f32 = cols[8].parse().ok()?;
            let height: f32 = cols[9].parse().ok()?;
            Some(DetectionBox::from_rect(
                left,
                top,
                width,
                height,
                text,
                conf / 100.0,
            ))
        })
        .collect()
}

#[async_trait]
impl TextDetector for TesseractBackend {
    fn backend_id(&self) -> &str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        check_binary(&self.config.tesseract_path)
    }

    fn availability_hint(&self) -> String {
        if !check_binary(&self.config.tesseract_path) {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        } else {
            "Tesseract is available".to_string()
        }
    }

    async fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectionBox>, OcrError> {
        let (_guard, path) = self.stage_image(image)?;
        let tsv = self.run_tesseract(&path, &["tsv"]).await?;
        let boxes = parse_tsv_words(&tsv);
        debug!("tesseract detected {} word box(es)", boxes.len());
        Ok(boxes)
    }
}

#[async_trait]
impl LineRecognizer for TesseractBackend {
    fn backend_id(&self) -> &str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        check_binary(&self.config.tesseract_path)
    }

    fn availability_hint(&self) -> String {
        TextDetector::availability_hint(self)
    }

    async fn recognize_line(&self, line: &DynamicImage) -> Result<String, OcrError> {
        let (_guard, path) = self.stage_image(line)?;
        let text = self.run_tesseract(&path, &["--psm", "7"]).await?;
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t
4\t1\t1\t1\t1\t0\t10\t10\t300\t22\t-1\t
5\t1\t1\t1\t1\t1\t10\t10\t120\t20\t96.5\tПривет
5\t1\t1\t1\t1\t2\t140\t12\t80\t20\t91\tмир
5\t1\t1\t1\t1\t3\t230\t12\t10\t20\t95\t
5\t1\t1\t1\t1\t4\t250\t12\t10\t20\t-1\tnoise";

    #[test]
    fn test_parse_tsv_words() {
        let boxes = parse_tsv_words(TSV);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].text, "Привет");
        assert_eq!(boxes[0].min_x(), 10.0);
        assert_eq!(boxes[0].max_y(), 30.0);
        assert!((boxes[0].confidence - 0.965).abs() < 1e-6);
        assert_eq!(boxes[1].text, "мир");
    }

    #[test]
    fn test_parse_tsv_garbage() {
        assert!(parse_tsv_words("").is_empty());
        assert!(parse_tsv_words("header\n5\tnot\tenough").is_empty());
    }

    #[tokio::test]
    async fn test_missing_binary_reports_unavailable() {
        let backend = TesseractBackend::with_config(OcrConfig {
            tesseract_path: "archivum-no-such-tesseract".to_string(),
            ..OcrConfig::default()
        });
        assert!(!TextDetector::is_available(&backend));

        let image = DynamicImage::new_luma8(8, 8);
        let err = backend.detect(&image).await.unwrap_err();
        assert!(matches!(err, OcrError::BackendNotAvailable(_)));
    }
}
