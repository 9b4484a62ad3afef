//! Per-line recognition over an ordered list of line regions.
//!
//! Output order always follows region order. With `concurrency > 1` several
//! lines are in flight at once, but a slow line never reorders the document.

use std::sync::Arc;

use futures::{stream, StreamExt, TryStreamExt};
use image::DynamicImage;
use tracing::debug;

use crate::models::{LineRegion, RecognizedLine, StructuredDocument};

use super::backend::{LineRecognizer, OcrError};
use super::region::crop_region;

/// Crops each region and reads it with a `LineRecognizer`.
#[derive(Clone)]
pub struct SequentialRecognizer {
    recognizer: Arc<dyn LineRecognizer>,
    concurrency: usize,
}

impl SequentialRecognizer {
    pub fn new(recognizer: Arc<dyn LineRecognizer>) -> Self {
        Self {
            recognizer,
            concurrency: 1,
        }
    }

    /// Allow up to `concurrency` line recognitions in flight (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Recognize every region of `image` and assemble the document.
    ///
    /// Degenerate regions produce an empty line without invoking the
    /// recognizer. A failing recognition aborts the whole document.
    pub async fn recognize(
        &self,
        image: &DynamicImage,
        regions: &[LineRegion],
    ) -> Result<StructuredDocument, OcrError> {
        // Crops are taken up front so the in-flight futures own their input.
        let crops: Vec<Option<DynamicImage>> = regions
            .iter()
            .enumerate()
            .map(|(index, region)| match region {
                LineRegion::Degenerate => {
                    debug!("Line {} has no extent, leaving it empty", index);
                    None
                }
                LineRegion::Bounded(rect) => crop_region(image, rect),
            })
            .collect();

        // `buffered` yields in submission order regardless of completion order.
        let texts: Vec<String> = stream::iter(crops)
            .map(|crop| {
                let recognizer = Arc::clone(&self.recognizer);
                async move {
                    match crop {
                        Some(crop) => Ok(recognizer.recognize_line(&crop).await?.trim().to_string()),
                        None => Ok::<_, OcrError>(String::new()),
                    }
                }
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let lines = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| RecognizedLine { index, text })
            .collect();

        debug!(
            "Recognized {} line(s) with {}",
            regions.len(),
            self.recognizer.backend_id()
        );
        Ok(StructuredDocument::from_lines(lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rect;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Echoes the crop height after a delay that shrinks for taller crops.
    struct HeightEcho {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LineRecognizer for HeightEcho {
        fn backend_id(&self) -> &str {
            "height_echo"
        }

        async fn recognize_line(&self, line: &DynamicImage) -> Result<String, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = 40u64.saturating_sub(line.height() as u64 * 4);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(format!(" h{} ", line.height()))
        }
    }

    struct Failing;

    #[async_trait]
    impl LineRecognizer for Failing {
        fn backend_id(&self) -> &str {
            "failing"
        }

        async fn recognize_line(&self, _line: &DynamicImage) -> Result<String, OcrError> {
            Err(OcrError::OcrFailed("model crashed".to_string()))
        }
    }

    fn region(height: f32) -> LineRegion {
        LineRegion::Bounded(Rect {
            x_min: 0.0,
            y_min: 0.0,
            x_max: 20.0,
            y_max: height,
        })
    }

    fn echo() -> Arc<HeightEcho> {
        Arc::new(HeightEcho {
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_lines_in_region_order() {
        let image = DynamicImage::new_luma8(20, 20);
        let regions = vec![region(2.0), region(5.0), region(9.0)];
        let doc = SequentialRecognizer::new(echo())
            .recognize(&image, &regions)
            .await
            .unwrap();
        assert_eq!(doc.full_text, "h2\nh5\nh9");
        assert_eq!(doc.lines[2].index, 2);
    }

    #[tokio::test]
    async fn test_concurrent_preserves_order() {
        // Later lines finish first.
        let image = DynamicImage::new_luma8(20, 20);
        let regions = vec![region(1.0), region(3.0), region(6.0), region(9.0)];
        let doc = SequentialRecognizer::new(echo())
            .with_concurrency(4)
            .recognize(&image, &regions)
            .await
            .unwrap();
        assert_eq!(doc.full_text, "h1\nh3\nh6\nh9");
    }

    #[tokio::test]
    async fn test_degenerate_regions_skip_recognizer() {
        let image = DynamicImage::new_luma8(20, 20);
        let backend = echo();
        let regions = vec![region(4.0), LineRegion::Degenerate, region(7.0)];
        let doc = SequentialRecognizer::new(backend.clone())
            .recognize(&image, &regions)
            .await
            .unwrap();
        assert_eq!(doc.lines.len(), 3);
        assert_eq!(doc.lines[1].text, "");
        assert_eq!(doc.full_text, "h4\n\nh7");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_regions_empty_document() {
        let image = DynamicImage::new_luma8(20, 20);
        let doc = SequentialRecognizer::new(echo())
            .recognize(&image, &[])
            .await
            .unwrap();
        assert!(doc.lines.is_empty());
        assert_eq!(doc.full_text, "");
    }

    #[tokio::test]
    async fn test_failure_aborts_document() {
        let image = DynamicImage::new_luma8(20, 20);
        let result = SequentialRecognizer::new(Arc::new(Failing))
            .recognize(&image, &[region(5.0)])
            .await;
        assert!(matches!(result, Err(OcrError::OcrFailed(_))));
    }

    #[test]
    fn test_concurrency_floor() {
        let recognizer = SequentialRecognizer::new(Arc::new(Failing)).with_concurrency(0);
        assert_eq!(recognizer.concurrency(), 1);
    }
}
