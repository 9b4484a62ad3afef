//! End-to-end pipeline tests with in-process stand-ins for the external
//! detector, line recognizer and entity tagger.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use archivum::models::{DetectionBox, EntityLabel, Point, Segment};
use archivum::ocr::{LineRecognizer, OcrError, RecognitionMode, TextDetector};
use archivum::services::annotation::{
    AnnotationError, EntityRecognizer, NoEntities, OffsetUnit, RawEntity,
};
use archivum::{DocumentPipeline, PipelineError};
use async_trait::async_trait;
use image::{DynamicImage, GenericImageView};

/// Detector returning a fixed set of boxes.
struct FixedDetector(Vec<DetectionBox>);

#[async_trait]
impl TextDetector for FixedDetector {
    fn backend_id(&self) -> &str {
        "fixed"
    }

    async fn detect(&self, _image: &DynamicImage) -> Result<Vec<DetectionBox>, OcrError> {
        Ok(self.0.clone())
    }
}

/// Reads a line by reporting the crop's vertical position, which it recovers
/// from a marker pixel row painted into the test image. Calls near the top of
/// the page are slowest, so completion order is the reverse of line order.
struct RowReader {
    calls: AtomicUsize,
}

#[async_trait]
impl LineRecognizer for RowReader {
    fn backend_id(&self) -> &str {
        "row_reader"
    }

    async fn recognize_line(&self, line: &DynamicImage) -> Result<String, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let marker = line.get_pixel(0, 0)[0] as u64;
        tokio::time::sleep(Duration::from_millis(60u64.saturating_sub(marker / 4))).await;
        Ok(format!("строка {}", marker))
    }
}

/// Tagger reporting character offsets, like most remote services.
struct CharTagger(Vec<(&'static str, &'static str)>);

#[async_trait]
impl EntityRecognizer for CharTagger {
    fn backend_id(&self) -> &str {
        "char_tagger"
    }

    fn offset_unit(&self) -> OffsetUnit {
        OffsetUnit::Chars
    }

    async fn recognize(&self, text: &str) -> Result<Vec<RawEntity>, AnnotationError> {
        let mut found = Vec::new();
        for (term, label) in &self.0 {
            if let Some(byte) = text.find(term) {
                let start = text[..byte].chars().count();
                found.push(RawEntity {
                    start,
                    end: start + term.chars().count(),
                    label: label.to_string(),
                });
            }
        }
        Ok(found)
    }
}

struct BrokenTagger;

#[async_trait]
impl EntityRecognizer for BrokenTagger {
    fn backend_id(&self) -> &str {
        "broken"
    }

    async fn recognize(&self, _text: &str) -> Result<Vec<RawEntity>, AnnotationError> {
        Ok(vec![RawEntity {
            start: 0,
            end: 10_000,
            label: "per".to_string(),
        }])
    }
}

fn word(x: f32, y: f32, text: &str) -> DetectionBox {
    DetectionBox::from_rect(x, y, 30.0, 16.0, text, 0.9)
}

/// 200x200 grayscale page where each row's value equals its y coordinate.
fn page() -> DynamicImage {
    let mut img = image::GrayImage::new(200, 200);
    for (_, y, pixel) in img.enumerate_pixels_mut() {
        pixel.0 = [y as u8];
    }
    DynamicImage::ImageLuma8(img)
}

fn reader() -> Arc<RowReader> {
    Arc::new(RowReader {
        calls: AtomicUsize::new(0),
    })
}

#[tokio::test]
async fn test_structure_document_orders_lines_top_to_bottom() {
    // Shuffled detector output across three visual lines.
    let boxes = vec![
        word(100.0, 120.0, "c2"),
        word(0.0, 20.0, "a1"),
        word(0.0, 122.0, "c1"),
        word(50.0, 70.0, "b1"),
        word(60.0, 24.0, "a2"),
    ];
    let recognizer = reader();
    let pipeline = DocumentPipeline::new(
        Arc::new(FixedDetector(boxes)),
        recognizer.clone(),
        Arc::new(NoEntities),
    )
    .with_concurrency(3);

    let doc = pipeline.structure_document(&page()).await.unwrap();

    let indices: Vec<usize> = doc.lines.iter().map(|l| l.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(doc.full_text, "строка 20\nстрока 70\nстрока 120");
    assert_eq!(recognizer.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_degenerate_line_keeps_its_slot() {
    let flat = DetectionBox::new(
        [
            Point::new(10.0, 80.0),
            Point::new(10.0, 80.0),
            Point::new(10.0, 96.0),
            Point::new(10.0, 96.0),
        ],
        "flat",
        0.1,
    );
    let boxes = vec![word(0.0, 20.0, "top"), flat, word(0.0, 150.0, "bottom")];
    let recognizer = reader();
    let pipeline = DocumentPipeline::new(
        Arc::new(FixedDetector(boxes)),
        recognizer.clone(),
        Arc::new(NoEntities),
    );

    let doc = pipeline.structure_document(&page()).await.unwrap();

    assert_eq!(doc.lines.len(), 3);
    assert_eq!(doc.lines[1].index, 1);
    assert_eq!(doc.lines[1].text, "");
    assert_eq!(doc.full_text, "строка 20\n\nстрока 150");
    assert_eq!(recognizer.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_no_detections_empty_document() {
    let recognizer = reader();
    let pipeline = DocumentPipeline::new(
        Arc::new(FixedDetector(Vec::new())),
        recognizer.clone(),
        Arc::new(NoEntities),
    );

    let doc = pipeline.structure_document(&page()).await.unwrap();
    assert!(doc.lines.is_empty());
    assert_eq!(doc.full_text, "");
    assert_eq!(recognizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_annotate_round_trip_with_multibyte_text() {
    let pipeline = DocumentPipeline::new(
        Arc::new(FixedDetector(Vec::new())),
        reader(),
        Arc::new(CharTagger(vec![("Пётр Ильич", "PER"), ("Воткинске", "LOC")])),
    );
    let text = "Пётр Ильич родился 07.05.1840 в Воткинске; в 1850-х годах — Петербург.";

    let segments = pipeline.annotate(text).await.unwrap();

    let rebuilt: String = segments.iter().map(Segment::text).collect();
    assert_eq!(rebuilt, text);

    let labeled: Vec<(&str, &EntityLabel)> = segments
        .iter()
        .filter_map(|s| s.label().map(|l| (s.text(), l)))
        .collect();
    assert_eq!(
        labeled,
        vec![
            ("Пётр Ильич", &EntityLabel::Person),
            ("07.05.1840", &EntityLabel::Date),
            ("Воткинске", &EntityLabel::Location),
            ("в 1850-х годах", &EntityLabel::Date),
        ]
    );
}

#[tokio::test]
async fn test_entity_wins_over_overlapping_date() {
    // The tagger claims "Москва 1147" as an organization; the year pattern
    // "1147 год" starts inside it and is dropped whole.
    let pipeline = DocumentPipeline::new(
        Arc::new(FixedDetector(Vec::new())),
        reader(),
        Arc::new(CharTagger(vec![("Москва 1147", "ORG")])),
    );

    let segments = pipeline.annotate("Москва 1147 год").await.unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].label(), Some(&EntityLabel::Organization));
    assert_eq!(segments[1].text(), " год");
    assert_eq!(segments[1].label(), None);
}

#[tokio::test]
async fn test_out_of_bounds_entity_is_fatal() {
    let pipeline = DocumentPipeline::new(
        Arc::new(FixedDetector(Vec::new())),
        reader(),
        Arc::new(BrokenTagger),
    );

    let err = pipeline.annotate("короткий текст").await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Annotation(AnnotationError::InvalidSpan { .. })
    ));
}

#[tokio::test]
async fn test_empty_text_no_segments() {
    let pipeline = DocumentPipeline::new(
        Arc::new(FixedDetector(Vec::new())),
        reader(),
        Arc::new(BrokenTagger),
    );
    assert!(pipeline.annotate("").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_process_printed_mode() {
    let boxes = vec![word(40.0, 20.0, "1861"), word(0.0, 20.0, "Тверь,")];
    let pipeline = DocumentPipeline::new(
        Arc::new(FixedDetector(boxes)),
        reader(),
        Arc::new(CharTagger(vec![("Тверь", "loc")])),
    );

    let doc = pipeline
        .process(&page(), RecognitionMode::Printed, false)
        .await
        .unwrap();

    assert_eq!(doc.text, "1861 Тверь,");
    assert_eq!(doc.lines.len(), 1);
    assert_eq!(doc.lines[0].text, "Тверь, 1861");
    assert_eq!(doc.annotated_html, "1861 <mark class=\"ner-loc\">Тверь</mark>,");
}
