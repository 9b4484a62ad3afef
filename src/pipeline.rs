//! End-to-end document pipeline.
//!
//! Wires the OCR collaborators and span providers together behind two
//! entry points, `structure_document` (image to ordered lines) and
//! `annotate` (text to labeled segments), plus `process` which chains them
//! the way the HTTP API and CLI use them.
//!
//! A pipeline holds only shared, read-only handles and is cheap to clone.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::models::{
    AnnotatedText, LineCluster, ProcessedDocument, RecognizedLine, Segment, StructuredDocument,
};
use crate::ocr::{
    LineClusterer, LineRecognizer, LineRegionReducer, OcrError, RecognitionMode,
    SequentialRecognizer, TesseractBackend, TextDetector,
};
use crate::services::annotation::{
    render_html, render_segments, AnnotationError, DateSpanProvider, EntityRecognizer,
    EntitySpanProvider, SpanMerger, SpanProvider, Transliterator,
};

/// Errors from a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    #[error("Processing timed out after {0:?}")]
    Timeout(Duration),
}

/// Run `fut`, failing with `PipelineError::Timeout` once `limit` elapses.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, PipelineError>
where
    F: Future<Output = Result<T, PipelineError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| PipelineError::Timeout(limit))?
}

#[derive(Clone)]
pub struct DocumentPipeline {
    detector: Arc<dyn TextDetector>,
    recognizer: SequentialRecognizer,
    clusterer: LineClusterer,
    reducer: LineRegionReducer,
    /// Span providers in priority order: entities first, then patterns.
    providers: Vec<Arc<dyn SpanProvider>>,
    merger: SpanMerger,
    transliterator: Transliterator,
}

impl DocumentPipeline {
    pub fn new(
        detector: Arc<dyn TextDetector>,
        line_recognizer: Arc<dyn LineRecognizer>,
        entities: Arc<dyn EntityRecognizer>,
    ) -> Self {
        Self {
            detector,
            recognizer: SequentialRecognizer::new(line_recognizer),
            clusterer: LineClusterer::default(),
            reducer: LineRegionReducer::new(),
            providers: vec![
                Arc::new(EntitySpanProvider::new(entities)),
                Arc::new(DateSpanProvider::new()),
            ],
            merger: SpanMerger::new(),
            transliterator: Transliterator::new(),
        }
    }

    /// Build the pipeline described by `config`, with Tesseract serving as
    /// both detector and line recognizer.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let tesseract = Arc::new(TesseractBackend::with_config(config.ocr.clone()));
        let entities = config.ner.build_recognizer()?;
        Ok(Self::new(tesseract.clone(), tesseract, entities)
            .with_tolerance(config.ocr.line_tolerance)
            .with_concurrency(config.ocr.concurrency))
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.clusterer = LineClusterer::new(tolerance);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.recognizer = self.recognizer.with_concurrency(concurrency);
        self
    }

    async fn detect_lines(&self, image: &DynamicImage) -> Result<Vec<LineCluster>, PipelineError> {
        let boxes = self.detector.detect(image).await?;
        debug!(
            "{} returned {} detection(s)",
            self.detector.backend_id(),
            boxes.len()
        );
        Ok(self.clusterer.cluster(boxes))
    }

    /// Handwriting path: detect, cluster, reduce, then read each line crop.
    ///
    /// No detections yields an empty document.
    pub async fn structure_document(
        &self,
        image: &DynamicImage,
    ) -> Result<StructuredDocument, PipelineError> {
        let clusters = self.detect_lines(image).await?;
        let regions: Vec<_> = clusters.iter().map(|c| self.reducer.reduce(c)).collect();

        let doc = self.recognizer.recognize(image, &regions).await?;
        info!("Structured document: {} line(s)", doc.lines.len());
        Ok(doc)
    }

    /// Printed-text path: the detector's own readings, no line recognizer.
    ///
    /// `full_text` keeps detector order joined by spaces; `lines` groups the
    /// same fragments into visual lines read left to right.
    pub async fn read_printed(
        &self,
        image: &DynamicImage,
    ) -> Result<StructuredDocument, PipelineError> {
        let boxes = self.detector.detect(image).await?;
        let full_text = boxes
            .iter()
            .map(|b| b.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let lines: Vec<RecognizedLine> = self
            .clusterer
            .cluster(boxes)
            .iter()
            .enumerate()
            .map(|(index, cluster)| RecognizedLine {
                index,
                text: cluster.text(),
            })
            .collect();

        info!("Read printed document: {} line(s)", lines.len());
        Ok(StructuredDocument { lines, full_text })
    }

    /// Labeled segments over `text`, entity spans taking priority over dates.
    ///
    /// Empty text yields no segments.
    pub async fn annotate(&self, text: &str) -> Result<Vec<Segment>, PipelineError> {
        let mut sources = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            sources.push(provider.spans(text).await?);
        }
        let merged = self.merger.merge(text, &sources)?;
        debug!("Merged spans: {} kept", merged.len());
        Ok(render_segments(text, &merged))
    }

    /// Optionally transliterate, then annotate and render markup.
    pub async fn annotate_text(
        &self,
        text: &str,
        translate: bool,
    ) -> Result<AnnotatedText, PipelineError> {
        let text = if translate {
            self.transliterator.transliterate(text)
        } else {
            text.to_string()
        };

        let segments = self.annotate(&text).await?;
        let annotated_html = render_html(&segments);
        Ok(AnnotatedText {
            text,
            segments,
            annotated_html,
        })
    }

    /// Recognize `image` in `mode` and annotate the result.
    pub async fn process(
        &self,
        image: &DynamicImage,
        mode: RecognitionMode,
        translate: bool,
    ) -> Result<ProcessedDocument, PipelineError> {
        let doc = match mode {
            RecognitionMode::Printed => self.read_printed(image).await?,
            RecognitionMode::Handwritten => self.structure_document(image).await?,
        };

        let annotated = self.annotate_text(&doc.full_text, translate).await?;
        info!(
            "Processed {} document: {} segment(s)",
            mode,
            annotated.segments.len()
        );
        Ok(ProcessedDocument::new(doc.lines, annotated))
    }
}
