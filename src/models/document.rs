//! Structured output of the recognition pipeline.

use serde::{Deserialize, Serialize};

use super::span::Segment;

/// One recognized line in reading order.
///
/// `index` is kept for degenerate lines too, so the number of lines always
/// equals the number of line clusters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedLine {
    pub index: usize,
    pub text: String,
}

/// Result of `structure_document`: ordered lines plus their newline-joined text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDocument {
    pub lines: Vec<RecognizedLine>,
    pub full_text: String,
}

impl StructuredDocument {
    pub fn from_lines(lines: Vec<RecognizedLine>) -> Self {
        let full_text = lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self { lines, full_text }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Annotated text: segments over `text` and their HTML rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedText {
    /// Text the annotations refer to (after transliteration, if requested).
    pub text: String,
    pub segments: Vec<Segment>,
    #[serde(rename = "annotated_text")]
    pub annotated_html: String,
}

/// End-to-end result for one uploaded image.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    /// Text the annotations refer to (after transliteration, if requested).
    pub text: String,
    pub lines: Vec<RecognizedLine>,
    pub segments: Vec<Segment>,
    #[serde(rename = "annotated_text")]
    pub annotated_html: String,
}

impl ProcessedDocument {
    pub fn new(lines: Vec<RecognizedLine>, annotated: AnnotatedText) -> Self {
        Self {
            text: annotated.text,
            lines,
            segments: annotated.segments,
            annotated_html: annotated.annotated_html,
        }
    }
}
