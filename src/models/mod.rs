//! Data models for archivum.

mod document;
mod geometry;
mod span;

pub use document::{AnnotatedText, ProcessedDocument, RecognizedLine, StructuredDocument};
pub use geometry::{DetectionBox, LineCluster, LineRegion, Point, Rect};
pub use span::{EntityLabel, MergedSpans, Segment, Span, SpanViolation};
