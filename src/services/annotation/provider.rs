//! Shared abstraction for span sources.

use async_trait::async_trait;

use crate::models::Span;

use super::types::AnnotationError;

/// A source of labeled spans over a text buffer.
///
/// Implementations wrap one detection strategy (date patterns, an entity
/// tagger) and expose it uniformly so `SpanMerger` can combine them. Spans
/// from a single provider come back sorted by `start` but may overlap.
#[async_trait]
pub trait SpanProvider: Send + Sync {
    /// Short identifier used in logs.
    fn provider_id(&self) -> &str;

    /// Produce spans for `text`.
    async fn spans(&self, text: &str) -> Result<Vec<Span>, AnnotationError>;
}
