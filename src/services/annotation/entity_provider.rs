//! Entity spans from an `EntityRecognizer`, exposed as a `SpanProvider`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::Span;

use super::ner::{EntityRecognizer, RawEntity};
use super::provider::SpanProvider;
use super::types::{AnnotationError, OffsetUnit};

/// Normalizes tagger output into byte-offset spans with lower-case labels.
///
/// The tagger is called once per text. Ranges that fall outside the text or
/// split a character are reported as `InvalidSpan` rather than clamped.
#[derive(Clone)]
pub struct EntitySpanProvider {
    backend: Arc<dyn EntityRecognizer>,
}

impl EntitySpanProvider {
    pub fn new(backend: Arc<dyn EntityRecognizer>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &dyn EntityRecognizer {
        self.backend.as_ref()
    }
}

#[async_trait]
impl SpanProvider for EntitySpanProvider {
    fn provider_id(&self) -> &str {
        self.backend.backend_id()
    }

    async fn spans(&self, text: &str) -> Result<Vec<Span>, AnnotationError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let raw = self.backend.recognize(text).await?;
        let mut spans = normalize_entities(text, raw, self.backend.offset_unit())?;
        spans.sort_by_key(|s| s.start);

        tracing::debug!(
            "Entity backend {} returned {} span(s)",
            self.backend.backend_id(),
            spans.len()
        );
        Ok(spans)
    }
}

/// Convert raw entities to validated byte-offset spans.
pub fn normalize_entities(
    text: &str,
    raw: Vec<RawEntity>,
    unit: OffsetUnit,
) -> Result<Vec<Span>, AnnotationError> {
    let char_offsets = match unit {
        OffsetUnit::Bytes => None,
        OffsetUnit::Chars => Some(char_byte_offsets(text)),
    };

    raw.into_iter()
        .map(|entity| {
            let label = entity.label.to_lowercase();
            let span = match &char_offsets {
                None => Span::new(entity.start, entity.end, label),
                Some(table) => {
                    let to_byte = |c: usize| table.get(c).copied();
                    match (to_byte(entity.start), to_byte(entity.end)) {
                        (Some(start), Some(end)) => Span::new(start, end, label),
                        _ => {
                            return Err(AnnotationError::InvalidSpan {
                                start: entity.start,
                                end: entity.end,
                                len: text.len(),
                                reason: "character offset past end of text",
                            })
                        }
                    }
                }
            };
            span.validate(text)
                .map_err(|v| AnnotationError::invalid_span(&span, text, v))?;
            Ok(span)
        })
        .collect()
}

/// Byte offset of every character start, plus `text.len()` as the final entry.
fn char_byte_offsets(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect()
}
