//! Overlap resolution across span providers.
//!
//! All spans are concatenated in provider order, stable-sorted by start and
//! swept left to right. A span that starts before the end of the last
//! accepted span is dropped whole: the earliest start wins, and on equal
//! starts the earlier provider wins.

use tracing::debug;

use crate::models::{MergedSpans, Span};

use super::types::AnnotationError;

/// Merges span sequences into one sorted, disjoint sequence.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpanMerger;

impl SpanMerger {
    pub fn new() -> Self {
        Self
    }

    /// Merge `sources` (highest priority first) over `text`.
    ///
    /// Every span is validated against `text` before sorting; a zero-length,
    /// out-of-bounds or mid-character span aborts the merge.
    pub fn merge(
        &self,
        text: &str,
        sources: &[Vec<Span>],
    ) -> Result<MergedSpans, AnnotationError> {
        let mut all: Vec<&Span> = Vec::with_capacity(sources.iter().map(Vec::len).sum());
        for span in sources.iter().flatten() {
            span.validate(text)
                .map_err(|v| AnnotationError::invalid_span(span, text, v))?;
            all.push(span);
        }

        // sort_by_key is stable, so provider order breaks ties
        all.sort_by_key(|s| s.start);

        let mut accepted = Vec::with_capacity(all.len());
        let mut cursor = 0;
        for span in all {
            if span.start >= cursor {
                cursor = span.end;
                accepted.push(span.clone());
            } else {
                debug!(
                    "Dropping {} span [{}, {}) overlapping accepted text up to {}",
                    span.label, span.start, span.end, cursor
                );
            }
        }

        Ok(MergedSpans::from_sorted_disjoint(accepted))
    }
}
