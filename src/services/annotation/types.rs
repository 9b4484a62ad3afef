//! Types shared across span providers.

use thiserror::Error;

use crate::models::{Span, SpanViolation};

/// Errors from span providers and the merger.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("Invalid span [{start}, {end}) over {len}-byte text: {reason}")]
    InvalidSpan {
        start: usize,
        end: usize,
        len: usize,
        reason: &'static str,
    },

    #[error("Entity recognition failed: {0}")]
    ExternalService(String),

    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),
}

impl AnnotationError {
    pub fn invalid_span(span: &Span, text: &str, violation: SpanViolation) -> Self {
        AnnotationError::InvalidSpan {
            start: span.start,
            end: span.end,
            len: text.len(),
            reason: violation.as_str(),
        }
    }
}

/// How an entity backend counts offsets into the text it was given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetUnit {
    /// UTF-8 byte offsets.
    Bytes,
    /// Unicode scalar (code point) offsets, as most tagging services report.
    #[default]
    Chars,
}

impl OffsetUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetUnit::Bytes => "bytes",
            OffsetUnit::Chars => "chars",
        }
    }
}
