//! Pattern-based date span detection.
//!
//! Four independent pattern families, unioned without de-duplication:
//! - numeric day/month/year: 15.03.1990, 1/2/1905, 01-12-1917
//! - ISO dates: 1990-03-15
//! - a year followed by a year word: 1995 году, 1812 г, 1905 year, 1905 y.
//! - decades: в 1920-х годах, 2000-х, in 1990s
//!
//! Overlap between families is resolved later by `SpanMerger`.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::models::Span;

use super::provider::SpanProvider;
use super::types::AnnotationError;

/// Label attached to every span this provider emits.
pub const DATE_LABEL: &str = "date";

static DATE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"\b\d{1,2}[./\-]\d{1,2}[./\-]\d{4}\b").unwrap(),
            "day_month_year",
        ),
        (Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").unwrap(), "iso"),
        (
            Regex::new(r"\b\d{4}\s*(?:г\.?|год|года|году|годах|years?|y\.?)\b").unwrap(),
            "year_word",
        ),
        (
            Regex::new(r"\b(?:(?i:в|in)\s+)?\d{3}0-?[хxs](?:\s*(?:годах|годов|году|год|гг\.?))?\b")
                .unwrap(),
            "decade",
        ),
    ]
});

/// Find every date-like span in `text`, sorted by start offset.
///
/// Spans from different families may overlap; equal starts keep family order.
pub fn find_dates(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    for (pattern, _family) in DATE_PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            spans.push(Span::new(m.start(), m.end(), DATE_LABEL));
        }
    }
    spans.sort_by_key(|s| s.start);
    spans
}

/// `SpanProvider` over the built-in date patterns.
#[derive(Debug, Default, Clone, Copy)]
pub struct DateSpanProvider;

impl DateSpanProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SpanProvider for DateSpanProvider {
    fn provider_id(&self) -> &str {
        "date_patterns"
    }

    async fn spans(&self, text: &str) -> Result<Vec<Span>, AnnotationError> {
        let spans = find_dates(text);
        tracing::debug!("Date patterns matched {} span(s)", spans.len());
        Ok(spans)
    }
}
