//! Labeled byte ranges over a text buffer and the segments rendered from them.
//!
//! Spans carry a plain string label so new pattern families can be added
//! without touching the merge algorithm. The closed `EntityLabel` set only
//! appears at the rendering boundary.

use serde::{Deserialize, Serialize};

/// A labeled half-open byte range `[start, end)` over a text buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

/// Why a span failed validation against its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanViolation {
    Empty,
    Reversed,
    OutOfBounds,
    NotCharBoundary,
}

impl SpanViolation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanViolation::Empty => "zero-length span",
            SpanViolation::Reversed => "start is after end",
            SpanViolation::OutOfBounds => "span extends past end of text",
            SpanViolation::NotCharBoundary => "offset splits a multi-byte character",
        }
    }
}

impl Span {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check `0 <= start < end <= text.len()` and that both offsets fall on
    /// UTF-8 character boundaries of `text`.
    pub fn validate(&self, text: &str) -> Result<(), SpanViolation> {
        if self.start == self.end {
            return Err(SpanViolation::Empty);
        }
        if self.start > self.end {
            return Err(SpanViolation::Reversed);
        }
        if self.end > text.len() {
            return Err(SpanViolation::OutOfBounds);
        }
        if !text.is_char_boundary(self.start) || !text.is_char_boundary(self.end) {
            return Err(SpanViolation::NotCharBoundary);
        }
        Ok(())
    }

    /// The covered slice of `text`. Only meaningful after `validate` succeeded.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Spans sorted ascending by `start` and pairwise disjoint.
///
/// Only constructible through `SpanMerger`, so holders can rely on the
/// ordering and disjointness invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MergedSpans {
    spans: Vec<Span>,
}

impl MergedSpans {
    pub(crate) fn from_sorted_disjoint(spans: Vec<Span>) -> Self {
        debug_assert!(spans.windows(2).all(|w| w[0].end <= w[1].start));
        Self { spans }
    }

    pub fn as_slice(&self) -> &[Span] {
        &self.spans
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Span> {
        self.spans.iter()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Total number of bytes covered by all spans.
    pub fn coverage(&self) -> usize {
        self.spans.iter().map(Span::len).sum()
    }

    pub fn into_vec(self) -> Vec<Span> {
        self.spans
    }
}

impl<'a> IntoIterator for &'a MergedSpans {
    type Item = &'a Span;
    type IntoIter = std::slice::Iter<'a, Span>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}

/// Entity category as shown to readers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityLabel {
    Person,
    Location,
    Organization,
    Date,
    Other(String),
}

impl EntityLabel {
    pub fn as_str(&self) -> &str {
        match self {
            EntityLabel::Person => "per",
            EntityLabel::Location => "loc",
            EntityLabel::Organization => "org",
            EntityLabel::Date => "date",
            EntityLabel::Other(s) => s.as_str(),
        }
    }

    /// CSS class used by the HTML markup, e.g. `ner-per`.
    pub fn css_class(&self) -> String {
        format!("ner-{}", self.as_str())
    }
}

impl From<&str> for EntityLabel {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "per" | "person" => EntityLabel::Person,
            "loc" | "location" => EntityLabel::Location,
            "org" | "organization" => EntityLabel::Organization,
            "date" => EntityLabel::Date,
            other => EntityLabel::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for EntityLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityLabel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(EntityLabel::from(s.as_str()))
    }
}

/// A renderer-level unit of text, plain or labeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Plain { text: String },
    Labeled { text: String, label: EntityLabel },
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain { text } | Segment::Labeled { text, .. } => text,
        }
    }

    pub fn label(&self) -> Option<&EntityLabel> {
        match self {
            Segment::Plain { .. } => None,
            Segment::Labeled { label, .. } => Some(label),
        }
    }
}
