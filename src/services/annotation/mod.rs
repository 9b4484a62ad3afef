//! Span annotation: providers, overlap resolution and rendering.
//!
//! Data flow: text → {`EntitySpanProvider`, `DateSpanProvider`} →
//! `SpanMerger` → `render_segments` → `render_html`.

mod date_spans;
mod entity_provider;
mod merge;
mod ner;
mod provider;
mod render;
mod transliterate;
mod types;

pub use date_spans::{find_dates, DateSpanProvider, DATE_LABEL};
pub use entity_provider::{normalize_entities, EntitySpanProvider};
pub use merge::SpanMerger;
pub use ner::{EntityRecognizer, HttpEntityRecognizer, LexiconRecognizer, NoEntities, RawEntity};
pub use provider::SpanProvider;
pub use render::{html_escape, render_html, render_segments};
pub use transliterate::{transliterate, Transliterator};
pub use types::{AnnotationError, OffsetUnit};
