//! Segment rendering over a merged span sequence.

use tracing::warn;

use crate::models::{EntityLabel, MergedSpans, Segment};

/// Split `text` into plain and labeled segments following `spans`.
///
/// `spans` must come from merging over this same `text`. Concatenating the
/// returned segment texts yields `text` exactly. A span that does not fit
/// `text` (out of range or not on a character boundary) is left unlabeled
/// and logged. An empty text produces no segments.
pub fn render_segments(text: &str, spans: &MergedSpans) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(spans.len() * 2 + 1);
    let mut last = 0;

    for span in spans {
        let (Some(before), Some(labeled)) =
            (text.get(last..span.start), text.get(span.start..span.end))
        else {
            warn!(
                "Skipping {} span [{}, {}) that does not fit a text of {} bytes",
                span.label,
                span.start,
                span.end,
                text.len()
            );
            continue;
        };
        if !before.is_empty() {
            segments.push(Segment::Plain {
                text: before.to_string(),
            });
        }
        segments.push(Segment::Labeled {
            text: labeled.to_string(),
            label: EntityLabel::from(span.label.as_str()),
        });
        last = span.end;
    }

    if let Some(rest) = text.get(last..).filter(|rest| !rest.is_empty()) {
        segments.push(Segment::Plain {
            text: rest.to_string(),
        });
    }

    segments
}

/// Render segments as HTML with `<mark class="ner-{label}">` around labeled text.
pub fn render_html(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Plain { text } => out.push_str(&html_escape(text)),
            Segment::Labeled { text, label } => {
                out.push_str(&format!(
                    "<mark class=\"{}\">{}</mark>",
                    html_escape(&label.css_class()),
                    html_escape(text)
                ));
            }
        }
    }
    out
}

/// Escape HTML special characters for safe rendering.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
