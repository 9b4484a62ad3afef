//! Entity recognition backends.
//!
//! The `EntityRecognizer` trait is the seam to the external tagger. Built-in
//! backends:
//! - `LexiconRecognizer`: offline whole-word matching against configured terms
//! - `HttpEntityRecognizer`: a remote tagging service speaking JSON
//! - `NoEntities`: disables entity spans entirely

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{AnnotationError, OffsetUnit};

/// An entity range as reported by a backend, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntity {
    pub start: usize,
    pub end: usize,
    #[serde(alias = "type")]
    pub label: String,
}

/// Trait for pluggable entity taggers.
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Human-readable backend identifier (e.g. "lexicon", "http").
    fn backend_id(&self) -> &str;

    /// Unit the returned offsets are expressed in.
    fn offset_unit(&self) -> OffsetUnit {
        OffsetUnit::Bytes
    }

    /// Whether the backend can currently be used.
    async fn is_available(&self) -> bool {
        true
    }

    /// Tag entities in `text`.
    async fn recognize(&self, text: &str) -> Result<Vec<RawEntity>, AnnotationError>;
}

// ============================================================================
// NoEntities
// ============================================================================

/// Backend that never reports entities.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEntities;

#[async_trait]
impl EntityRecognizer for NoEntities {
    fn backend_id(&self) -> &str {
        "none"
    }

    async fn recognize(&self, _text: &str) -> Result<Vec<RawEntity>, AnnotationError> {
        Ok(Vec::new())
    }
}

// ============================================================================
// LexiconRecognizer
// ============================================================================

/// Whole-word matcher over a fixed label → terms table.
///
/// Reports byte offsets. Matches of different terms may overlap; the merger
/// resolves that downstream.
pub struct LexiconRecognizer {
    patterns: Vec<(String, Regex)>,
}

impl LexiconRecognizer {
    pub fn new(lexicon: &BTreeMap<String, Vec<String>>) -> Self {
        let mut patterns = Vec::new();
        for (label, terms) in lexicon {
            for term in terms.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
                let pattern = format!(r"\b{}\b", regex::escape(term));
                match Regex::new(&pattern) {
                    Ok(re) => patterns.push((label.clone(), re)),
                    Err(e) => debug!("Skipping lexicon term {:?}: {}", term, e),
                }
            }
        }
        Self { patterns }
    }

    pub fn term_count(&self) -> usize {
        self.patterns.len()
    }
}

#[async_trait]
impl EntityRecognizer for LexiconRecognizer {
    fn backend_id(&self) -> &str {
        "lexicon"
    }

    async fn recognize(&self, text: &str) -> Result<Vec<RawEntity>, AnnotationError> {
        let mut entities = Vec::new();
        for (label, re) in &self.patterns {
            for m in re.find_iter(text) {
                entities.push(RawEntity {
                    start: m.start(),
                    end: m.end(),
                    label: label.clone(),
                });
            }
        }
        entities.sort_by_key(|e| e.start);
        Ok(entities)
    }
}

// ============================================================================
// HttpEntityRecognizer
// ============================================================================

#[derive(Debug, Serialize)]
struct TagRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagResponse {
    Bare(Vec<RawEntity>),
    Wrapped { spans: Vec<RawEntity> },
}

/// Remote tagger: POSTs `{"text": ...}` and reads back entity ranges.
pub struct HttpEntityRecognizer {
    client: reqwest::Client,
    endpoint: String,
    offset_unit: OffsetUnit,
}

impl HttpEntityRecognizer {
    pub fn new(
        endpoint: impl Into<String>,
        offset_unit: OffsetUnit,
        timeout: Duration,
    ) -> Result<Self, AnnotationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnnotationError::BackendNotAvailable(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            offset_unit,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EntityRecognizer for HttpEntityRecognizer {
    fn backend_id(&self) -> &str {
        "http"
    }

    fn offset_unit(&self) -> OffsetUnit {
        self.offset_unit
    }

    async fn is_available(&self) -> bool {
        !self.endpoint.is_empty()
    }

    async fn recognize(&self, text: &str) -> Result<Vec<RawEntity>, AnnotationError> {
        if self.endpoint.is_empty() {
            return Err(AnnotationError::BackendNotAvailable(
                "ner.endpoint is not configured".to_string(),
            ));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&TagRequest { text })
            .send()
            .await
            .map_err(|e| AnnotationError::ExternalService(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnnotationError::ExternalService(format!(
                "tagger returned {}: {}",
                status, body
            )));
        }

        let parsed: TagResponse = response
            .json()
            .await
            .map_err(|e| AnnotationError::ExternalService(format!("bad tagger response: {}", e)))?;

        Ok(match parsed {
            TagResponse::Bare(spans) | TagResponse::Wrapped { spans } => spans,
        })
    }
}
