//! archivum - line segmentation, recognition and entity annotation for
//! archival document scans.
//!
//! The library exposes two entry points through [`pipeline::DocumentPipeline`]:
//! - `structure_document(image)`: ordered lines read from a page image
//! - `annotate(text)`: plain and labeled segments over a text
//!
//! External recognizers plug in through the [`ocr::TextDetector`],
//! [`ocr::LineRecognizer`] and [`services::annotation::EntityRecognizer`] traits.

pub mod config;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod server;
pub mod services;

pub use pipeline::{DocumentPipeline, PipelineError};
