//! OCR and line segmentation module.
//!
//! Turns a page image into an ordered list of recognized lines:
//! 1. a `TextDetector` returns word boxes for the page
//! 2. `LineClusterer` groups boxes into lines by vertical center
//! 3. `LineRegionReducer` turns each line into a crop rectangle
//! 4. `SequentialRecognizer` crops and reads each line in order
//!
//! ## OCR Backends
//!
//! Tesseract is the only bundled backend and serves as both detector and
//! line recognizer. Other engines plug in through the two traits.

mod backend;
mod line_grouping;
mod model_utils;
mod recognizer;
mod region;
mod tesseract;

pub use backend::{LineRecognizer, OcrConfig, OcrError, RecognitionMode, TextDetector};
pub use line_grouping::{LineClusterer, DEFAULT_LINE_TOLERANCE};
pub use model_utils::check_binary;
pub use recognizer::SequentialRecognizer;
pub use region::{crop_region, LineRegionReducer};
pub use tesseract::{parse_tsv_words, TesseractBackend};
