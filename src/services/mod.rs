//! Service layer for archivum text processing.
//!
//! Domain logic separated from UI concerns, usable from the CLI, the web
//! server, or as a library.

pub mod annotation;
