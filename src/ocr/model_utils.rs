//! Shared utilities for OCR backends.

/// Check if a binary is available, either as a path or by name in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}
