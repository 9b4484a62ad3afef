//! Shared helpers for CLI commands.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::DynamicImage;

/// Decode an image file.
pub async fn load_image(path: &Path) -> anyhow::Result<DynamicImage> {
    let path = path.to_path_buf();
    let display = path.display().to_string();
    tokio::task::spawn_blocking(move || image::open(&path))
        .await?
        .with_context(|| format!("Failed to open image {}", display))
}

/// Text from the argument, a file, or stdin, in that order.
pub async fn read_text_input(text: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(file) = file {
        return tokio::fs::read_to_string(&file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read stdin")?;
    Ok(buf)
}

/// Truncate a string to a maximum number of characters.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Москва златоглавая", 9), "Москва...");
    }

    #[tokio::test]
    async fn test_read_text_prefers_argument() {
        let text = read_text_input(Some("дано".to_string()), Some(PathBuf::from("/nope")))
            .await
            .unwrap();
        assert_eq!(text, "дано");
    }

    #[tokio::test]
    async fn test_read_text_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        std::fs::write(&path, "из файла").unwrap();
        let text = read_text_input(None, Some(path)).await.unwrap();
        assert_eq!(text, "из файла");
    }

    #[tokio::test]
    async fn test_load_missing_image() {
        let err = load_image(Path::new("/definitely/missing.png"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing.png"));
    }
}
