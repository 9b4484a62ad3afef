//! Configuration management for archivum using the prefer crate.
//!
//! Discovery order: explicit `--config` path, then `prefer` auto-discovery of
//! an `archivum.{toml,yaml,json,...}` file, then built-in defaults.
//! Selected settings can be overridden from the environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ocr::OcrConfig;
use crate::services::annotation::{
    AnnotationError, EntityRecognizer, HttpEntityRecognizer, LexiconRecognizer, NoEntities,
    OffsetUnit,
};

/// Default max upload size (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Environment variable overriding `ner.endpoint`.
pub const ENV_NER_ENDPOINT: &str = "ARCHIVUM_NER_ENDPOINT";
/// Environment variable overriding `ocr.language`.
pub const ENV_OCR_LANGUAGE: &str = "ARCHIVUM_OCR_LANGUAGE";
/// Environment variable overriding `server.uploads_dir`.
pub const ENV_UPLOADS_DIR: &str = "ARCHIVUM_UPLOADS_DIR";

/// Which entity recognizer backs the entity span provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NerBackendKind {
    /// Offline term lists from `ner.lexicon`.
    #[default]
    Lexicon,
    /// Remote tagging service at `ner.endpoint`.
    Http,
    /// Pattern spans only.
    None,
}

impl NerBackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NerBackendKind::Lexicon => "lexicon",
            NerBackendKind::Http => "http",
            NerBackendKind::None => "none",
        }
    }
}

/// Entity recognition settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NerConfig {
    pub backend: NerBackendKind,
    /// Tagger URL for the `http` backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// How the tagger counts offsets.
    pub offset_unit: OffsetUnit,
    pub timeout_secs: u64,
    /// Label to term list for the `lexicon` backend.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub lexicon: BTreeMap<String, Vec<String>>,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            backend: NerBackendKind::default(),
            endpoint: None,
            offset_unit: OffsetUnit::default(),
            timeout_secs: 30,
            lexicon: BTreeMap::new(),
        }
    }
}

impl NerConfig {
    /// Build the configured entity recognizer.
    pub fn build_recognizer(&self) -> Result<Arc<dyn EntityRecognizer>, AnnotationError> {
        Ok(match self.backend {
            NerBackendKind::Lexicon => Arc::new(LexiconRecognizer::new(&self.lexicon)),
            NerBackendKind::Http => Arc::new(HttpEntityRecognizer::new(
                self.endpoint.clone().unwrap_or_default(),
                self.offset_unit,
                Duration::from_secs(self.timeout_secs),
            )?),
            NerBackendKind::None => Arc::new(NoEntities),
        })
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Where uploaded images are written; relative to the config file.
    pub uploads_dir: String,
    pub max_upload_bytes: usize,
    /// Upper bound on one request's pipeline run.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
            uploads_dir: "uploads".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout_secs: 120,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "OcrConfig::is_default")]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub ner: NerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Path the configuration was loaded from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load from an explicit path if given, else auto-discover.
    ///
    /// An explicit path that fails to load is an error; a failed
    /// auto-discovery falls back to defaults.
    pub async fn load_with_path(path: Option<&Path>) -> Result<Self, String> {
        match path {
            Some(path) => Self::load_from_path(path).await,
            None => Ok(Self::load().await),
        }
    }

    /// Auto-discover a config file via prefer, falling back to defaults.
    pub async fn load() -> Self {
        match prefer::load("archivum").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring unreadable config: {}", e);
                            Self::default_with_env()
                        }
                    }
                } else {
                    Self::default_with_env()
                }
            }
            Err(_) => {
                // No config file found, use defaults with env overrides
                Self::default_with_env()
            }
        }
    }

    /// Create a default config with environment variable overrides applied.
    pub fn default_with_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        config.apply_env_overrides(|key| std::env::var(key).ok());
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, String> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        match ext {
            "toml" => {
                toml::from_str(contents).map_err(|e| format!("Failed to parse TOML config: {}", e))
            }
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = lookup(ENV_NER_ENDPOINT) {
            self.ner.endpoint = Some(endpoint);
        }
        if let Some(language) = lookup(ENV_OCR_LANGUAGE) {
            self.ocr.language = language;
        }
        if let Some(dir) = lookup(ENV_UPLOADS_DIR) {
            self.server.uploads_dir = dir;
        }
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Absolute uploads directory.
    pub fn uploads_dir(&self) -> PathBuf {
        let base_dir = self
            .base_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        self.resolve_path(&self.server.uploads_dir, &base_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.ocr.language, "rus");
        assert_eq!(config.ner.backend, NerBackendKind::Lexicon);
        assert_eq!(config.ner.offset_unit, OffsetUnit::Chars);
        assert_eq!(config.server.port, 3030);
        assert_eq!(config.server.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(config.server.request_timeout(), Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_load_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archivum.toml");
        std::fs::write(
            &path,
            r#"
[ocr]
language = "rus+eng"
line_tolerance = 12.5

[ner]
backend = "http"
endpoint = "http://localhost:9000/tag"
offset_unit = "bytes"

[server]
port = 8080
uploads_dir = "scans"
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.ocr.language, "rus+eng");
        assert_eq!(config.ocr.line_tolerance, 12.5);
        assert_eq!(config.ocr.concurrency, 1);
        assert_eq!(config.ner.backend, NerBackendKind::Http);
        assert_eq!(config.ner.offset_unit, OffsetUnit::Bytes);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.uploads_dir(), dir.path().join("scans"));
    }

    #[tokio::test]
    async fn test_load_yaml_lexicon() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archivum.yaml");
        std::fs::write(
            &path,
            "ner:\n  lexicon:\n    per: [\"Пушкин\"]\n    loc: [\"Москва\", \"Тверь\"]\n",
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.ner.lexicon["loc"].len(), 2);
        assert_eq!(config.ner.backend, NerBackendKind::Lexicon);
    }

    #[tokio::test]
    async fn test_load_json_and_bad_file() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("archivum.json");
        std::fs::write(&good, r#"{"ner": {"backend": "none"}}"#).unwrap();
        let config = Config::load_with_path(Some(&good)).await.unwrap();
        assert_eq!(config.ner.backend, NerBackendKind::None);

        let bad = dir.path().join("broken.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(Config::load_from_path(&bad).await.is_err());
        assert!(Config::load_from_path(&dir.path().join("missing.toml"))
            .await
            .is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            ENV_NER_ENDPOINT => Some("http://tagger/".to_string()),
            ENV_OCR_LANGUAGE => Some("   ".to_string()),
            ENV_UPLOADS_DIR => Some("/srv/uploads".to_string()),
            _ => None,
        });
        assert_eq!(config.ner.endpoint.as_deref(), Some("http://tagger/"));
        assert_eq!(config.ocr.language, "rus");
        assert_eq!(config.uploads_dir(), PathBuf::from("/srv/uploads"));
    }

    #[test]
    fn test_resolve_path() {
        let config = Config::default();
        let base = Path::new("/etc/archivum");
        assert_eq!(
            config.resolve_path("uploads", base),
            PathBuf::from("/etc/archivum/uploads")
        );
        assert_eq!(config.resolve_path("/tmp/x", base), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_build_recognizers() {
        let mut ner = NerConfig::default();
        assert_eq!(ner.build_recognizer().unwrap().backend_id(), "lexicon");
        ner.backend = NerBackendKind::None;
        assert_eq!(ner.build_recognizer().unwrap().backend_id(), "none");
        ner.backend = NerBackendKind::Http;
        ner.endpoint = Some("http://localhost:1/tag".to_string());
        assert_eq!(ner.build_recognizer().unwrap().backend_id(), "http");
    }
}
