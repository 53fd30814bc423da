//! Loading documents, categories, ratings and passes from disk.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;

use concord_core::{Document, EngineConfig};

pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// A plain-text file becomes a document identified by its file stem.
pub fn read_document(path: &Path) -> anyhow::Result<Document> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    Ok(Document::new(id, content))
}

/// File values first, then flag overrides; the result is validated.
pub fn load_config(path: Option<&Path>, min_confidence: Option<f64>) -> anyhow::Result<EngineConfig> {
    let mut config = match path {
        Some(p) => EngineConfig::from_json_file(p).with_context(|| format!("loading config {}", p.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(min) = min_confidence {
        config.min_confidence = min;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_core::Category;
    use std::io::Write;

    #[test]
    fn document_id_from_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interview-12.txt");
        std::fs::write(&path, "My colleagues became close friends.").unwrap();
        let doc = read_document(&path).unwrap();
        assert_eq!(doc.id, "interview-12");
        assert_eq!(doc.content, "My colleagues became close friends.");
    }

    #[test]
    fn categories_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id":"c1","name":"Burnout","description":"exhaustion"}}]"#).unwrap();
        let cats: Vec<Category> = read_json(file.path()).unwrap();
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].description.as_deref(), Some("exhaustion"));
    }

    #[test]
    fn malformed_json_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = read_json::<Vec<Category>>(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("parsing "));
    }

    #[test]
    fn flag_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"min_confidence": 0.5, "max_candidates": 5}}"#).unwrap();
        let config = load_config(Some(file.path()), Some(0.25)).unwrap();
        assert_eq!(config.min_confidence, 0.25);
        assert_eq!(config.max_candidates, 5);
    }

    #[test]
    fn out_of_range_override_rejected() {
        assert!(load_config(None, Some(1.5)).is_err());
        assert_eq!(load_config(None, None).unwrap(), EngineConfig::default());
    }
}
