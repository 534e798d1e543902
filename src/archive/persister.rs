//! Final record assembly and the atomic completion marker

use crate::archive::{ArticleFields, ImageMap};
use crate::site::ArticleId;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting an article
///
/// Persistence failures are page-level failures, never silent skips: by the
/// time the persister runs, data has been extracted and images downloaded,
/// so losing the write deserves operator attention.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The wire format of `index.json`
///
/// Field names are the on-disk contract; `images` keys appear in first-seen
/// document order and `cover`, when non-empty, equals one of its values.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub category: String,
    pub tags: Vec<String>,
    pub title: String,
    pub content: String,
    pub images: ImageMap,
    pub published: String,
    pub external_id: String,
    pub original_url: String,
    pub cover: String,
}

/// Outcome of a persist call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The record was written and the completion marker now exists
    Persisted,
    /// Another visit already wrote the marker; nothing was touched
    AlreadyExists,
}

/// Writes one article's record and completion marker
///
/// Writing `index.json` is the act that makes the article invisible to
/// future admission checks, so the file appears atomically: the record is
/// written to a temporary sibling and renamed into place. The caller
/// guarantees this step is only reached when extraction and the image pass
/// both completed without aborting.
#[derive(Debug, Clone)]
pub struct ArticlePersister {
    output_root: PathBuf,
}

impl ArticlePersister {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    /// Persists the assembled record for one article
    pub fn persist(
        &self,
        article_id: ArticleId,
        fields: &ArticleFields,
        images: ImageMap,
        cover: String,
        original_url: &str,
    ) -> Result<PersistOutcome, PersistError> {
        let dir = self.output_root.join(article_id.to_string());
        std::fs::create_dir_all(&dir)?;

        let marker = dir.join("index.json");
        if marker.is_file() {
            return Ok(PersistOutcome::AlreadyExists);
        }

        let record = ArticleRecord {
            category: fields.category.clone(),
            tags: fields.tags.clone(),
            title: fields.title.clone(),
            content: fields.content_html.clone(),
            images,
            published: fields.published.clone(),
            external_id: article_id.to_string(),
            original_url: original_url.to_string(),
            cover,
        };

        let json = serde_json::to_vec_pretty(&record)?;
        let staging = dir.join("index.json.tmp");
        std::fs::write(&staging, json)?;
        std::fs::rename(&staging, &marker)?;

        Ok(PersistOutcome::Persisted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fields() -> ArticleFields {
        ArticleFields {
            title: "A Title".to_string(),
            content_html: "<p>Body</p>".to_string(),
            category: "Audio".to_string(),
            tags: vec!["vintage".to_string(), "repair".to_string()],
            published: "2024-03-05T09:00:00+00:00".to_string(),
            image_sources: vec![],
        }
    }

    fn image_map() -> ImageMap {
        let mut map = ImageMap::new();
        map.insert("https://example.com/b.png".to_string(), "bbb.png".to_string());
        map.insert("https://example.com/a.png".to_string(), "aaa.png".to_string());
        map
    }

    #[test]
    fn test_persist_writes_marker() {
        let dir = TempDir::new().unwrap();
        let persister = ArticlePersister::new(dir.path());

        let outcome = persister
            .persist(
                ArticleId::new(42),
                &fields(),
                image_map(),
                "bbb.png".to_string(),
                "https://example.com/wp/42",
            )
            .unwrap();

        assert_eq!(outcome, PersistOutcome::Persisted);
        let marker = dir.path().join("42").join("index.json");
        assert!(marker.is_file());
        // No staging file is left behind
        assert!(!dir.path().join("42").join("index.json.tmp").exists());
    }

    #[test]
    fn test_wire_field_names() {
        let dir = TempDir::new().unwrap();
        let persister = ArticlePersister::new(dir.path());
        persister
            .persist(
                ArticleId::new(42),
                &fields(),
                image_map(),
                "bbb.png".to_string(),
                "https://example.com/wp/42",
            )
            .unwrap();

        let json = std::fs::read_to_string(dir.path().join("42").join("index.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["category"], "Audio");
        assert_eq!(value["tags"][0], "vintage");
        assert_eq!(value["title"], "A Title");
        assert_eq!(value["content"], "<p>Body</p>");
        assert_eq!(value["images"]["https://example.com/a.png"], "aaa.png");
        assert_eq!(value["published"], "2024-03-05T09:00:00+00:00");
        assert_eq!(value["externalId"], "42");
        assert_eq!(value["originalUrl"], "https://example.com/wp/42");
        assert_eq!(value["cover"], "bbb.png");

        // Pretty-printed, and insertion order survives serialization
        assert!(json.contains('\n'));
        let b_pos = json.find("b.png").unwrap();
        let a_pos = json.find("a.png").unwrap();
        assert!(b_pos < a_pos);
    }

    #[test]
    fn test_existing_marker_untouched() {
        let dir = TempDir::new().unwrap();
        let article_dir = dir.path().join("42");
        std::fs::create_dir_all(&article_dir).unwrap();
        std::fs::write(article_dir.join("index.json"), "sentinel").unwrap();

        let persister = ArticlePersister::new(dir.path());
        let outcome = persister
            .persist(
                ArticleId::new(42),
                &fields(),
                ImageMap::new(),
                String::new(),
                "https://example.com/wp/42",
            )
            .unwrap();

        assert_eq!(outcome, PersistOutcome::AlreadyExists);
        let content = std::fs::read_to_string(article_dir.join("index.json")).unwrap();
        assert_eq!(content, "sentinel");
    }

    #[test]
    fn test_empty_cover_allowed() {
        let dir = TempDir::new().unwrap();
        let persister = ArticlePersister::new(dir.path());
        persister
            .persist(
                ArticleId::new(7),
                &fields(),
                ImageMap::new(),
                String::new(),
                "https://example.com/wp/7",
            )
            .unwrap();

        let json = std::fs::read_to_string(dir.path().join("7").join("index.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["cover"], "");
        assert!(value["images"].as_object().unwrap().is_empty());
    }
}
