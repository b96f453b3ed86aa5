//! Knowledge base loader.
//!
//! The knowledge base is a JSON document mapping category names to keyword and
//! response lists, plus a reserved `fallback` category holding the
//! responses-of-last-resort:
//!
//! ```json
//! {
//!   "greeting": { "keywords": ["hello", "hi"], "responses": ["Hi there!"] },
//!   "fallback": { "keywords": [], "responses": ["I don't understand."] }
//! }
//! ```
//!
//! Loaded once at startup and read-only afterwards. Category order in the
//! document is preserved; it becomes the child order of the response tree.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reserved category name for the fallback response pool.
pub const FALLBACK_CATEGORY: &str = "fallback";

/// Startup-time failures while loading the knowledge base. Both are fatal;
/// there is no per-query error path.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// The knowledge base document is absent at the configured path.
    #[error("knowledge base not found at {0}")]
    MissingResource(PathBuf),
    /// The document exists but an entry is not in the expected shape.
    #[error("knowledge base is malformed: {0}")]
    MalformedData(String),
    #[error("failed to read knowledge base: {0}")]
    Io(#[from] std::io::Error),
}

/// Raw per-category shape as it appears in the document.
#[derive(Debug, Clone, Deserialize)]
struct RawEntry {
    keywords: Vec<String>,
    responses: Vec<String>,
}

/// One matchable topic: a category with its keywords and candidate responses.
#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub keywords: Vec<String>,
    pub responses: Vec<String>,
}

/// Validated knowledge base: ordered categories plus the fallback pool.
///
/// The `fallback` entry is held apart from the categories; it is never matched
/// as a topic and only supplies the terminal responses.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    pub categories: Vec<Category>,
    pub fallback: Vec<String>,
}

impl KnowledgeBase {
    /// Loads and validates the knowledge base document at `path`.
    ///
    /// An absent file is `MissingResource`; unparseable JSON, a missing or
    /// empty `fallback` entry, or any category without responses is
    /// `MalformedData`. Both abort process start.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, KnowledgeError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(KnowledgeError::MissingResource(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        let kb = Self::from_json(&raw)?;
        tracing::info!(
            target: "minichat::knowledge",
            path = %path.display(),
            categories = kb.categories.len(),
            fallback_responses = kb.fallback.len(),
            "knowledge base loaded"
        );
        Ok(kb)
    }

    /// Parses and validates a knowledge base from its JSON text.
    pub fn from_json(raw: &str) -> Result<Self, KnowledgeError> {
        // serde_json preserves the document's key order (preserve_order), so
        // category order here is the tree's child order.
        let doc: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)
            .map_err(|e| KnowledgeError::MalformedData(e.to_string()))?;

        let mut categories = Vec::new();
        let mut fallback = None;
        for (name, value) in doc {
            let entry: RawEntry = serde_json::from_value(value).map_err(|e| {
                KnowledgeError::MalformedData(format!("category '{}': {}", name, e))
            })?;
            if entry.responses.is_empty() {
                return Err(KnowledgeError::MalformedData(format!(
                    "category '{}' has no responses",
                    name
                )));
            }
            if name == FALLBACK_CATEGORY {
                fallback = Some(entry.responses);
            } else {
                categories.push(Category {
                    name,
                    keywords: entry.keywords,
                    responses: entry.responses,
                });
            }
        }

        let fallback = fallback.ok_or_else(|| {
            KnowledgeError::MalformedData(format!(
                "reserved '{}' category is missing",
                FALLBACK_CATEGORY
            ))
        })?;

        Ok(Self {
            categories,
            fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"{
        "greeting": { "keywords": ["hello", "hi"], "responses": ["Hi there!"] },
        "fallback": { "keywords": [], "responses": ["I don't understand."] }
    }"#;

    #[test]
    fn load_missing_file_is_missing_resource() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = KnowledgeBase::load(&path).unwrap_err();
        assert!(matches!(err, KnowledgeError::MissingResource(p) if p == path));
    }

    #[test]
    fn load_valid_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(VALID.as_bytes()).unwrap();

        let kb = KnowledgeBase::load(&path).unwrap();
        assert_eq!(kb.categories.len(), 1);
        assert_eq!(kb.categories[0].name, "greeting");
        assert_eq!(kb.categories[0].keywords, vec!["hello", "hi"]);
        assert_eq!(kb.fallback, vec!["I don't understand."]);
    }

    #[test]
    fn document_order_is_preserved() {
        let raw = r#"{
            "zeta": { "keywords": ["z"], "responses": ["Z."] },
            "alpha": { "keywords": ["a"], "responses": ["A."] },
            "fallback": { "keywords": [], "responses": ["?"] }
        }"#;
        let kb = KnowledgeBase::from_json(raw).unwrap();
        let names: Vec<&str> = kb.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn missing_fallback_is_malformed() {
        let raw = r#"{ "greeting": { "keywords": ["hi"], "responses": ["Hi!"] } }"#;
        let err = KnowledgeBase::from_json(raw).unwrap_err();
        assert!(matches!(err, KnowledgeError::MalformedData(msg) if msg.contains("fallback")));
    }

    #[test]
    fn entry_without_responses_key_is_malformed() {
        let raw = r#"{
            "greeting": { "keywords": ["hi"] },
            "fallback": { "keywords": [], "responses": ["?"] }
        }"#;
        let err = KnowledgeBase::from_json(raw).unwrap_err();
        assert!(matches!(err, KnowledgeError::MalformedData(msg) if msg.contains("greeting")));
    }

    #[test]
    fn empty_response_list_is_malformed() {
        let raw = r#"{
            "greeting": { "keywords": ["hi"], "responses": [] },
            "fallback": { "keywords": [], "responses": ["?"] }
        }"#;
        let err = KnowledgeBase::from_json(raw).unwrap_err();
        assert!(matches!(err, KnowledgeError::MalformedData(msg) if msg.contains("no responses")));
    }

    #[test]
    fn empty_fallback_pool_is_malformed() {
        let raw = r#"{ "fallback": { "keywords": [], "responses": [] } }"#;
        let err = KnowledgeBase::from_json(raw).unwrap_err();
        assert!(matches!(err, KnowledgeError::MalformedData(_)));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = KnowledgeBase::from_json("not json").unwrap_err();
        assert!(matches!(err, KnowledgeError::MalformedData(_)));
    }
}
