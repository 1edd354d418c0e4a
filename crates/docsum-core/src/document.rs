//! Document type and the document source trait

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

/// A unit of text content loaded from the data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub metadata: serde_json::Value,
    pub hash: String,
}

impl Document {
    /// Create a document with a fresh id and an md5 content hash
    pub fn new(content: impl Into<String>, metadata: serde_json::Value) -> Self {
        let content = content.into();
        let hash = format!("{:x}", md5::compute(content.as_bytes()));

        Self {
            id: Uuid::new_v4().to_string(),
            content,
            metadata,
            hash,
        }
    }

    /// Create a document without metadata
    pub fn from_text(content: impl Into<String>) -> Self {
        Self::new(content, serde_json::Value::Object(Default::default()))
    }

    /// The full text content of the document
    pub fn get_content(&self) -> &str {
        &self.content
    }

    /// Look up a string metadata field
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// Trait for anything that can produce the document set to index
///
/// Loading is a one-shot, blocking operation. Implementations decide where the
/// documents come from; the caller only relies on `get_content()`.
pub trait DocumentSource: Send + Sync {
    /// Load every document this source knows about
    fn load_data(&self) -> Result<Vec<Document>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_hash_is_content_md5() {
        let a = Document::from_text("hello world");
        let b = Document::from_text("hello world");

        assert_eq!(a.hash, b.hash);
        assert_eq!(a.hash, "5eb63bbbe01eeed093cb22bb8f5acdc3");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_document_metadata_lookup() {
        let doc = Document::new("text", json!({"file_name": "essay.txt", "file_size": 4}));

        assert_eq!(doc.get_content(), "text");
        assert_eq!(doc.metadata_str("file_name"), Some("essay.txt"));
        assert_eq!(doc.metadata_str("file_size"), None);
        assert_eq!(doc.metadata_str("missing"), None);
    }
}
