//! Index handle, query engine and index builder traits

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::{Document, Error, Result, Settings};

/// Directory-writing methods an index handle may expose
///
/// Different versions of an index library name this method differently; the
/// persistence layer picks whichever one a handle reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectoryWriter {
    SaveToDisk,
    Save,
    Persist,
}

impl DirectoryWriter {
    /// Preference order when a handle exposes more than one writer
    pub const PREFERENCE: [DirectoryWriter; 3] = [
        DirectoryWriter::SaveToDisk,
        DirectoryWriter::Save,
        DirectoryWriter::Persist,
    ];

    pub fn method_name(&self) -> &'static str {
        match self {
            DirectoryWriter::SaveToDisk => "save_to_disk",
            DirectoryWriter::Save => "save",
            DirectoryWriter::Persist => "persist",
        }
    }
}

impl fmt::Display for DirectoryWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// A retrieved chunk backing a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceNode {
    pub document_id: String,
    pub text: String,
    pub score: f32,
}

/// Answer produced by a query engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub response: String,
    pub source_nodes: Vec<SourceNode>,
}

impl Response {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            source_nodes: Vec::new(),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.response)
    }
}

/// Trait for query engines built from an index
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Answer a natural-language question
    async fn query(&self, text: &str) -> Result<Response>;
}

/// Trait for built retrieval indexes
///
/// The orchestration layer treats an index as opaque: it asks for a query
/// engine and, when persisting, for whichever directory writer the handle
/// exposes. Handles that expose no writer return an empty slice.
pub trait IndexHandle: Send + Sync {
    /// Human-readable type name, reported by dry runs
    fn type_name(&self) -> &str;

    /// Number of source documents the index was built from
    fn document_count(&self) -> usize;

    /// Build a query engine backed by the models in `settings`
    fn as_query_engine<'a>(&'a self, settings: &Settings) -> Result<Box<dyn QueryEngine + 'a>>;

    /// Directory writers this handle exposes
    fn directory_writers(&self) -> &[DirectoryWriter] {
        &[]
    }

    /// Write the index into `dir` using `writer`
    fn write_directory(&self, writer: DirectoryWriter, dir: &Path) -> Result<()> {
        let _ = dir;
        Err(Error::Unsupported(format!(
            "{} does not expose {}",
            self.type_name(),
            writer
        )))
    }
}

/// Trait for index construction entry points
#[async_trait]
pub trait IndexBuilder<I>: Send + Sync {
    /// Build an index over every document, embedding with `settings`
    async fn from_documents(&self, documents: &[Document], settings: &Settings) -> Result<I>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Opaque;

    impl IndexHandle for Opaque {
        fn type_name(&self) -> &str {
            "Opaque"
        }

        fn document_count(&self) -> usize {
            0
        }

        fn as_query_engine<'a>(&'a self, _settings: &Settings) -> Result<Box<dyn QueryEngine + 'a>> {
            Err(Error::Unsupported("no engine".to_string()))
        }
    }

    #[test]
    fn test_default_handle_exposes_no_writer() {
        let index = Opaque;
        assert!(index.directory_writers().is_empty());

        let err = index
            .write_directory(DirectoryWriter::Persist, Path::new("/tmp/unused"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported operation: Opaque does not expose persist");
    }

    #[test]
    fn test_response_displays_answer_text() {
        let response = Response::new("FAKE_SUMMARY");
        assert_eq!(response.to_string(), "FAKE_SUMMARY");
    }

    #[test]
    fn test_writer_preference_order() {
        let names: Vec<_> = DirectoryWriter::PREFERENCE.iter().map(|w| w.method_name()).collect();
        assert_eq!(names, vec!["save_to_disk", "save", "persist"]);
    }
}
