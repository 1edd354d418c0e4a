//! Core traits and types for docsum
//!
//! This crate defines the capability-facing interfaces the rest of the workspace
//! is written against: document sources, embedding models, LLM providers, index
//! handles with their query engines, and the persistence surface an index library
//! may or may not expose. Concrete implementations live in the sibling crates.

pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod llm;
pub mod persistence;
pub mod settings;

pub use document::{Document, DocumentSource};
pub use embedding::EmbeddingModel;
pub use error::{Error, Result};
pub use index::{DirectoryWriter, IndexBuilder, IndexHandle, QueryEngine, Response, SourceNode};
pub use llm::{LLMConfig, LLMProvider};
pub use persistence::{
    IndexLibrary, LegacyIndexLoad, LegacyIndexSave, NoIndexLibrary, StorageContextApi, StorageLoader,
};
pub use settings::Settings;
