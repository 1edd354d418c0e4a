//! Document loading, vector indexing and retrieval for docsum
//!
//! This crate provides the concrete collaborators the driver runs against: a
//! directory reader, an in-memory vector index with two on-disk layouts, the
//! retriever query engine, and the [`VectorIndexLibrary`] persistence surface.

mod library;
mod query_engine;
mod reader;
pub mod storage;
mod vector_index;

#[cfg(test)]
mod testing;

pub use library::{LibraryFeatures, VectorIndexLibrary};
pub use query_engine::RetrieverQueryEngine;
pub use reader::SimpleDirectoryReader;
pub use storage::{load_index_from_storage, StorageContext};
pub use vector_index::{ChunkingConfig, DocumentInfo, TextNode, VectorIndexBuilder, VectorStoreIndex};

// Re-export core types for convenience
pub use docsum_core::{
    Document, DocumentSource, Error, IndexBuilder, IndexHandle, IndexLibrary, QueryEngine, Response, Result,
    Settings,
};
