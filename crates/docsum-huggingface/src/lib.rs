//! Hugging Face integration for docsum
//!
//! This crate provides the Hugging Face feature-extraction implementation of the
//! EmbeddingModel trait.

mod client;
mod config;

pub use client::HuggingFaceEmbedding;
pub use config::HuggingFaceConfig;

// Re-export core types for convenience
pub use docsum_core::{EmbeddingModel, Error, Result};
