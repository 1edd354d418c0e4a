//! Ollama integration for docsum
//!
//! This crate provides the Ollama implementation of the LLMProvider trait.

mod client;
mod config;


pub use client::OllamaClient;
pub use config::OllamaConfig;

// Re-export core types for convenience
pub use docsum_core::{Error, LLMConfig, LLMProvider, Result};
