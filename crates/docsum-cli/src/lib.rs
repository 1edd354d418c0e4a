//! Command line surface and run pipeline for docsum

mod args;
pub mod logging;
mod pipeline;

pub use args::Cli;
pub use pipeline::{Collaborators, EmbedModelFactory, LLMFactory, Pipeline, RunOptions};

// Re-export core types
pub use docsum_core::{Error, Result};
