//! Command line arguments

use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::RunOptions;

#[derive(Parser, Debug, Clone)]
#[command(name = "docsum")]
#[command(
    about = "Query a local document set using Ollama and Hugging Face embeddings",
    long_about = None
)]
pub struct Cli {
    /// The natural language query to run against the document index
    #[arg(short, long, default_value = RunOptions::DEFAULT_QUERY)]
    pub query: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Load documents only, without contacting Ollama or Hugging Face
    #[arg(long)]
    pub dry_run: bool,

    /// Hugging Face embedding model name
    #[arg(long, default_value = RunOptions::DEFAULT_EMBED_MODEL)]
    pub embed_model: String,

    /// Ollama model name
    #[arg(long, default_value = RunOptions::DEFAULT_LLM_MODEL)]
    pub llm_model: String,

    /// Directory to store/load a cached index
    #[arg(long, default_value = RunOptions::DEFAULT_CACHE_DIR)]
    pub cache_dir: PathBuf,

    /// Attempt to load the index from cache if available
    #[arg(long)]
    pub use_cache: bool,

    /// Force rebuild of the index and overwrite the cache
    #[arg(long)]
    pub rebuild: bool,
}

impl From<Cli> for RunOptions {
    fn from(cli: Cli) -> Self {
        Self {
            query: cli.query,
            verbose: cli.verbose,
            dry_run: cli.dry_run,
            embed_model: cli.embed_model,
            llm_model: cli.llm_model,
            cache_dir: cli.cache_dir,
            use_cache: cli.use_cache,
            rebuild: cli.rebuild,
        }
    }
}
