use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error};

use docsum_cache::{IndexCache, PersistenceCapabilities};
use docsum_cli::{Cli, Collaborators, Pipeline, RunOptions, logging};
use docsum_core::{EmbeddingModel, IndexLibrary, LLMConfig, LLMProvider, Settings};
use docsum_huggingface::HuggingFaceEmbedding;
use docsum_index::{SimpleDirectoryReader, VectorIndexBuilder, VectorIndexLibrary, VectorStoreIndex};
use docsum_ollama::OllamaClient;

const DEFAULT_DATA_DIR: &str = "data";

/// `auto` (default) probes the index library, `raw` pins the blob fallback
fn persistence_capabilities(library: &VectorIndexLibrary) -> PersistenceCapabilities {
    match std::env::var("DOCSUM_PERSISTENCE").as_deref() {
        Ok("raw") => PersistenceCapabilities::raw_only(),
        Ok("auto") | Err(_) => PersistenceCapabilities::detect::<VectorStoreIndex, _>(library),
        Ok(other) => {
            debug!("unknown DOCSUM_PERSISTENCE value {:?}, probing library", other);
            PersistenceCapabilities::detect::<VectorStoreIndex, _>(library)
        }
    }
}

fn collaborators(data_dir: PathBuf) -> Collaborators<VectorStoreIndex, VectorIndexLibrary> {
    let library = VectorIndexLibrary::new();
    let capabilities = persistence_capabilities(&library);
    debug!(library = library.name(), %capabilities, "index library");

    Collaborators {
        documents: Box::new(SimpleDirectoryReader::new(data_dir)),
        builder: Box::new(VectorIndexBuilder::default()),
        cache: IndexCache::with_capabilities(library, capabilities),
        embed_model_factory: Box::new(|name: &str| -> docsum_core::Result<Arc<dyn EmbeddingModel>> {
            Ok(Arc::new(HuggingFaceEmbedding::new(name)?))
        }),
        llm_factory: Box::new(|config: LLMConfig| -> docsum_core::Result<Arc<dyn LLMProvider>> {
            Ok(Arc::new(OllamaClient::from_env(config)?))
        }),
        settings: Settings::new(),
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let data_dir = std::env::var("DOCSUM_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
    let options = RunOptions::from(cli);
    let pipeline = Pipeline::new(collaborators(data_dir));

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    if let Err(e) = pipeline.run(&options, &mut stdout, &mut stderr).await {
        error!("{:#}", e);
        eprintln!("{} {:#}", "Error:".red(), e);
    }
}
