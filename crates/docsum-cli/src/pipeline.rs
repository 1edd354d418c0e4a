//! The run pipeline: load documents, get an index, answer the query

use anyhow::Context;
use colored::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use docsum_cache::IndexCache;
use docsum_core::{
    Document, DocumentSource, EmbeddingModel, IndexBuilder, IndexHandle, IndexLibrary, LLMConfig,
    LLMProvider, Response, Settings,
};

/// Builds the embedding model from its name
pub type EmbedModelFactory = Box<dyn Fn(&str) -> docsum_core::Result<Arc<dyn EmbeddingModel>> + Send + Sync>;

/// Builds the language model from its config
pub type LLMFactory = Box<dyn Fn(LLMConfig) -> docsum_core::Result<Arc<dyn LLMProvider>> + Send + Sync>;

const EMBED_BATCH_SIZE: usize = 16;
const SNIPPET_CHARS: usize = 500;

/// Parameters of a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub query: String,
    pub verbose: bool,
    pub dry_run: bool,
    pub embed_model: String,
    pub llm_model: String,
    pub cache_dir: PathBuf,
    pub use_cache: bool,
    pub rebuild: bool,
}

impl RunOptions {
    pub const DEFAULT_QUERY: &'static str = "What is this document about?";
    pub const DEFAULT_EMBED_MODEL: &'static str = "BAAI/bge-base-en-v1.5";
    pub const DEFAULT_LLM_MODEL: &'static str = "llama3.1";
    pub const DEFAULT_CACHE_DIR: &'static str = ".index_cache";
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            query: Self::DEFAULT_QUERY.to_string(),
            verbose: false,
            dry_run: false,
            embed_model: Self::DEFAULT_EMBED_MODEL.to_string(),
            llm_model: Self::DEFAULT_LLM_MODEL.to_string(),
            cache_dir: PathBuf::from(Self::DEFAULT_CACHE_DIR),
            use_cache: false,
            rebuild: false,
        }
    }
}

/// Everything the pipeline talks to
pub struct Collaborators<I, L> {
    pub documents: Box<dyn DocumentSource>,
    pub builder: Box<dyn IndexBuilder<I>>,
    pub cache: IndexCache<I, L>,
    pub embed_model_factory: EmbedModelFactory,
    pub llm_factory: LLMFactory,
    /// Models already configured here are used as-is
    pub settings: Settings,
}

pub struct Pipeline<I, L> {
    collaborators: Collaborators<I, L>,
}

impl<I, L> Pipeline<I, L>
where
    I: IndexHandle + Serialize + DeserializeOwned,
    L: IndexLibrary<I>,
{
    pub fn new(collaborators: Collaborators<I, L>) -> Self {
        Self { collaborators }
    }

    /// Run once, writing results to `out` and query failures to `err`
    ///
    /// Only document loading and a twice-failed index build return an error.
    pub async fn run<O, E>(&self, options: &RunOptions, out: &mut O, err: &mut E) -> anyhow::Result<()>
    where
        O: Write,
        E: Write,
    {
        info!("Loading documents");
        let documents = self
            .collaborators
            .documents
            .load_data()
            .context("Failed to load documents")?;
        info!("Loaded {} document(s)", documents.len());

        let mut index = None;
        if options.use_cache && !options.rebuild {
            info!("Attempting to load index from cache: {}", options.cache_dir.display());
            index = self.collaborators.cache.load_index(&options.cache_dir);
            if index.is_some() {
                info!("Loaded index from cache");
            }
        }

        if options.dry_run {
            info!("Dry run enabled: skipping model initialization and query execution");
            return report_dry_run(index.as_ref(), &documents, options, out);
        }

        let settings = self.settings(options)?;

        let index = match index {
            Some(index) => index,
            None => {
                let index = self.build_index(&documents, &settings).await?;
                if options.use_cache {
                    if self.collaborators.cache.save_index(&index, &options.cache_dir) {
                        info!("Saved index to cache at {}", options.cache_dir.display());
                    } else {
                        warn!("Failed to save index to cache; continuing without cache");
                    }
                }
                index
            }
        };

        info!("Running query: {}", options.query);
        match query(&index, &settings, &options.query).await {
            Ok(response) => writeln!(out, "{}", response)?,
            Err(e) => {
                error!("Query failed: {}", e);
                writeln!(err, "{} {}", "Query failed:".red(), e)?;
            }
        }

        Ok(())
    }

    /// Fill whichever model slots are still empty
    fn settings(&self, options: &RunOptions) -> anyhow::Result<Settings> {
        let mut settings = self.collaborators.settings.clone();
        info!(
            "Initializing embedding model ({}) and LLM ({})",
            options.embed_model, options.llm_model
        );

        if settings.embed_model.is_none() {
            let model = (self.collaborators.embed_model_factory)(&options.embed_model)
                .context("Failed to initialize embedding model")?;
            settings = settings.with_embed_model(model);
        }

        if settings.llm.is_none() {
            let llm = (self.collaborators.llm_factory)(LLMConfig::new(&options.llm_model))
                .context("Failed to initialize LLM")?;
            settings = settings.with_llm(llm);
        }

        Ok(settings)
    }

    async fn build_index(&self, documents: &[Document], settings: &Settings) -> anyhow::Result<I> {
        info!("Building index from documents (will compute embeddings)");
        match self.build_with_progress(documents, settings).await {
            Ok(index) => Ok(index),
            Err(e) => {
                error!("Error during index building ({}); falling back to default builder", e);
                self.collaborators
                    .builder
                    .from_documents(documents, settings)
                    .await
                    .context("Failed to build index")
            }
        }
    }

    async fn build_with_progress(&self, documents: &[Document], settings: &Settings) -> docsum_core::Result<I> {
        let embed_model = settings.embed_model()?;

        if embed_model.supports_batch() {
            let texts: Vec<String> = documents.iter().map(|d| d.get_content().to_string()).collect();
            let batches: Vec<&[String]> = texts.chunks(EMBED_BATCH_SIZE).collect();
            let total = batches.len();
            for (i, batch) in batches.into_iter().enumerate() {
                info!("Embedding batches {}/{}", i + 1, total);
                embed_model.embed_documents(batch).await?;
            }
        }

        self.collaborators.builder.from_documents(documents, settings).await
    }
}

fn report_dry_run<I, O>(index: Option<&I>, documents: &[Document], options: &RunOptions, out: &mut O) -> anyhow::Result<()>
where
    I: IndexHandle,
    O: Write,
{
    if let Some(index) = index {
        writeln!(out, "Cached index found at: {}", options.cache_dir.display())?;
        writeln!(out, "Cached index type: {}", index.type_name())?;
        writeln!(out, "Document count (may be approximate): {}", index.document_count())?;
    } else if let Some(first) = documents.first() {
        let snippet: String = first.get_content().chars().take(SNIPPET_CHARS).collect();
        writeln!(out, "First document snippet:")?;
        writeln!(out, "{}", snippet)?;
    }
    writeln!(out, "Document count: {}", documents.len())?;
    debug!("dry run finished");
    Ok(())
}

async fn query<I: IndexHandle>(index: &I, settings: &Settings, text: &str) -> docsum_core::Result<Response> {
    let engine = index.as_query_engine(settings)?;
    engine.query(text).await
}
