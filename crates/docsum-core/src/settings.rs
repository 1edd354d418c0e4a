//! Process-wide model settings handed to builders and query engines

use std::fmt;
use std::sync::Arc;

use crate::{EmbeddingModel, Error, LLMProvider, Result};

/// The embedding model and LLM in use for a run
///
/// Either slot may be filled ahead of time (for example by a test) so that the
/// driver skips constructing that model.
#[derive(Clone, Default)]
pub struct Settings {
    pub embed_model: Option<Arc<dyn EmbeddingModel>>,
    pub llm: Option<Arc<dyn LLMProvider>>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_embed_model(mut self, model: Arc<dyn EmbeddingModel>) -> Self {
        self.embed_model = Some(model);
        self
    }

    pub fn with_llm(mut self, llm: Arc<dyn LLMProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// The configured embedding model, or a configuration error
    pub fn embed_model(&self) -> Result<Arc<dyn EmbeddingModel>> {
        self.embed_model
            .clone()
            .ok_or_else(|| Error::Configuration("embedding model not configured".to_string()))
    }

    /// The configured LLM, or a configuration error
    pub fn llm(&self) -> Result<Arc<dyn LLMProvider>> {
        self.llm
            .clone()
            .ok_or_else(|| Error::Configuration("LLM not configured".to_string()))
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("embed_model", &self.embed_model.as_ref().map(|m| m.model_name().to_string()))
            .field("llm", &self.llm.as_ref().map(|l| l.model_id().to_string()))
            .finish()
    }
}
