//! Deterministic model doubles for unit tests

use async_trait::async_trait;

use docsum_core::{EmbeddingModel, LLMProvider, Result};

/// Three-dimensional embedding: startup terms, art-school terms, and a constant bias
pub(crate) struct KeywordEmbedding;

impl KeywordEmbedding {
    pub(crate) fn vector_for(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let startup = ["startup", "founder"].iter().filter(|w| lower.contains(*w)).count();
        let art = ["paint", "school"].iter().filter(|w| lower.contains(*w)).count();
        vec![startup as f32, art as f32, 0.1]
    }
}

#[async_trait]
impl EmbeddingModel for KeywordEmbedding {
    fn model_name(&self) -> &str {
        "keyword"
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vector_for(text))
    }

    fn supports_batch(&self) -> bool {
        true
    }
}

/// Returns the prompt it was given
pub(crate) struct EchoLLM;

#[async_trait]
impl LLMProvider for EchoLLM {
    async fn complete(&self, prompt: &str) -> Result<String> {
        Ok(prompt.to_string())
    }

    fn model_id(&self) -> &str {
        "echo"
    }
}
