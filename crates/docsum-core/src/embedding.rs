//! Embedding model trait

use async_trait::async_trait;

use crate::Result;

/// Trait for embedding models (e.g., Hugging Face feature extraction)
///
/// Every model can embed a single query. Batched document embedding is an
/// optional capability: callers check `supports_batch()` before relying on
/// `embed_documents` being efficient or available.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Name of the underlying model
    fn model_name(&self) -> &str;

    /// Embed a single piece of text
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Whether this model exposes a native batched endpoint
    fn supports_batch(&self) -> bool {
        false
    }

    /// Embed a batch of texts, one vector per input, in input order
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed_query(text).await?);
        }
        Ok(vectors)
    }
}
