//! Hugging Face feature-extraction client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docsum_core::{EmbeddingModel, Error, Result};

use crate::config::HuggingFaceConfig;

/// Embedding model served by a Hugging Face feature-extraction endpoint
pub struct HuggingFaceEmbedding {
    config: HuggingFaceConfig,
    model_name: String,
    client: Client,
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
}

/// Sentence models return one vector per input; token-level models return
/// one vector per token and are mean-pooled here.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum FeatureExtractionResponse {
    Sentence(Vec<Vec<f32>>),
    Token(Vec<Vec<Vec<f32>>>),
}

impl FeatureExtractionResponse {
    pub(crate) fn into_vectors(self) -> Vec<Vec<f32>> {
        match self {
            FeatureExtractionResponse::Sentence(vectors) => vectors,
            FeatureExtractionResponse::Token(per_input) => {
                per_input.into_iter().map(|tokens| mean_pool(&tokens)).collect()
            }
        }
    }
}

fn mean_pool(tokens: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = tokens.first() else {
        return Vec::new();
    };

    let mut pooled = vec![0.0; first.len()];
    for token in tokens {
        for (acc, value) in pooled.iter_mut().zip(token) {
            *acc += value;
        }
    }

    let count = tokens.len() as f32;
    pooled.iter_mut().for_each(|v| *v /= count);
    pooled
}

impl HuggingFaceEmbedding {
    /// Model constants
    pub const BGE_BASE_EN_V1_5: &'static str = "BAAI/bge-base-en-v1.5";

    /// Create a client for `model_name` using environment configuration
    pub fn new(model_name: impl Into<String>) -> Result<Self> {
        Self::with_config(model_name, HuggingFaceConfig::from_env())
    }

    /// Create a client for `model_name` with explicit configuration
    pub fn with_config(model_name: impl Into<String>, config: HuggingFaceConfig) -> Result<Self> {
        let model_name = model_name.into();
        if model_name.trim().is_empty() {
            return Err(Error::Configuration("embedding model name must not be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            model_name,
            client,
        })
    }

    pub(crate) fn endpoint(&self) -> String {
        format!(
            "{}/pipeline/feature-extraction/{}",
            self.config.api_url, self.model_name
        )
    }

    async fn request_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint();
        debug!(model = %self.model_name, inputs = texts.len(), "requesting embeddings");

        let mut request = self
            .client
            .post(&url)
            .json(&FeatureExtractionRequest { inputs: texts });

        if let Some(ref token) = self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Embedding(format!(
                "feature extraction failed with status {}: {}",
                status, error_text
            )));
        }

        let body: FeatureExtractionResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let vectors = body.into_vectors();
        if vectors.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings from {}, got {}",
                texts.len(),
                self.model_name,
                vectors.len()
            )));
        }

        Ok(vectors)
    }
}

#[async_trait]
impl EmbeddingModel for HuggingFaceEmbedding {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.request_embeddings(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::Embedding("empty embedding response".to_string()))
    }

    fn supports_batch(&self) -> bool {
        true
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.request_embeddings(texts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_includes_model_path() {
        let config = HuggingFaceConfig::new("http://localhost:8080/");
        let model = HuggingFaceEmbedding::with_config(HuggingFaceEmbedding::BGE_BASE_EN_V1_5, config).unwrap();

        assert_eq!(
            model.endpoint(),
            "http://localhost:8080/pipeline/feature-extraction/BAAI/bge-base-en-v1.5"
        );
        assert!(model.supports_batch());
    }

    #[test]
    fn test_empty_model_name_rejected() {
        let result = HuggingFaceEmbedding::with_config("  ", HuggingFaceConfig::default());
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_sentence_response_passes_through() {
        let body: FeatureExtractionResponse = serde_json::from_str("[[0.1, 0.2], [0.3, 0.4]]").unwrap();
        assert_eq!(body.into_vectors(), vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[test]
    fn test_token_response_is_mean_pooled() {
        let body: FeatureExtractionResponse =
            serde_json::from_str("[[[1.0, 2.0], [3.0, 4.0]], [[2.0, 2.0]]]").unwrap();
        assert_eq!(body.into_vectors(), vec![vec![2.0, 3.0], vec![2.0, 2.0]]);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        let config = HuggingFaceConfig::new("http://127.0.0.1:9");
        let model = HuggingFaceEmbedding::with_config("any/model", config).unwrap();

        let vectors = model.embed_documents(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
