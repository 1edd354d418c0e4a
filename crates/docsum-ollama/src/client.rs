//! Ollama client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::debug;

use docsum_core::{Error, LLMConfig, LLMProvider, Result};

use crate::config::OllamaConfig;

/// Ollama client
pub struct OllamaClient {
    config: OllamaConfig,
    llm: LLMConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateOptions {
    pub num_ctx: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    /// Model constants
    pub const LLAMA_3_1: &'static str = "llama3.1";

    /// Create a new Ollama client for the model described by `llm`
    pub fn new(config: OllamaConfig, llm: LLMConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(llm.request_timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, llm, client })
    }

    /// Create a new Ollama client from environment variables
    pub fn from_env(llm: LLMConfig) -> Result<Self> {
        let config = OllamaConfig::from_env()?;
        Self::new(config, llm)
    }

    /// Context window requested from the server
    pub fn context_window(&self) -> usize {
        self.llm.context_window
    }

    pub(crate) fn build_request(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: self.llm.model_id.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: GenerateOptions {
                num_ctx: self.llm.context_window,
            },
        }
    }

    /// Perform the actual generation request
    async fn perform_generation(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.config.base_url);
        debug!(model = %self.llm.model_id, %url, "sending generate request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::LLMProvider(format!(
                "Ollama request failed with status {}: {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let answer = clean_answer(&body.response);
        if answer.is_empty() {
            return Err(Error::LLMProvider(format!(
                "Empty response from Ollama model {}",
                self.llm.model_id
            )));
        }

        Ok(answer)
    }
}

/// Trim whitespace and a leading "Answer:" label
pub(crate) fn clean_answer(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("Answer:")
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

#[async_trait]
impl LLMProvider for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        match timeout(self.llm.request_timeout, self.perform_generation(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "Ollama request exceeded {}s",
                self.llm.request_timeout.as_secs()
            ))),
        }
    }

    fn model_id(&self) -> &str {
        &self.llm.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_answer() {
        assert_eq!(clean_answer("  Answer: an essay about startups \n"), "an essay about startups");
        assert_eq!(clean_answer("plain text"), "plain text");
        assert_eq!(clean_answer("   "), "");
    }

    #[test]
    fn test_client_uses_llm_config() {
        let client = OllamaClient::new(OllamaConfig::default(), LLMConfig::new("mistral")).unwrap();
        assert_eq!(client.model_id(), "mistral");
        assert_eq!(client.context_window(), 8000);
    }
}
