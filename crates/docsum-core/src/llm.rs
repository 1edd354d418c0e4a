//! LLM provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Result;

/// Construction parameters for a language model client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model_id: String,
    pub request_timeout: Duration,
    pub context_window: usize,
}

impl LLMConfig {
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(360);
    pub const DEFAULT_CONTEXT_WINDOW: usize = 8000;

    /// Create a config for `model_id` with the default timeout and context window
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            context_window: Self::DEFAULT_CONTEXT_WINDOW,
        }
    }
}

/// Trait for LLM providers (e.g., Ollama)
///
/// The driver never calls this directly; it is consumed by query engines that
/// turn retrieved context plus a question into a prompt.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Complete a prompt and return the generated text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_defaults() {
        let config = LLMConfig::new("llama3.1");
        assert_eq!(config.model_id, "llama3.1");
        assert_eq!(config.request_timeout, Duration::from_secs(360));
        assert_eq!(config.context_window, 8000);
    }
}
