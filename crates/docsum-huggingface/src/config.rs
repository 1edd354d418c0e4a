//! Hugging Face inference configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Endpoint and credentials for feature-extraction requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuggingFaceConfig {
    pub api_url: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub timeout: Duration,
}

impl HuggingFaceConfig {
    pub const DEFAULT_API_URL: &'static str = "https://api-inference.huggingface.co";

    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_url = env::var("HF_INFERENCE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_API_URL.to_string());

        let token = env::var("HF_TOKEN")
            .or_else(|_| env::var("HUGGINGFACEHUB_API_TOKEN"))
            .ok()
            .filter(|t| !t.trim().is_empty());

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            ..Default::default()
        }
    }

    /// Create configuration with an explicit endpoint
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(60),
        }
    }
}
