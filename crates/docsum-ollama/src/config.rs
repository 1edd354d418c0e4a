//! Ollama configuration

use docsum_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Connection settings for a local Ollama server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub base_url: String,
}

impl OllamaConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let base_url = env::var("OLLAMA_HOST")
            .or_else(|_| env::var("OLLAMA_BASE_URL"))
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string());

        Self::new(base_url)
    }

    /// Create configuration with an explicit server URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base_url(&base_url.into())?;
        Ok(Self { base_url })
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Accept `host:port` as well as full URLs, and drop any trailing slash
fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Configuration("Ollama host must not be empty".to_string()));
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("http://{}", trimmed))
    }
}
