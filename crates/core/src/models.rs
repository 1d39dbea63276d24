//! # Medresearch Models
//!
//! Centralized LLM configuration and the capability seams the pipeline is
//! built against. The research engine never talks to a provider SDK directly;
//! it only sees the [`LanguageModel`] and [`SearchProvider`] traits, so both
//! can be swapped for scripted doubles in tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Supported LLM providers
///
/// Each provider loads its API key from an environment variable:
/// - OpenAI (GPT) - `OPENAI_API_KEY`
/// - Anthropic (Claude) - `ANTHROPIC_API_KEY`
/// - Gemini (Google) - `GOOGLE_API_KEY`
/// - Ollama (local) - no key, `OLLAMA_BASE_URL` overrides the endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    #[serde(rename = "openai")]
    OpenAI,
    Anthropic,
    Gemini,
    Ollama,
}

impl LlmProvider {
    /// Environment variable holding the provider API key, if one is required
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            LlmProvider::OpenAI => Some("OPENAI_API_KEY"),
            LlmProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
            LlmProvider::Gemini => Some("GOOGLE_API_KEY"),
            LlmProvider::Ollama => None,
        }
    }

    /// Default API endpoint for the provider
    ///
    /// Gemini is reached through its OpenAI-compatible surface so a single
    /// chat-completions code path covers every non-Anthropic provider.
    pub fn default_base_url(&self) -> String {
        match self {
            LlmProvider::OpenAI => "https://api.openai.com".to_string(),
            LlmProvider::Anthropic => "https://api.anthropic.com".to_string(),
            LlmProvider::Gemini => {
                "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
            }
            LlmProvider::Ollama => std::env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
        }
    }
}

/// Which model a research run talks to
///
/// ## Example
/// ```rust,ignore
/// use medresearch_core::models::{LlmProvider, ModelConfig};
///
/// let config = ModelConfig::with_provider(LlmProvider::Anthropic, "claude-sonnet-4-20250514");
/// let llm = config.connect()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub provider: LlmProvider,
    /// Model name, e.g. "gpt-4o" or "claude-sonnet-4-20250514"
    pub model: String,
    /// Base URL override for self-hosted or proxy endpoints
    pub base_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            model: "gpt-4o".to_string(),
            base_url: None,
        }
    }
}

impl ModelConfig {
    /// Config for a specific provider and model
    pub fn with_provider(provider: LlmProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            base_url: None,
        }
    }

    /// Point the config at a non-default endpoint
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Build the language model client this config describes
    pub fn connect(&self) -> anyhow::Result<Arc<dyn LanguageModel>> {
        Ok(Arc::new(crate::tools::ChatClient::new(self.clone())?))
    }
}

/// The generation capability the pipeline depends on.
///
/// Prompt construction lives in the skills; the model is an opaque
/// `generate(prompt) -> text` boundary.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for a plain prompt
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;

    /// Generate a completion with a system instruction
    async fn generate_with_system(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        self.generate(&format!("{system}\n\n{prompt}")).await
    }
}

/// One literature record returned by a search provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRecord {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub pubdate: Option<String>,
}

/// The literature-search capability the pipeline depends on.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a search and return matching records, best first
    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert!(config.model.contains("gpt"));
    }

    #[test]
    fn test_api_key_env() {
        assert_eq!(LlmProvider::Anthropic.api_key_env(), Some("ANTHROPIC_API_KEY"));
        assert!(LlmProvider::Ollama.api_key_env().is_none());
    }

    #[test]
    fn test_model_config_serialization() {
        let config = ModelConfig::with_provider(LlmProvider::Anthropic, "claude-sonnet-4-20250514");
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("anthropic"));
        assert!(json.contains("claude-sonnet-4-20250514"));
    }

    #[test]
    fn test_provider_roundtrip() {
        let json = serde_json::to_string(&LlmProvider::OpenAI).unwrap();
        assert_eq!(json, "\"openai\"");
        let back: LlmProvider = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LlmProvider::OpenAI);
    }
}
