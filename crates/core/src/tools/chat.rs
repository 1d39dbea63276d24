//! # Chat Client
//!
//! Minimal chat-completion client behind the [`LanguageModel`] seam.
//! OpenAI, Gemini (via its OpenAI-compatible surface), and Ollama share the
//! chat-completions wire format; Anthropic uses its messages API.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::json;

use crate::models::{LanguageModel, LlmProvider, ModelConfig};

const REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_TOKENS: u32 = 4096;
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// HTTP chat-completion client for the configured provider
pub struct ChatClient {
    config: ModelConfig,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ChatClient {
    /// Build a client, reading the provider API key from the environment
    pub fn new(config: ModelConfig) -> Result<Self> {
        let api_key = match config.provider.api_key_env() {
            Some(var) => Some(
                std::env::var(var).map_err(|_| anyhow!("{var} is not set"))?,
            ),
            None => None,
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    fn base_url(&self) -> String {
        self.config
            .base_url
            .clone()
            .unwrap_or_else(|| self.config.provider.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    async fn messages_api(&self, system: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/messages", self.base_url());
        let mut body = json!({
            "model": self.config.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{"role": "user", "content": prompt}],
        });
        if !system.is_empty() {
            body["system"] = json!(system);
        }

        let mut request = self
            .client
            .post(&url)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response: serde_json::Value = request
            .send()
            .await
            .context("anthropic request failed")?
            .error_for_status()
            .context("anthropic returned an error status")?
            .json()
            .await
            .context("failed to parse anthropic response")?;

        response["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("anthropic response carried no text content"))
    }

    async fn chat_completions(&self, system: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url());

        let mut messages = Vec::new();
        if !system.is_empty() {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": prompt}));

        let mut request = self.client.post(&url).json(&json!({
            "model": self.config.model,
            "messages": messages,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response: serde_json::Value = request
            .send()
            .await
            .context("chat completion request failed")?
            .error_for_status()
            .context("chat endpoint returned an error status")?
            .json()
            .await
            .context("failed to parse chat completion response")?;

        response["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("chat completion carried no content"))
    }
}

#[async_trait]
impl LanguageModel for ChatClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        match self.config.provider {
            LlmProvider::Anthropic => self.messages_api(system, prompt).await,
            _ => self.chat_completions(system, prompt).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_override() {
        let config = ModelConfig::with_provider(LlmProvider::Ollama, "llama3")
            .with_base_url("http://127.0.0.1:9999/");
        let client = ChatClient::new(config).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn test_ollama_needs_no_api_key() {
        let config = ModelConfig::with_provider(LlmProvider::Ollama, "llama3");
        let client = ChatClient::new(config).unwrap();
        assert!(client.api_key.is_none());
    }
}
