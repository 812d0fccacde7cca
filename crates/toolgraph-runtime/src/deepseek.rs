//! DeepSeek LLM Provider
//!
//! Implementation of `LlmProvider` for DeepSeek's OpenAI-compatible chat
//! completions API. The rendered prompt is sent as a single user message.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use toolgraph_core::{
    error::{AgentError, Result},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage},
};

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
const DEFAULT_MODEL: &str = "deepseek-chat";

/// DeepSeek provider configuration
#[derive(Clone, Debug)]
pub struct DeepSeekConfig {
    /// Bearer token; may be empty, in which case calls fail with 401
    pub api_key: String,

    /// API base URL without trailing slash
    pub base_url: String,

    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        let generation = GenerationOptions::default();
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            temperature: generation.temperature,
            top_p: generation.top_p,
            max_tokens: generation.max_tokens,
            timeout_secs: 120,
        }
    }
}

impl DeepSeekConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            api_key: lookup("DEEPSEEK_API_KEY").unwrap_or_default(),
            base_url: lookup("DEEPSEEK_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: lookup("DEEPSEEK_MODEL").unwrap_or(defaults.model),
            temperature: parse_var(&lookup, "DEEPSEEK_TEMPERATURE", defaults.temperature),
            top_p: parse_var(&lookup, "DEEPSEEK_TOP_P", defaults.top_p),
            max_tokens: parse_var(&lookup, "DEEPSEEK_MAX_TOKENS", defaults.max_tokens),
            timeout_secs: parse_var(&lookup, "DEEPSEEK_TIMEOUT_SECS", defaults.timeout_secs),
        }
    }

    /// Generation options matching this configuration
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            stop_sequences: Vec::new(),
        }
    }
}

/// Parse a numeric variable, warning and falling back on bad input
pub fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Copy,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid value, using default");
            default
        }),
        None => default,
    }
}

/// Transport-level failures, mapped onto [`AgentError`]
#[derive(Error, Debug)]
enum DeepSeekError {
    #[error("cannot reach {url}: {source}")]
    Connect { url: String, source: reqwest::Error },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<DeepSeekError> for AgentError {
    fn from(err: DeepSeekError) -> Self {
        match err {
            DeepSeekError::Connect { .. } => AgentError::ProviderUnavailable(err.to_string()),
            DeepSeekError::Status { .. } | DeepSeekError::Malformed(_) => {
                AgentError::Provider(err.to_string())
            }
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    model: Option<String>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// DeepSeek LLM provider
pub struct DeepSeekProvider {
    client: Client,
    config: DeepSeekConfig,
}

impl DeepSeekProvider {
    /// Create from configuration
    pub fn from_config(config: DeepSeekConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(DeepSeekConfig::from_env())
    }

    pub fn config(&self) -> &DeepSeekConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    async fn send_chat(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> std::result::Result<Completion, DeepSeekError> {
        let url = self.url("chat/completions");
        let request = ChatRequest {
            model: &options.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
            top_p: options.top_p,
            max_tokens: options.max_tokens,
            stop: (!options.stop_sequences.is_empty()).then_some(options.stop_sequences.as_slice()),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| DeepSeekError::Connect {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeepSeekError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| DeepSeekError::Malformed(e.to_string()))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DeepSeekError::Malformed("no choices".into()))?;

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            model: body.model.unwrap_or_else(|| options.model.clone()),
            usage: body.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason.as_deref().map(FinishReason::parse),
        })
    }
}

#[async_trait]
impl LlmProvider for DeepSeekProvider {
    fn name(&self) -> &str {
        "deepseek"
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.url("models"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await;

        match response {
            Ok(r) if r.status().is_success() => Ok(true),
            Ok(r) => {
                tracing::warn!(status = %r.status(), "DeepSeek health check failed");
                Ok(false)
            }
            Err(e) => {
                tracing::warn!("DeepSeek health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<Completion> {
        tracing::debug!(
            model = %options.model,
            prompt_chars = prompt.chars().count(),
            "Sending chat completion"
        );
        let completion = self.send_chat(prompt, options).await?;
        if let Some(usage) = &completion.usage {
            tracing::debug!(total_tokens = usage.total_tokens, "Chat completion finished");
        }
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = DeepSeekConfig::from_lookup(lookup(&[]));
        assert_eq!(config.base_url, "https://api.deepseek.com/v1");
        assert_eq!(config.model, "deepseek-chat");
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.timeout_secs, 120);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_config_overrides() {
        let config = DeepSeekConfig::from_lookup(lookup(&[
            ("DEEPSEEK_API_KEY", "sk-test"),
            ("DEEPSEEK_API_BASE_URL", "http://localhost:9000/v1/"),
            ("DEEPSEEK_TEMPERATURE", "0.2"),
            ("DEEPSEEK_MAX_TOKENS", "512"),
        ]));
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.generation_options().max_tokens, 512);
    }

    #[test]
    fn test_invalid_number_falls_back() {
        let config = DeepSeekConfig::from_lookup(lookup(&[("DEEPSEEK_TOP_P", "high")]));
        assert_eq!(config.top_p, 0.95);
    }

    #[test]
    fn test_error_mapping() {
        let err: AgentError = DeepSeekError::Status {
            status: 401,
            body: "unauthorized".into(),
        }
        .into();
        assert!(matches!(err, AgentError::Provider(m) if m.contains("401")));

        let err: AgentError = DeepSeekError::Malformed("no choices".into()).into();
        assert!(matches!(err, AgentError::Provider(m) if m.contains("malformed response")));
    }

    #[test]
    fn test_request_omits_empty_stop() {
        let request = ChatRequest {
            model: "deepseek-chat",
            messages: [ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.7,
            top_p: 0.95,
            max_tokens: 16,
            stop: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("stop").is_none());
        assert_eq!(json["messages"][0]["content"], "hi");
    }
}
