use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned {status}: {body}")]
    Status {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Which concrete backend serves both capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProviderKind {
    #[default]
    Ollama,
    /// Any OpenAI-compatible server (LM Studio, vLLM, OpenAI).
    OpenAi,
}

impl ProviderKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "openai" => Some(Self::OpenAi),
            _ => None,
        }
    }
}

/// Maps text to a fixed-length vector.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// provider name used in logs (e.g. "ollama")
    fn name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;
}

/// Turns a prompt into generated text.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    fn name(&self) -> &str;

    /// check the generation backend is reachable before accepting traffic
    async fn health_check(&self) -> Result<(), LlmError> {
        Ok(())
    }

    /// Empty text is a valid result.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Sends a request and decodes a JSON body, mapping failures onto `LlmError`.
pub(crate) async fn send_json(
    provider: &'static str,
    request: RequestBuilder,
) -> Result<Value, LlmError> {
    let res = request
        .send()
        .await
        .map_err(|source| LlmError::Transport { provider, source })?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(LlmError::Status {
            provider,
            status,
            body,
        });
    }

    res.json::<Value>()
        .await
        .map_err(|e| LlmError::Malformed(format!("{} body is not JSON: {}", provider, e)))
}

/// Reads a JSON array of numbers as an embedding vector.
pub(crate) fn parse_vector(value: Option<&Value>, provider: &str) -> Result<Vec<f32>, LlmError> {
    let items = value
        .and_then(|v| v.as_array())
        .ok_or_else(|| LlmError::Malformed(format!("{} response has no embedding", provider)))?;

    let vector = items
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect::<Option<Vec<f32>>>()
        .ok_or_else(|| {
            LlmError::Malformed(format!("{} embedding contains non-numbers", provider))
        })?;

    if vector.is_empty() {
        return Err(LlmError::Malformed(format!(
            "{} returned an empty embedding",
            provider
        )));
    }
    Ok(vector)
}
