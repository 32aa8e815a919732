use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};

use super::provider::{parse_vector, send_json, EmbeddingClient, GenerationClient, LlmError};
use super::types::ChatMessage;
use crate::core::config::LlmSettings;

const PROVIDER: &str = "openai";

/// OpenAI-compatible HTTP API (LM Studio, vLLM, llama.cpp server, OpenAI itself).
#[derive(Clone)]
pub struct OpenAiProvider {
    base_url: String,
    client: Client,
    api_key: Option<String>,
    embedding_model: String,
    generation_model: String,
    temperature: Option<f64>,
}

impl OpenAiProvider {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|source| LlmError::Transport {
                provider: PROVIDER,
                source,
            })?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
            api_key: settings.api_key.clone(),
            embedding_model: settings.embedding_model.clone(),
            generation_model: settings.generation_model.clone(),
            temperature: settings.temperature,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn chat_body(&self, prompt: &str) -> Value {
        let mut body = json!({
            "model": self.generation_model,
            "messages": [ChatMessage::user(prompt)],
            "stream": false,
        });
        if let (Some(t), Some(obj)) = (self.temperature, body.as_object_mut()) {
            obj.insert("temperature".to_string(), json!(t));
        }
        body
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let url = format!("{}/v1/embeddings", self.base_url);
        let body = json!({
            "model": self.embedding_model,
            "input": text,
        });

        let request = self.authorized(self.client.post(&url).json(&body));
        let payload = send_json(PROVIDER, request).await?;
        parse_vector(payload.pointer("/data/0/embedding"), PROVIDER)
    }
}

#[async_trait]
impl GenerationClient for OpenAiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        let url = format!("{}/v1/models", self.base_url);
        match self.authorized(self.client.get(&url)).send().await {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(LlmError::Unavailable(format!(
                "{} answered {} at {}",
                PROVIDER,
                resp.status(),
                url
            ))),
            Err(e) => Err(LlmError::Unavailable(format!(
                "{} not reachable at {}: {}",
                PROVIDER, url, e
            ))),
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = self.authorized(self.client.post(&url).json(&self.chat_body(prompt)));

        let payload = send_json(PROVIDER, request).await?;
        payload
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| LlmError::Malformed("chat completion has no message content".into()))
    }
}
