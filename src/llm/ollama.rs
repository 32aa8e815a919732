use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::{parse_vector, send_json, EmbeddingClient, GenerationClient, LlmError};
use crate::core::config::LlmSettings;

const PROVIDER: &str = "ollama";

/// Ollama daemon serving both embeddings and completions.
#[derive(Clone)]
pub struct OllamaProvider {
    base_url: String,
    client: Client,
    embedding_model: String,
    generation_model: String,
    temperature: Option<f64>,
}

impl OllamaProvider {
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
            embedding_model: settings.embedding_model.clone(),
            generation_model: settings.generation_model.clone(),
            temperature: settings.temperature,
        })
    }

    fn generate_body(&self, prompt: &str) -> Value {
        let mut body = json!({
            "model": self.generation_model,
            "prompt": prompt,
            "stream": false,
        });
        if let (Some(t), Some(obj)) = (self.temperature, body.as_object_mut()) {
            obj.insert("options".to_string(), json!({ "temperature": t }));
        }
        body
    }
}

#[async_trait]
impl EmbeddingClient for OllamaProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let body = json!({
            "model": self.embedding_model,
            "prompt": text,
        });

        let payload = send_json(PROVIDER, self.client.post(&url).json(&body)).await?;
        parse_vector(payload.get("embedding"), PROVIDER)
    }
}

#[async_trait]
impl GenerationClient for OllamaProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
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
        let url = format!("{}/api/generate", self.base_url);
        let body = self.generate_body(prompt);

        let payload = send_json(PROVIDER, self.client.post(&url).json(&body)).await?;
        payload
            .get("response")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| LlmError::Malformed("ollama response has no 'response' field".into()))
    }
}
