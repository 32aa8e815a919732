use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;

use super::defaults::*;
use crate::llm::ProviderKind;
use crate::vector_math::SimilarityMetric;

const DEFAULT_OPENAI_URL: &str = "http://localhost:1234";

/// Typed view over the validated YAML configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub rag: RagSettings,
    pub llm: LlmSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RagSettings {
    pub top_k: usize,
    pub metric: SimilarityMetric,
    /// `None` selects the built-in corpus.
    pub corpus_path: Option<PathBuf>,
    pub embed_concurrency: usize,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: ProviderKind,
    pub base_url: String,
    pub embedding_model: String,
    pub generation_model: String,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub temperature: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Value::Null)
    }
}

impl Settings {
    /// Reads settings from an already validated config tree, falling back to defaults
    /// for every missing key.
    pub fn from_config(config: &Value) -> Self {
        let server = config.get("server");
        let rag = config.get("rag");
        let llm = config.get("llm");

        let provider = str_field(llm, "provider")
            .and_then(|v| ProviderKind::parse(&v))
            .unwrap_or_default();
        let default_url = match provider {
            ProviderKind::Ollama => DEFAULT_OLLAMA_URL,
            ProviderKind::OpenAi => DEFAULT_OPENAI_URL,
        };

        Settings {
            server: ServerSettings {
                host: str_field(server, "host").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: u64_field(server, "port")
                    .and_then(|v| u16::try_from(v).ok())
                    .unwrap_or(DEFAULT_PORT),
                cors_allowed_origins: server
                    .and_then(|s| s.get("cors_allowed_origins"))
                    .and_then(|v| v.as_array())
                    .map(|list| {
                        list.iter()
                            .filter_map(|item| item.as_str())
                            .map(str::trim)
                            .filter(|item| !item.is_empty())
                            .map(|item| item.to_string())
                            .collect::<Vec<_>>()
                    })
                    .filter(|origins| !origins.is_empty())
                    .unwrap_or_else(default_cors_origins),
            },
            rag: RagSettings {
                top_k: u64_field(rag, "top_k")
                    .map(|v| v as usize)
                    .unwrap_or(DEFAULT_TOP_K),
                metric: str_field(rag, "metric")
                    .and_then(|v| SimilarityMetric::parse(&v))
                    .unwrap_or_default(),
                corpus_path: str_field(rag, "corpus_path").map(PathBuf::from),
                embed_concurrency: u64_field(rag, "embed_concurrency")
                    .map(|v| v as usize)
                    .unwrap_or(DEFAULT_EMBED_CONCURRENCY),
            },
            llm: LlmSettings {
                provider,
                base_url: str_field(llm, "base_url")
                    .unwrap_or_else(|| default_url.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                embedding_model: str_field(llm, "embedding_model")
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
                generation_model: str_field(llm, "generation_model")
                    .unwrap_or_else(|| DEFAULT_GENERATION_MODEL.to_string()),
                api_key: str_field(llm, "api_key").filter(|key| !key.is_empty()),
                request_timeout: Duration::from_secs(
                    u64_field(llm, "request_timeout_secs").unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
                ),
                temperature: llm
                    .and_then(|l| l.get("temperature"))
                    .and_then(|v| v.as_f64()),
            },
        }
    }

    /// `PORT` and `OLLAMA_BASE_URL` win over the file, matching how the service is
    /// usually launched next to a local Ollama daemon.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").and_then(|v| v.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }
        if self.llm.provider == ProviderKind::Ollama {
            if let Some(url) = lookup("OLLAMA_BASE_URL").filter(|v| !v.trim().is_empty()) {
                self.llm.base_url = url.trim().trim_end_matches('/').to_string();
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn str_field(section: Option<&Value>, key: &str) -> Option<String> {
    section
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
}

fn u64_field(section: Option<&Value>, key: &str) -> Option<u64> {
    section.and_then(|s| s.get(key)).and_then(|v| v.as_u64())
}
