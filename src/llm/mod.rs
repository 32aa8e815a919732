pub mod ollama;
pub mod openai;
pub mod provider;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use provider::{EmbeddingClient, GenerationClient, LlmError, ProviderKind};
pub use types::{ChatMessage, Role};

use crate::core::config::LlmSettings;

/// The two capabilities the pipeline consumes, backed by the configured provider.
#[derive(Clone)]
pub struct LlmClients {
    pub embedder: Arc<dyn EmbeddingClient>,
    pub generator: Arc<dyn GenerationClient>,
}

impl LlmClients {
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        match settings.provider {
            ProviderKind::Ollama => {
                let provider = Arc::new(OllamaProvider::new(settings)?);
                Ok(Self {
                    embedder: provider.clone(),
                    generator: provider,
                })
            }
            ProviderKind::OpenAi => {
                let provider = Arc::new(OpenAiProvider::new(settings)?);
                Ok(Self {
                    embedder: provider.clone(),
                    generator: provider,
                })
            }
        }
    }
}
