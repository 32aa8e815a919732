use thiserror::Error;

use crate::core::config::ConfigError;
use crate::llm::LlmError;
use crate::rag::{CorpusError, IndexError};

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] ConfigError),

    #[error("Failed to initialize LLM provider: {0}")]
    Llm(#[source] LlmError),

    #[error("Failed to load corpus: {0}")]
    Corpus(#[source] CorpusError),

    #[error("Failed to build vector index: {0}")]
    Index(#[source] IndexError),
}
