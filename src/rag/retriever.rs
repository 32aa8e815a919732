use std::sync::Arc;

use thiserror::Error;

use super::index::{IndexError, RetrievalResult, VectorIndex};
use crate::llm::{EmbeddingClient, LlmError};

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("query embedding failed: {0}")]
    Embedding(#[source] LlmError),

    #[error("index search failed: {0}")]
    Search(#[source] IndexError),
}

/// Embeds a query and looks it up in the shared index.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingClient>,
    index: Arc<VectorIndex>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingClient>, index: Arc<VectorIndex>) -> Self {
        Self { embedder, index }
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Expects a non-blank query; validation happens upstream. Failures are not retried.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<RetrievalResult, RetrievalError> {
        let query_vector = self
            .embedder
            .embed(query)
            .await
            .map_err(RetrievalError::Embedding)?;

        self.index
            .search(&query_vector, k)
            .map_err(RetrievalError::Search)
    }
}
