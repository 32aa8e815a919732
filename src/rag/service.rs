//! End-to-end answer pipeline for one request.
//!
//! Stages run strictly in order: `Validating -> Retrieving -> Prompting ->
//! Generating -> Responding`. Any stage may end the request with a `RagError`.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::prompt::PromptBuilder;
use super::retriever::{RetrievalError, Retriever};
use crate::llm::{ChatMessage, GenerationClient, LlmError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Validating,
    Retrieving,
    Prompting,
    Generating,
    Responding,
}

#[derive(Debug, Error)]
pub enum RagError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("retrieval failed: {0}")]
    RetrievalFailure(#[source] RetrievalError),

    #[error("generation failed: {0}")]
    GenerationFailure(#[source] LlmError),
}

impl RagError {
    /// The stage the request was in when it failed.
    pub fn stage(&self) -> RequestStage {
        match self {
            RagError::InvalidRequest(_) => RequestStage::Validating,
            RagError::RetrievalFailure(_) => RequestStage::Retrieving,
            RagError::GenerationFailure(_) => RequestStage::Generating,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, RagError::InvalidRequest(_))
    }
}

/// Generated answer plus the passages it was conditioned on, in retrieval order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub sources: Vec<String>,
}

pub struct RagService {
    retriever: Retriever,
    prompt_builder: PromptBuilder,
    generator: Arc<dyn GenerationClient>,
    top_k: usize,
}

impl RagService {
    pub fn new(retriever: Retriever, generator: Arc<dyn GenerationClient>, top_k: usize) -> Self {
        Self {
            retriever,
            prompt_builder: PromptBuilder::default(),
            generator,
            top_k,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Answers the latest turn of `history`.
    ///
    /// Validation runs before any external call. Collaborator failures are not
    /// retried and no partial answer is produced.
    pub async fn answer(&self, history: &[ChatMessage]) -> Result<AnswerResponse, RagError> {
        let result = self.run(history).await;
        if let Err(err) = &result {
            tracing::debug!("Request failed during {:?}", err.stage());
        }
        result
    }

    async fn run(&self, history: &[ChatMessage]) -> Result<AnswerResponse, RagError> {
        tracing::debug!("Stage: {:?}", RequestStage::Validating);
        let query = validate(history)?;

        tracing::debug!("Stage: {:?}", RequestStage::Retrieving);
        let retrieved = self
            .retriever
            .retrieve(query, self.top_k)
            .await
            .map_err(RagError::RetrievalFailure)?;
        for hit in &retrieved {
            tracing::debug!("Passage {} scored {:.4}", hit.passage.index, hit.score);
        }
        let sources: Vec<String> = retrieved.into_iter().map(|hit| hit.passage.text).collect();
        tracing::info!("Retrieved {} context passages", sources.len());

        tracing::debug!("Stage: {:?}", RequestStage::Prompting);
        let prompt = self.prompt_builder.build(history, &sources);

        tracing::debug!("Stage: {:?}", RequestStage::Generating);
        let raw = self
            .generator
            .generate(&prompt)
            .await
            .map_err(RagError::GenerationFailure)?;

        tracing::debug!("Stage: {:?}", RequestStage::Responding);
        Ok(AnswerResponse {
            answer: raw.trim().to_string(),
            sources,
        })
    }
}

/// Returns the latest turn's content once the history is known to be answerable.
fn validate(history: &[ChatMessage]) -> Result<&str, RagError> {
    let last = history
        .last()
        .ok_or_else(|| RagError::InvalidRequest("messages cannot be empty".to_string()))?;

    let query = last.content.trim();
    if query.is_empty() {
        return Err(RagError::InvalidRequest(
            "last message cannot be empty".to_string(),
        ));
    }
    Ok(query)
}
