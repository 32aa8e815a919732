//! Retrieval-augmented answering over a fixed corpus.
//!
//! - `DocumentStore`: the corpus, one passage per entry
//! - `VectorIndex`: passage embeddings with similarity search
//! - `Retriever`: query embedding + index lookup
//! - `PromptBuilder`: history and context rendered into one prompt
//! - `RagService`: the per-request pipeline

pub mod corpus;
pub mod index;
pub mod prompt;
pub mod retriever;
pub mod service;

pub use corpus::{CorpusError, DocumentStore, Passage};
pub use index::{IndexError, RetrievalResult, ScoredPassage, VectorIndex};
pub use prompt::PromptBuilder;
pub use retriever::{RetrievalError, Retriever};
pub use service::{AnswerResponse, RagError, RagService, RequestStage};
