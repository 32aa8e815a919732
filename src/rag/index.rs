//! In-memory vector index over the corpus.
//!
//! Built once at startup and shared read-only afterwards; there is no insert or
//! delete path.

use futures_util::stream::{self, StreamExt, TryStreamExt};
use thiserror::Error;

use super::corpus::{DocumentStore, Passage};
use crate::llm::{EmbeddingClient, LlmError};
use crate::vector_math::SimilarityMetric;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to embed passage {index}: {source}")]
    Embedding {
        index: usize,
        #[source]
        source: LlmError,
    },

    #[error("passage {index} produced an empty embedding")]
    EmptyVector { index: usize },

    #[error("passage {index} has dimension {actual}, expected {expected}")]
    InconsistentDimension {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("query vector has dimension {actual}, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// A passage paired with its similarity to the query (higher = better).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPassage {
    pub passage: Passage,
    pub score: f32,
}

/// Ranked search output, length <= k, best first.
pub type RetrievalResult = Vec<ScoredPassage>;

#[derive(Debug)]
struct IndexedPassage {
    passage: Passage,
    vector: Vec<f32>,
}

#[derive(Debug)]
pub struct VectorIndex {
    entries: Vec<IndexedPassage>,
    dimension: usize,
    metric: SimilarityMetric,
}

impl VectorIndex {
    /// Embeds every passage, running up to `concurrency` calls at a time.
    ///
    /// Any single failure aborts the build; a partial index is never returned.
    pub async fn build(
        store: &DocumentStore,
        embedder: &dyn EmbeddingClient,
        metric: SimilarityMetric,
        concurrency: usize,
    ) -> Result<Self, IndexError> {
        tracing::info!(
            "Embedding {} passages via {} (concurrency {})",
            store.len(),
            embedder.name(),
            concurrency
        );

        let entries: Vec<(Passage, Vec<f32>)> = stream::iter(store.passages())
            .map(|passage| async move {
                embedder
                    .embed(&passage.text)
                    .await
                    .map(|vector| (passage.clone(), vector))
                    .map_err(|source| IndexError::Embedding {
                        index: passage.index,
                        source,
                    })
            })
            .buffered(concurrency.max(1))
            .try_collect()
            .await?;

        Self::from_entries(entries, metric)
    }

    /// Assembles an index from precomputed vectors, checking that all share one dimension.
    pub fn from_entries(
        entries: Vec<(Passage, Vec<f32>)>,
        metric: SimilarityMetric,
    ) -> Result<Self, IndexError> {
        let dimension = entries.first().map(|(_, v)| v.len()).unwrap_or(0);

        let mut indexed = Vec::with_capacity(entries.len());
        for (passage, vector) in entries {
            if vector.is_empty() {
                return Err(IndexError::EmptyVector {
                    index: passage.index,
                });
            }
            if vector.len() != dimension {
                return Err(IndexError::InconsistentDimension {
                    index: passage.index,
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            indexed.push(IndexedPassage { passage, vector });
        }

        Ok(Self {
            entries: indexed,
            dimension,
            metric,
        })
    }

    /// Returns the `k` most similar passages, best first.
    ///
    /// `k` is clamped to the corpus size. Equal scores keep corpus order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<RetrievalResult, IndexError> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(pos, entry)| {
                let score = self.metric.score(query, &entry.vector);
                // Adding 0.0 folds -0.0 into 0.0 so total_cmp treats them as a tie.
                (pos, if score.is_nan() { f32::NEG_INFINITY } else { score + 0.0 })
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k.min(self.entries.len()));

        Ok(scored
            .into_iter()
            .map(|(pos, score)| ScoredPassage {
                passage: self.entries[pos].passage.clone(),
                score,
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }
}
