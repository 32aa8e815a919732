use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::config::{ConfigService, Settings};
use crate::llm::LlmClients;
use crate::rag::{DocumentStore, RagService, Retriever, VectorIndex};

pub mod error;

use error::InitializationError;

/// Process-wide ready state shared by every request.
///
/// Contains:
/// - Typed settings
/// - The RAG pipeline, holding the vector index built at startup
///
/// Nothing here is mutated after `initialize` returns.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub rag: Arc<RagService>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Brings the service to readiness.
    ///
    /// This process includes:
    /// 1. Loading and validating configuration
    /// 2. Building the configured LLM provider and checking it is reachable
    /// 3. Loading the fixed corpus
    /// 4. Embedding every passage into the vector index
    pub async fn initialize(config: &ConfigService) -> Result<Arc<Self>, InitializationError> {
        let settings = config
            .load_settings()
            .map_err(InitializationError::Config)?;

        let clients =
            LlmClients::from_settings(&settings.llm).map_err(InitializationError::Llm)?;
        clients
            .generator
            .health_check()
            .await
            .map_err(InitializationError::Llm)?;
        tracing::info!(
            "Generation provider {} reachable at {}",
            clients.generator.name(),
            settings.llm.base_url
        );

        let store = DocumentStore::load(settings.rag.corpus_path.as_deref())
            .map_err(InitializationError::Corpus)?;

        Self::from_parts(settings, clients, store).await
    }

    /// Builds the index and pipeline from already constructed collaborators.
    pub async fn from_parts(
        settings: Settings,
        clients: LlmClients,
        store: DocumentStore,
    ) -> Result<Arc<Self>, InitializationError> {
        let index = VectorIndex::build(
            &store,
            clients.embedder.as_ref(),
            settings.rag.metric,
            settings.rag.embed_concurrency,
        )
        .await
        .map_err(InitializationError::Index)?;
        tracing::info!(
            "Vector index ready: {} passages, dimension {}, metric {}",
            index.len(),
            index.dimension(),
            index.metric()
        );

        let retriever = Retriever::new(clients.embedder, Arc::new(index));
        let rag = RagService::new(retriever, clients.generator, settings.rag.top_k);

        Ok(Arc::new(AppState {
            settings: Arc::new(settings),
            rag: Arc::new(rag),
            started_at: Utc::now(),
        }))
    }
}
