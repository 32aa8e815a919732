use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::core::errors::ApiError;
use crate::llm::ChatMessage;
use crate::rag::AnswerResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RagRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Single-question form used by older clients.
    #[serde(default)]
    pub question: Option<String>,
}

impl RagRequest {
    fn into_history(self) -> Vec<ChatMessage> {
        match self.question {
            Some(question) if self.messages.is_empty() => vec![ChatMessage::user(question)],
            _ => self.messages,
        }
    }
}

pub async fn answer(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RagRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let Json(request) = payload
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;
    let history = request.into_history();

    let span = tracing::info_span!("rag", request_id = %Uuid::new_v4());
    async move {
        if let Some(last) = history.last() {
            tracing::info!(
                "Received message ({} turns): {}",
                history.len(),
                last.content
            );
        }

        let response = state.rag.answer(&history).await?;
        tracing::info!("Sending response");
        Ok::<_, ApiError>(Json(response))
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Settings;
    use crate::core::errors::INTERNAL_ERROR_MESSAGE;
    use crate::llm::testing::{KeywordEmbedder, ScriptedGenerator, TableEmbedder};
    use crate::llm::LlmClients;
    use crate::rag::DocumentStore;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request, StatusCode};
    use axum::response::IntoResponse;
    use serde_json::Value;

    async fn state_with(generator: Arc<ScriptedGenerator>) -> Arc<AppState> {
        let clients = LlmClients {
            embedder: Arc::new(KeywordEmbedder::default()),
            generator,
        };
        AppState::from_parts(Settings::default(), clients, DocumentStore::builtin())
            .await
            .expect("state initializes")
    }

    async fn call(state: Arc<AppState>, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/rag")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds");
        let payload = Json::<RagRequest>::from_request(request, &()).await;

        let response = answer(State(state), payload).await.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn answers_with_sources_in_rank_order() {
        let state = state_with(Arc::new(ScriptedGenerator::answering(
            " RAG retrieves, then generates. ",
        )))
        .await;

        let (status, body) = call(
            state,
            r#"{"messages":[{"role":"user","content":"What is RAG?"}]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "RAG retrieves, then generates.");
        let sources = body["sources"].as_array().expect("sources array");
        assert_eq!(sources.len(), 2);
        assert!(sources[0]
            .as_str()
            .is_some_and(|s| s.starts_with("Retrieval-Augmented Generation (RAG)")));
    }

    #[tokio::test]
    async fn empty_messages_is_a_client_error() {
        let generator = Arc::new(ScriptedGenerator::answering("unused"));
        let state = state_with(generator.clone()).await;

        let (status, body) = call(state, r#"{"messages":[]}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["error"], "messages cannot be empty");
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn blank_last_message_is_a_client_error() {
        let state = state_with(Arc::new(ScriptedGenerator::answering("unused"))).await;

        let (status, body) = call(
            state,
            r#"{"messages":[{"role":"user","content":"hi"},{"role":"user","content":"   "}]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "last message cannot be empty");
    }

    #[tokio::test]
    async fn malformed_body_is_a_client_error() {
        let state = state_with(Arc::new(ScriptedGenerator::answering("unused"))).await;

        let (status, body) = call(state.clone(), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");

        let (status, _) = call(
            state,
            r#"{"messages":[{"role":"narrator","content":"x"}]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn generation_failure_is_an_opaque_server_error() {
        let state = state_with(Arc::new(ScriptedGenerator::failing(
            "tcp connect error: 127.0.0.1:11434",
        )))
        .await;

        let (status, body) = call(
            state,
            r#"{"messages":[{"role":"user","content":"What is RAG?"}]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(body["code"], "rag_failed");
        assert!(body.get("sources").is_none());
        assert!(!body.to_string().contains("11434"));
    }

    #[tokio::test]
    async fn retrieval_failure_is_an_opaque_server_error() {
        let store = DocumentStore::builtin();
        let embedder = TableEmbedder::new(
            store
                .passages()
                .iter()
                .map(|p| (p.text.clone(), vec![1.0, p.index as f32])),
        );
        let generator = Arc::new(ScriptedGenerator::answering("unused"));
        let clients = LlmClients {
            embedder: Arc::new(embedder),
            generator: generator.clone(),
        };
        let state = AppState::from_parts(Settings::default(), clients, store)
            .await
            .expect("state initializes");

        let (status, body) = call(
            state,
            r#"{"messages":[{"role":"user","content":"What is RAG?"}]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(body["code"], "rag_failed");
        assert!(body.get("answer").is_none());
        assert!(!body.to_string().contains("no vector"));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn legacy_question_body_is_accepted() {
        let state = state_with(Arc::new(ScriptedGenerator::answering("ok"))).await;

        let (status, body) = call(state, r#"{"question":"What is RAG?"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "ok");
    }
}
