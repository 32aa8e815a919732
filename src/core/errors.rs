use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use crate::rag::RagError;

/// Message returned for every server-side failure. Internal detail only goes to the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "RAG processing failed";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }

    /// Stable, machine-readable category for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "invalid_request",
            ApiError::Internal(_) => "rag_failed",
        }
    }
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            other => ApiError::internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            ApiError::Internal(detail) => {
                tracing::error!("RAG error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        let body = Json(json!({ "error": message, "code": self.code() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::rag::RetrievalError;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be json")
    }

    #[tokio::test]
    async fn bad_request_keeps_actionable_message() {
        let response = ApiError::BadRequest("last message cannot be empty".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "last message cannot be empty");
        assert_eq!(body["code"], "invalid_request");
    }

    #[tokio::test]
    async fn internal_error_hides_detail() {
        let response =
            ApiError::Internal("connection refused at 10.0.0.7:11434".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(body["code"], "rag_failed");
        assert!(!body.to_string().contains("10.0.0.7"));
    }

    #[test]
    fn rag_errors_split_into_client_and_server_categories() {
        let invalid: ApiError = RagError::InvalidRequest("messages cannot be empty".into()).into();
        assert!(matches!(invalid, ApiError::BadRequest(_)));

        let retrieval: ApiError = RagError::RetrievalFailure(RetrievalError::Embedding(
            LlmError::Malformed("missing embedding".into()),
        ))
        .into();
        assert!(matches!(retrieval, ApiError::Internal(_)));

        let generation: ApiError =
            RagError::GenerationFailure(LlmError::Malformed("missing response".into())).into();
        assert_eq!(generation.code(), "rag_failed");
    }
}
