use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "RAG Backend is running" }))
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let index = state.rag.retriever().index();
    Json(json!({
        "status": "ok",
        "passages": index.len(),
        "top_k": state.rag.top_k(),
        "metric": index.metric(),
        "started_at": state.started_at.to_rfc3339(),
    }))
}
