use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::{error::ApiError, state::AppState};

const MAX_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct SearchDocumentsRequest {
    #[serde(default)]
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResultResponse {
    pub content: String,
    pub source: String,
    pub score: f32,
}

/// Raw retrieval for inspecting what the chat endpoint would see.
pub async fn search_documents(
    State(state): State<AppState>,
    payload: Result<Json<SearchDocumentsRequest>, JsonRejection>,
) -> Result<Json<Vec<SearchResultResponse>>, ApiError> {
    let Json(request) = payload?;
    if request.query.trim().is_empty() {
        return Err(ApiError::BadRequest("Query cannot be empty".into()));
    }

    let top_k = request
        .limit
        .unwrap_or(state.config.config.rag.top_k)
        .clamp(1, MAX_LIMIT);
    let results = state.rag.retrieve_top_k(&request.query, top_k).await?;

    Ok(Json(
        results
            .into_iter()
            .map(|r| SearchResultResponse {
                content: r.chunk.content,
                source: r.chunk.metadata.source,
                score: r.score,
            })
            .collect(),
    ))
}
