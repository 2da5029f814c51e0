use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database_status: &'static str,
    pub document_count: u64,
    pub embeddings: String,
}

#[derive(Serialize)]
pub struct UnhealthyResponse {
    pub status: &'static str,
    pub error: &'static str,
}

#[derive(Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<&'static str>,
}

pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "KrushiVerse agricultural assistant",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            "GET /health",
            "POST /chat",
            "POST /api/v1/chat",
            "POST /api/v1/documents/search",
        ],
    })
}

/// Reports document store reachability; 503 when it cannot be queried.
pub async fn health_check(State(state): State<AppState>) -> Response {
    match state.rag.status().await {
        Ok(status) => Json(HealthResponse {
            status: "healthy",
            database_status: "connected",
            document_count: status.document_count,
            embeddings: status.embedding_model,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(UnhealthyResponse {
                    status: "unhealthy",
                    error: "Document store unavailable",
                }),
            )
                .into_response()
        }
    }
}
