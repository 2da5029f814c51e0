use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// One log line per request; server errors are raised to `warn`.
pub async fn request_logger(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        tracing::warn!(%method, %path, status, duration_ms, "request completed");
    } else {
        tracing::info!(%method, %path, status, duration_ms, "request completed");
    }

    response
}
