use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use krushi_assistant::api::middleware::ClientRateLimiter;
use krushi_assistant::api::{create_router, Adapters, AppState};
use krushi_assistant::infrastructure::{
    check_api_keys, providers, telemetry, AppConfig, InMemorySessionStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("api=debug,krushi_assistant=debug,tower_http=debug");
    providers::apply_api_key_aliases();

    let config = AppConfig::load()?;
    let c = &config.config;
    check_api_keys(&c.required_api_keys(), |key| std::env::var(key).ok())?;

    let addr = SocketAddr::new(c.server.host.parse()?, c.server.port);
    let sweep_every = Duration::from_secs(c.sessions.sweep_interval_seconds.max(1));

    let sessions = providers::session_store(c);
    let vector_store = providers::vector_store(c).await?;
    info!(
        url = %c.vector_store.url,
        collection = %c.vector_store.collection,
        "vector store connected"
    );
    info!(
        llm = %c.llm.model,
        embeddings = %c.embedding.model_id(),
        "providers configured"
    );

    let adapters = Adapters {
        embedding: providers::embedding_service(c),
        llm: providers::llm_service(c),
        vector_store,
        sessions: sessions.clone(),
    };
    let state = AppState::new(config, adapters)?;
    state.rag.verify_index().await?;

    tokio::spawn(sweep(sessions, state.rate_limiter.clone(), sweep_every));

    let app = create_router(state);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("API server stopped");
    Ok(())
}

/// Drops idle sessions and stale rate-limit buckets.
async fn sweep(
    sessions: Arc<InMemorySessionStore>,
    limiter: Arc<ClientRateLimiter>,
    every: Duration,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let evicted = sessions.evict_expired();
        if evicted > 0 {
            info!(evicted, "expired sessions removed");
        }
        limiter.retain_recent();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
