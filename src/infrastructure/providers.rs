use std::sync::Arc;

use super::config::{Config, LlmProvider, API_KEY_ALIASES};
use super::embedding::TextEmbedding;
use super::llm::{AnthropicLlm, GeminiLlm};
use super::session::InMemorySessionStore;
use super::vector_store::QdrantVectorStore;
use crate::domain::{
    ports::{EmbeddingService, LlmService, VectorStore},
    DomainError,
};

/// Copies aliased key variables into the names the provider clients read.
///
/// Call before any provider client is built and before other threads read
/// the environment.
pub fn apply_api_key_aliases() {
    for (name, alias) in API_KEY_ALIASES {
        if std::env::var(name).is_err() {
            if let Ok(value) = std::env::var(alias) {
                std::env::set_var(name, value);
            }
        }
    }
}

pub fn embedding_service(config: &Config) -> Arc<dyn EmbeddingService> {
    Arc::new(TextEmbedding::from_config(&config.embedding))
}

pub fn llm_service(config: &Config) -> Arc<dyn LlmService> {
    let llm = &config.llm;
    match llm.provider {
        LlmProvider::Gemini => Arc::new(GeminiLlm::new(&llm.model, llm.temperature)),
        LlmProvider::Anthropic => Arc::new(AnthropicLlm::new(&llm.model, llm.temperature)),
    }
}

pub async fn vector_store(config: &Config) -> Result<Arc<dyn VectorStore>, DomainError> {
    let store = QdrantVectorStore::new(
        &config.vector_store.url,
        &config.vector_store.collection,
        config.embedding.dimension,
    )
    .await?;
    Ok(Arc::new(store))
}

/// Session memory sized from config. A `ttl_seconds` of 0 keeps idle sessions.
pub fn session_store(config: &Config) -> Arc<InMemorySessionStore> {
    let mut store = InMemorySessionStore::new(config.chat.max_turns)
        .with_max_sessions(config.sessions.max_sessions);

    if config.sessions.ttl_seconds > 0 {
        let ttl = i64::try_from(config.sessions.ttl_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX);
        store = store.with_ttl(ttl);
    }
    Arc::new(store)
}
