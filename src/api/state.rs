use std::sync::Arc;
use std::time::Duration;

use crate::api::middleware::{client_rate_limiter, ClientRateLimiter};
use crate::application::{ChatService, ChatSettings, PromptComposer, RagService};
use crate::domain::{
    ports::{EmbeddingService, LlmService, SessionStore, VectorStore},
    DomainError,
};
use crate::infrastructure::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub rag: Arc<RagService>,
    pub rate_limiter: Arc<ClientRateLimiter>,
    pub config: Arc<AppConfig>,
}

/// Port implementations the service is assembled from.
pub struct Adapters {
    pub embedding: Arc<dyn EmbeddingService>,
    pub llm: Arc<dyn LlmService>,
    pub vector_store: Arc<dyn VectorStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(config: AppConfig, adapters: Adapters) -> Result<Self, DomainError> {
        let c = &config.config;
        let rag = Arc::new(RagService::new(
            adapters.embedding,
            adapters.vector_store,
            c.rag.top_k,
        ));
        let composer = PromptComposer::new(&config.prompts.languages, c.chat.default_language)?;
        let chat = ChatService::new(
            rag.clone(),
            adapters.llm,
            adapters.sessions,
            composer,
            ChatSettings {
                max_message_chars: c.chat.max_message_chars,
                history_turns: c.chat.history_turns,
                timeout: Duration::from_secs(c.llm.timeout_seconds),
            },
        );
        let rate_limiter = Arc::new(client_rate_limiter(c.rate_limit.requests_per_minute));

        Ok(Self {
            chat: Arc::new(chat),
            rag,
            rate_limiter,
            config: Arc::new(config),
        })
    }
}
