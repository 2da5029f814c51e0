use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use super::enhancer::enhance_response;
use super::prompt::{PromptComposer, PromptParts};
use super::rag::RagService;
use super::sanitize::{sanitize_message, validate_message};
use crate::domain::{
    format_history,
    ports::{LlmService, SessionStore},
    DomainError, Language, Session, Turn,
};

/// Limits applied to every chat request.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub max_message_chars: usize,
    pub history_turns: usize,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub language: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatReply {
    pub response: String,
    pub session_id: String,
    pub language: Language,
}

pub struct ChatService {
    rag: Arc<RagService>,
    llm: Arc<dyn LlmService>,
    sessions: Arc<dyn SessionStore>,
    composer: PromptComposer,
    settings: ChatSettings,
}

impl ChatService {
    pub fn new(
        rag: Arc<RagService>,
        llm: Arc<dyn LlmService>,
        sessions: Arc<dyn SessionStore>,
        composer: PromptComposer,
        settings: ChatSettings,
    ) -> Self {
        Self {
            rag,
            llm,
            sessions,
            composer,
            settings,
        }
    }

    /// Answers one user turn and commits it to the session.
    ///
    /// History is read before anything else, so the prompt only sees turns
    /// committed before this request started. Nothing is written to the
    /// session unless generation succeeds.
    #[instrument(skip_all, fields(language = %request.language))]
    pub async fn handle(&self, request: ChatRequest) -> Result<ChatReply, DomainError> {
        validate_message(&request.message)?;
        let question = sanitize_message(&request.message, self.settings.max_message_chars);
        validate_message(&question)?;
        let language = Language::resolve(&request.language, self.composer.default_language());
        let session_id = request
            .session_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(Session::new_id);

        tracing::info!(
            message = %preview(&question, 50),
            language = %language,
            session = %preview(&session_id, 8),
            "chat request"
        );

        let (history, context) = futures::try_join!(
            self.sessions
                .recent_turns(&session_id, self.settings.history_turns),
            self.rag.context_for(&question),
        )?;
        let history = format_history(&history);

        let prompt = self.composer.compose(PromptParts {
            context: &context,
            history: &history,
            question: &question,
            raw_question: &request.message,
            language,
        });

        let answer = tokio::time::timeout(self.settings.timeout, self.llm.complete(&prompt))
            .await
            .map_err(|_| DomainError::timeout("generation timed out"))??;
        let response = enhance_response(&answer, self.composer.profile(language));

        self.sessions
            .append(&session_id, Turn::new(question, response.clone()))
            .await?;

        tracing::info!(length = response.chars().count(), "response generated");

        Ok(ChatReply {
            response,
            session_id,
            language,
        })
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
