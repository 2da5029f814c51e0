use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::gemini;

use crate::domain::{ports::LlmService, DomainError};

/// Single-shot Gemini completion; the prompt already carries context and history.
pub struct GeminiLlm {
    client: gemini::Client,
    model: String,
    temperature: f64,
}

impl GeminiLlm {
    pub fn new(model: impl Into<String>, temperature: f64) -> Self {
        Self {
            client: gemini::Client::from_env(),
            model: model.into(),
            temperature,
        }
    }
}

#[async_trait]
impl LlmService for GeminiLlm {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        let agent = self
            .client
            .agent(&self.model)
            .temperature(self.temperature)
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| DomainError::external(format!("generation failed: {e}")))
    }
}
