use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::anthropic;

use crate::domain::{ports::LlmService, DomainError};

const MAX_TOKENS: u64 = 1024;

pub struct AnthropicLlm {
    client: anthropic::Client,
    model: String,
    temperature: f64,
}

impl AnthropicLlm {
    pub fn new(model: impl Into<String>, temperature: f64) -> Self {
        Self {
            client: anthropic::Client::from_env(),
            model: model.into(),
            temperature,
        }
    }
}

#[async_trait]
impl LlmService for AnthropicLlm {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        let agent = self
            .client
            .agent(&self.model)
            .temperature(self.temperature)
            .max_tokens(MAX_TOKENS)
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| DomainError::external(format!("generation failed: {e}")))
    }
}
