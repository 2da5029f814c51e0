use async_trait::async_trait;
use rig::client::{EmbeddingsClient, ProviderClient};
use rig::embeddings::EmbeddingModel;
use rig::providers::{gemini, openai};

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::{EmbeddingConfig, EmbeddingProvider};

enum Provider {
    Gemini(gemini::Client),
    OpenAi(openai::Client),
}

/// Remote text embeddings through rig.
///
/// Provider clients read their API key from the environment.
pub struct TextEmbedding {
    provider: Provider,
    model: String,
    dimension: usize,
    model_id: String,
}

impl TextEmbedding {
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        let provider = match config.provider {
            EmbeddingProvider::Gemini => Provider::Gemini(gemini::Client::from_env()),
            EmbeddingProvider::OpenAi => Provider::OpenAi(openai::Client::from_env()),
        };

        Self {
            provider,
            model: config.model.clone(),
            dimension: config.dimension,
            model_id: config.model_id(),
        }
    }

    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Embedding>, DomainError> {
        match &self.provider {
            Provider::Gemini(client) => embed_with(client.embedding_model(&self.model), texts).await,
            Provider::OpenAi(client) => embed_with(client.embedding_model(&self.model), texts).await,
        }
    }
}

async fn embed_with<M: EmbeddingModel>(
    model: M,
    texts: Vec<String>,
) -> Result<Vec<Embedding>, DomainError> {
    let embeddings = model
        .embed_texts(texts)
        .await
        .map_err(|e| DomainError::external(format!("embedding request failed: {e}")))?;

    Ok(embeddings
        .into_iter()
        .map(|emb| Embedding::from(emb.vec))
        .collect())
}

#[async_trait]
impl EmbeddingService for TextEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.embed_texts(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::external("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        self.embed_texts(texts.iter().map(|t| t.to_string()).collect())
            .await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }
}
