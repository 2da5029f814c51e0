use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::{
    ports::VectorStore, DocumentChunk, DomainError, Embedding, IndexInfo, SearchResult,
};

/// Brute-force cosine store for tests and local experiments.
pub struct InMemoryVectorStore {
    chunks: RwLock<Vec<(DocumentChunk, Embedding)>>,
    info: RwLock<Option<IndexInfo>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(Vec::new()),
            info: RwLock::new(None),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(e: impl std::fmt::Display) -> DomainError {
    DomainError::internal(e.to_string())
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, entries: &[(DocumentChunk, Embedding)]) -> Result<(), DomainError> {
        let mut store = self.chunks.write().map_err(poisoned)?;

        for (chunk, embedding) in entries {
            store.retain(|(c, _)| c.id != chunk.id);
            store.push((chunk.clone(), embedding.clone()));
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let store = self.chunks.read().map_err(poisoned)?;

        let mut results: Vec<SearchResult> = store
            .iter()
            .map(|(chunk, embedding)| SearchResult {
                chunk: chunk.clone(),
                score: query.cosine_similarity(embedding),
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);
        Ok(results)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.chunks.read().map_err(poisoned)?.len() as u64)
    }

    async fn index_info(&self) -> Result<Option<IndexInfo>, DomainError> {
        Ok(self.info.read().map_err(poisoned)?.clone())
    }

    async fn record_index_info(&self, info: &IndexInfo) -> Result<(), DomainError> {
        *self.info.write().map_err(poisoned)? = Some(info.clone());
        Ok(())
    }
}
