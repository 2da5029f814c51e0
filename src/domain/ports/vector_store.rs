use crate::domain::{errors::DomainError, DocumentChunk, Embedding, IndexInfo, SearchResult};
use async_trait::async_trait;

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&self, entries: &[(DocumentChunk, Embedding)]) -> Result<(), DomainError>;
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError>;
    async fn count(&self) -> Result<u64, DomainError>;
    async fn index_info(&self) -> Result<Option<IndexInfo>, DomainError>;
    async fn record_index_info(&self, info: &IndexInfo) -> Result<(), DomainError>;
}
