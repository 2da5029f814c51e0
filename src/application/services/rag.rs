use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{EmbeddingService, VectorStore},
    DocumentChunk, DomainError, IndexInfo, SearchResult,
};

pub struct RagService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    default_top_k: usize,
}

/// Snapshot of the document store used by the health endpoint.
#[derive(Debug, Clone)]
pub struct IndexStatus {
    pub document_count: u64,
    pub embedding_model: String,
}

impl RagService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        default_top_k: usize,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            default_top_k,
        }
    }

    pub fn embedding_model(&self) -> String {
        self.embedding.model_id()
    }

    #[instrument(skip(self), fields(top_k = self.default_top_k))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>, DomainError> {
        self.retrieve_top_k(query, self.default_top_k).await
    }

    #[instrument(skip(self))]
    pub async fn retrieve_top_k(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let embedding = self.embedding.embed(query).await?;
        self.vector_store.search(&embedding, top_k).await
    }

    /// Retrieved chunk texts in rank order, newline separated.
    pub async fn context_for(&self, query: &str) -> Result<String, DomainError> {
        let results = self.retrieve(query).await?;
        Ok(results
            .iter()
            .map(|r| r.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    pub async fn index_chunks(&self, chunks: &[DocumentChunk]) -> Result<(), DomainError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedding.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(DomainError::external(format!(
                "embedding provider returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let entries: Vec<_> = chunks.iter().cloned().zip(embeddings).collect();
        self.vector_store.upsert(&entries).await
    }

    /// Stores the active embedding model next to the index.
    pub async fn record_index_info(&self) -> Result<(), DomainError> {
        self.vector_store
            .record_index_info(&IndexInfo {
                embedding_model: self.embedding.model_id(),
                dimension: self.embedding.dimension(),
            })
            .await
    }

    /// Fails when the index was built with a different embedding model.
    ///
    /// An index with no recorded model (never ingested) is accepted.
    #[instrument(skip(self))]
    pub async fn verify_index(&self) -> Result<(), DomainError> {
        let configured = self.embedding.model_id();
        match self.vector_store.index_info().await? {
            Some(info) if info.embedding_model != configured => {
                Err(DomainError::EmbeddingMismatch {
                    indexed: info.embedding_model,
                    configured,
                })
            }
            Some(info) if info.dimension != self.embedding.dimension() => {
                Err(DomainError::EmbeddingMismatch {
                    indexed: format!("{} ({} dims)", info.embedding_model, info.dimension),
                    configured: format!("{configured} ({} dims)", self.embedding.dimension()),
                })
            }
            Some(_) => Ok(()),
            None => {
                tracing::warn!("index has no recorded embedding model; run ingestion first");
                Ok(())
            }
        }
    }

    pub async fn status(&self) -> Result<IndexStatus, DomainError> {
        Ok(IndexStatus {
            document_count: self.vector_store.count().await?,
            embedding_model: self.embedding.model_id(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Document, Embedding};
    use crate::infrastructure::InMemoryVectorStore;
    use async_trait::async_trait;

    /// Maps text onto three axes by keyword so ranking is predictable.
    struct KeywordEmbedding;

    #[async_trait]
    impl EmbeddingService for KeywordEmbedding {
        async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
            let t = text.to_lowercase();
            Ok(Embedding::new(vec![
                t.matches("compost").count() as f32 + 0.01,
                t.matches("rice").count() as f32,
                t.matches("pest").count() as f32,
            ]))
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimension(&self) -> usize {
            3
        }

        fn model_id(&self) -> String {
            "test:keywords".into()
        }
    }

    fn service(store: Arc<InMemoryVectorStore>) -> RagService {
        RagService::new(Arc::new(KeywordEmbedding), store, 2)
    }

    async fn seeded() -> (RagService, Arc<InMemoryVectorStore>) {
        let store = Arc::new(InMemoryVectorStore::new());
        let rag = service(store.clone());
        let doc = Document::new("kb.md", "");
        let chunks = vec![
            DocumentChunk::new(&doc, "Rice paddies need water", 0),
            DocumentChunk::new(&doc, "Compost heaps need turning", 1),
            DocumentChunk::new(&doc, "Neem oil controls pests", 2),
        ];
        rag.index_chunks(&chunks).await.unwrap();
        (rag, store)
    }

    #[tokio::test]
    async fn test_retrieve_ranks_and_limits() {
        let (rag, _) = seeded().await;
        let results = rag.retrieve("how to compost").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "Compost heaps need turning");
    }

    #[tokio::test]
    async fn test_context_joins_in_rank_order() {
        let (rag, _) = seeded().await;
        let context = rag.context_for("rice").await.unwrap();
        assert!(context.starts_with("Rice paddies need water\n"));
        assert_eq!(context.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_verify_index_detects_mismatch() {
        let store = Arc::new(InMemoryVectorStore::new());
        store
            .record_index_info(&IndexInfo {
                embedding_model: "openai:text-embedding-3-small".into(),
                dimension: 3,
            })
            .await
            .unwrap();

        let err = service(store).verify_index().await.unwrap_err();
        assert!(matches!(err, DomainError::EmbeddingMismatch { .. }));
    }

    #[tokio::test]
    async fn test_verify_index_accepts_matching_or_unrecorded() {
        let store = Arc::new(InMemoryVectorStore::new());
        let rag = service(store);
        rag.verify_index().await.unwrap();

        rag.record_index_info().await.unwrap();
        rag.verify_index().await.unwrap();
    }

    #[tokio::test]
    async fn test_status_counts_chunks() {
        let (rag, _) = seeded().await;
        let status = rag.status().await.unwrap();
        assert_eq!(status.document_count, 3);
        assert_eq!(status.embedding_model, "test:keywords");
    }
}
