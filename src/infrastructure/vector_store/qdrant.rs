use async_trait::async_trait;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, GetPointsBuilder, PointId, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use uuid::Uuid;

use crate::domain::{
    ports::VectorStore, ChunkMetadata, DocumentChunk, DomainError, Embedding, IndexInfo,
    SearchResult,
};

/// Point id of the single record in the `<collection>_meta` collection.
const INDEX_INFO_POINT: u64 = 1;

pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    meta_collection: String,
    dimension: usize,
}

fn external(e: impl std::fmt::Display) -> DomainError {
    DomainError::external(e.to_string())
}

impl QdrantVectorStore {
    pub async fn new(url: &str, collection: &str, dimension: usize) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::unavailable(e.to_string()))?;

        let store = Self {
            client,
            collection: collection.to_string(),
            meta_collection: format!("{collection}_meta"),
            dimension,
        };

        store
            .ensure_collection(&store.collection, store.dimension, Distance::Cosine)
            .await?;
        store
            .ensure_collection(&store.meta_collection, 1, Distance::Dot)
            .await?;

        Ok(store)
    }

    async fn ensure_collection(
        &self,
        name: &str,
        dimension: usize,
        distance: Distance,
    ) -> Result<(), DomainError> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| DomainError::unavailable(e.to_string()))?;

        let exists = collections.collections.iter().any(|c| c.name == name);

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(name)
                        .vectors_config(VectorParamsBuilder::new(dimension as u64, distance)),
                )
                .await
                .map_err(external)?;
            tracing::info!(collection = name, dimension, "created collection");
        }

        Ok(())
    }

    fn to_point(chunk: &DocumentChunk, embedding: &Embedding) -> Result<PointStruct, DomainError> {
        let payload: Payload = serde_json::json!({
            "chunk_id": chunk.id.to_string(),
            "document_id": chunk.document_id.to_string(),
            "content": chunk.content,
            "chunk_index": chunk.chunk_index,
            "source": chunk.metadata.source,
        })
        .try_into()
        .map_err(|_| DomainError::internal("Failed to create payload"))?;

        Ok(PointStruct::new(
            chunk.id.to_string(),
            embedding.as_slice().to_vec(),
            payload,
        ))
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert(&self, entries: &[(DocumentChunk, Embedding)]) -> Result<(), DomainError> {
        if entries.is_empty() {
            return Ok(());
        }
        if let Some((_, e)) = entries.iter().find(|(_, e)| e.dimension() != self.dimension) {
            return Err(DomainError::internal(format!(
                "embedding has {} dimensions, collection expects {}",
                e.dimension(),
                self.dimension
            )));
        }

        let points = entries
            .iter()
            .map(|(chunk, embedding)| Self::to_point(chunk, embedding))
            .collect::<Result<Vec<_>, _>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(external)?;

        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query.as_slice().to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(external)?;

        let search_results: Vec<SearchResult> = results
            .result
            .into_iter()
            .filter_map(|point| {
                let payload = point.payload;

                let id: Uuid = payload.get("chunk_id")?.as_str()?.parse().ok()?;
                let document_id: Uuid = payload.get("document_id")?.as_str()?.parse().ok()?;
                let content = payload.get("content")?.as_str()?.to_string();
                let chunk_index = payload.get("chunk_index")?.as_integer()? as usize;
                let source = payload
                    .get("source")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string());

                Some(SearchResult {
                    chunk: DocumentChunk {
                        id,
                        document_id,
                        content,
                        chunk_index,
                        metadata: ChunkMetadata { source },
                    },
                    score: point.score,
                })
            })
            .collect();

        Ok(search_results)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| DomainError::unavailable(e.to_string()))?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }

    async fn index_info(&self) -> Result<Option<IndexInfo>, DomainError> {
        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(
                    &self.meta_collection,
                    vec![PointId::from(INDEX_INFO_POINT)],
                )
                .with_payload(true),
            )
            .await
            .map_err(|e| DomainError::unavailable(e.to_string()))?;

        Ok(response.result.into_iter().next().and_then(|point| {
            let model = point.payload.get("embedding_model")?.as_str()?.to_string();
            let dimension = point.payload.get("dimension")?.as_integer()? as usize;
            Some(IndexInfo {
                embedding_model: model,
                dimension,
            })
        }))
    }

    async fn record_index_info(&self, info: &IndexInfo) -> Result<(), DomainError> {
        let payload: Payload = serde_json::json!({
            "embedding_model": info.embedding_model,
            "dimension": info.dimension,
        })
        .try_into()
        .map_err(|_| DomainError::internal("Failed to create payload"))?;

        let point = PointStruct::new(INDEX_INFO_POINT, vec![1.0_f32], payload);
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.meta_collection, vec![point]).wait(true))
            .await
            .map_err(external)?;

        Ok(())
    }
}
