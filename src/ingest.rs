use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use krushi_assistant::application::{IngestionService, RagService};
use krushi_assistant::infrastructure::{check_api_keys, providers, telemetry, AppConfig};

/// Builds the vector index from the documents under `ingest.data_dir`,
/// or under the directory given as the first argument.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("ingest=info,krushi_assistant=info");
    providers::apply_api_key_aliases();

    let config = AppConfig::load()?;
    let c = &config.config;
    check_api_keys(&[c.embedding_api_key()], |key| std::env::var(key).ok())?;

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| c.ingest.data_dir.clone());

    let vector_store = providers::vector_store(c).await?;
    let rag = Arc::new(RagService::new(
        providers::embedding_service(c),
        vector_store,
        c.rag.top_k,
    ));
    let service = IngestionService::new(rag)
        .with_chunking(c.ingest.chunk_size, c.ingest.chunk_overlap)
        .with_batch_size(c.ingest.batch_size)
        .with_extensions(c.ingest.extensions.clone());

    info!(
        dir = %data_dir.display(),
        collection = %c.vector_store.collection,
        embeddings = %c.embedding.model_id(),
        "ingestion started"
    );
    let started = Instant::now();
    let report = service.ingest_dir(&data_dir).await?;

    info!(
        documents = report.documents,
        chunks = report.chunks,
        batches = report.batches,
        duration_ms = started.elapsed().as_millis() as u64,
        "ingestion finished"
    );
    Ok(())
}
