use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;
use walkdir::WalkDir;

use super::rag::RagService;
use crate::domain::{chunk_content, Document, DocumentChunk, DomainError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
    pub batches: usize,
}

pub struct IngestionService {
    rag: Arc<RagService>,
    chunk_size: usize,
    chunk_overlap: usize,
    batch_size: usize,
    extensions: Vec<String>,
}

impl IngestionService {
    pub fn new(rag: Arc<RagService>) -> Self {
        Self {
            rag,
            chunk_size: 1000,
            chunk_overlap: 100,
            batch_size: 64,
            extensions: vec!["md".into(), "txt".into()],
        }
    }

    pub fn with_chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Loads, chunks, embeds and stores every matching file under `dir`,
    /// then records the embedding model alongside the index.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub async fn ingest_dir(&self, dir: &Path) -> Result<IngestReport, DomainError> {
        let root = dir.to_path_buf();
        let extensions = self.extensions.clone();
        let documents = tokio::task::spawn_blocking(move || load_documents(&root, &extensions))
            .await
            .map_err(|e| DomainError::internal(format!("document loader panicked: {e}")))??;
        tracing::info!(documents = documents.len(), "documents loaded");

        self.ingest_documents(&documents).await
    }

    pub async fn ingest_documents(
        &self,
        documents: &[Document],
    ) -> Result<IngestReport, DomainError> {
        let chunks: Vec<DocumentChunk> = documents
            .iter()
            .flat_map(|doc| chunk_content(doc, self.chunk_size, self.chunk_overlap))
            .collect();
        tracing::info!(chunks = chunks.len(), "documents split");

        let mut report = IngestReport {
            documents: documents.len(),
            ..IngestReport::default()
        };
        for batch in chunks.chunks(self.batch_size) {
            self.rag.index_chunks(batch).await?;
            report.chunks += batch.len();
            report.batches += 1;
            tracing::info!(stored = report.chunks, total = chunks.len(), "batch stored");
        }

        self.rag.record_index_info().await?;
        Ok(report)
    }
}

/// Reads every file under `root` whose extension is listed, skipping files
/// that cannot be read. Sources are recorded relative to `root`.
fn load_documents(root: &Path, extensions: &[String]) -> Result<Vec<Document>, DomainError> {
    if !root.is_dir() {
        return Err(DomainError::validation(format!(
            "data directory {} not found",
            root.display()
        )));
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_extension(path, extensions))
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping file");
                continue;
            }
        };
        let source = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        documents.push(Document::new(source, String::from_utf8_lossy(&bytes)));
    }

    Ok(documents)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
