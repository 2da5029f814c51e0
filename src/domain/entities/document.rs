use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A source file loaded by the ingestion path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    /// Path relative to the data directory.
    pub source: String,
    pub content: String,
}

impl Document {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, source.as_bytes()),
            source,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub document_id: Uuid,
    pub content: String,
    pub chunk_index: usize,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    pub fn new(document: &Document, content: impl Into<String>, chunk_index: usize) -> Self {
        let key = format!("{}#{}", document.source, chunk_index);
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()),
            document_id: document.id,
            content: content.into(),
            chunk_index,
            metadata: ChunkMetadata {
                source: document.source.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Splits content into windows of at most `chunk_size` characters.
///
/// Consecutive windows share up to `overlap` characters. A window prefers to
/// end on whitespace found in its second half so words are not cut; text
/// without whitespace is cut hard at `chunk_size`. Windows that are blank
/// after trimming are skipped, and chunk indexes stay sequential from 0.
pub fn chunk_content(
    document: &Document,
    chunk_size: usize,
    overlap: usize,
) -> Vec<DocumentChunk> {
    let chars: Vec<char> = document.content.chars().collect();
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let hard_end = (start + chunk_size).min(chars.len());
        let end = if hard_end < chars.len() {
            (start + chunk_size / 2..hard_end)
                .rev()
                .find(|&i| chars[i].is_whitespace())
                .unwrap_or(hard_end)
        } else {
            hard_end
        };

        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();
        if !trimmed.is_empty() {
            let index = chunks.len();
            chunks.push(DocumentChunk::new(document, trimmed, index));
        }

        if end == chars.len() {
            break;
        }
        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_content_single_chunk() {
        let doc = Document::new("notes.md", "Hello world.\n\nThis is a test.");
        let chunks = chunk_content(&doc, 100, 10);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello world.\n\nThis is a test.");
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].metadata.source, "notes.md");
    }

    #[test]
    fn test_chunk_content_hard_windows_overlap() {
        let doc = Document::new("a.txt", "a".repeat(2500));
        let chunks = chunk_content(&doc, 1000, 100);

        let lens: Vec<usize> = chunks.iter().map(|c| c.content.chars().count()).collect();
        assert_eq!(lens, vec![1000, 1000, 700]);
        assert_eq!(chunks[2].chunk_index, 2);
    }

    #[test]
    fn test_chunk_content_prefers_whitespace() {
        let doc = Document::new("b.txt", "alpha beta gamma delta epsilon");
        let chunks = chunk_content(&doc, 12, 0);

        assert_eq!(chunks[0].content, "alpha beta");
        assert!(chunks.iter().all(|c| c.content.chars().count() <= 12));
        let rebuilt: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(rebuilt.join(" "), "alpha beta gamma delta epsilon");
    }

    #[test]
    fn test_chunk_content_multibyte() {
        let doc = Document::new("hi.md", "जैव खत ".repeat(50));
        let chunks = chunk_content(&doc, 40, 5);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.content.chars().count() <= 40));
    }

    #[test]
    fn test_chunk_content_empty() {
        let doc = Document::new("empty.txt", "  \n\n ");
        assert!(chunk_content(&doc, 100, 10).is_empty());
    }

    #[test]
    fn test_chunk_ids_are_stable() {
        let doc = Document::new("crops/rice.md", "Rice needs standing water.");
        let first = chunk_content(&doc, 100, 10);
        let second = chunk_content(&doc, 100, 10);
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(first[0].document_id, doc.id);
    }
}
