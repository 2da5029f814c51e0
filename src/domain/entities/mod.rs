mod document;
mod embedding;
mod language;
mod session;

pub use document::{chunk_content, ChunkMetadata, Document, DocumentChunk, SearchResult};
pub use embedding::{Embedding, IndexInfo};
pub use language::{Language, LanguageProfile, LanguageProfiles};
pub use session::{format_history, Session, Turn};
