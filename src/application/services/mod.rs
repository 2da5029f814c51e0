mod chat;
mod enhancer;
mod ingestion;
mod prompt;
mod rag;
mod sanitize;

pub use chat::{ChatReply, ChatRequest, ChatService, ChatSettings};
pub use enhancer::enhance_response;
pub use ingestion::{IngestReport, IngestionService};
pub use prompt::{PromptComposer, PromptParts};
pub use rag::{IndexStatus, RagService};
pub use sanitize::{sanitize_message, validate_message};
