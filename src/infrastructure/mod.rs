pub mod config;
pub mod embedding;
pub mod llm;
pub mod providers;
pub mod session;
pub mod telemetry;
pub mod vector_store;

pub use config::{check_api_keys, AppConfig, Config, ConfigError, PromptsConfig};
pub use embedding::TextEmbedding;
pub use llm::{AnthropicLlm, GeminiLlm};
pub use session::InMemorySessionStore;
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};
