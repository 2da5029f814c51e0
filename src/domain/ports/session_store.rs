use crate::domain::{errors::DomainError, Turn};
use async_trait::async_trait;

/// Per-session conversation memory.
///
/// `append` must be atomic per session id: readers see a turn completely or
/// not at all.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Up to `limit` most recent turns, oldest first. Unknown ids yield none.
    async fn recent_turns(&self, session_id: &str, limit: usize)
        -> Result<Vec<Turn>, DomainError>;
    /// All retained turns, oldest first.
    async fn turns(&self, session_id: &str) -> Result<Vec<Turn>, DomainError>;
    async fn append(&self, session_id: &str, turn: Turn) -> Result<(), DomainError>;
    async fn session_count(&self) -> usize;
}
