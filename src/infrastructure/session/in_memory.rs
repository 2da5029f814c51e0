use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::domain::{ports::SessionStore, DomainError, Session, Turn};

/// Process-local session memory.
///
/// Sessions idle for longer than the TTL are dropped by [`evict_expired`],
/// and the least recently active session is evicted when a new one would
/// exceed `max_sessions`.
///
/// [`evict_expired`]: InMemorySessionStore::evict_expired
pub struct InMemorySessionStore {
    sessions: DashMap<String, Session>,
    max_turns: usize,
    ttl: Option<Duration>,
    max_sessions: Option<usize>,
}

impl InMemorySessionStore {
    pub fn new(max_turns: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_turns,
            ttl: None,
            max_sessions: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = Some(max_sessions.max(1));
        self
    }

    /// Removes sessions idle past the TTL and returns how many were dropped.
    pub fn evict_expired(&self) -> usize {
        let Some(cutoff) = self.cutoff() else {
            return 0;
        };
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.last_active >= cutoff);
        before.saturating_sub(self.sessions.len())
    }

    fn evict_oldest(&self) {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|entry| entry.value().last_active)
            .map(|entry| entry.key().clone());

        if let Some(id) = oldest {
            self.sessions.remove(&id);
            tracing::debug!(session = %id, "evicted least recently active session");
        }
    }

    /// Sessions last active before this instant are expired.
    fn cutoff(&self) -> Option<DateTime<Utc>> {
        self.ttl.and_then(|ttl| Utc::now().checked_sub_signed(ttl))
    }

    fn is_expired(&self, session: &Session) -> bool {
        self.cutoff()
            .is_some_and(|cutoff| session.last_active < cutoff)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn recent_turns(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Turn>, DomainError> {
        Ok(self
            .sessions
            .get(session_id)
            .filter(|session| !self.is_expired(session))
            .map(|session| session.recent(limit))
            .unwrap_or_default())
    }

    async fn turns(&self, session_id: &str) -> Result<Vec<Turn>, DomainError> {
        Ok(self
            .sessions
            .get(session_id)
            .filter(|session| !self.is_expired(session))
            .map(|session| session.turns())
            .unwrap_or_default())
    }

    async fn append(&self, session_id: &str, turn: Turn) -> Result<(), DomainError> {
        // Capacity check and insert are separate map operations, so concurrent
        // first turns for new ids can overshoot `max_sessions` by the number of
        // racing requests until the next insert evicts again.
        if let Some(max) = self.max_sessions {
            if !self.sessions.contains_key(session_id) && self.sessions.len() >= max {
                self.evict_oldest();
            }
        }

        let mut session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(self.max_turns));
        if self.is_expired(&session) {
            *session = Session::new(self.max_turns);
        }
        session.push(turn);
        Ok(())
    }

    async fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(i: usize) -> Turn {
        Turn::new(format!("q{i}"), format!("a{i}"))
    }

    #[tokio::test]
    async fn test_unknown_session_is_empty() {
        let store = InMemorySessionStore::new(10);
        assert!(store.recent_turns("nope", 3).await.unwrap().is_empty());
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_keeps_latest_ten_turns_in_order() {
        let store = InMemorySessionStore::new(10);
        for i in 0..12 {
            store.append("s", turn(i)).await.unwrap();
        }

        let questions: Vec<String> = store
            .turns("s")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.question)
            .collect();
        assert_eq!(questions.len(), 10);
        assert_eq!(questions.first().map(String::as_str), Some("q2"));
        assert_eq!(questions.last().map(String::as_str), Some("q11"));

        let recent = store.recent_turns("s", 3).await.unwrap();
        assert_eq!(recent, vec![turn(9), turn(10), turn(11)]);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = InMemorySessionStore::new(10);
        store.append("a", turn(0)).await.unwrap();
        store.append("b", turn(1)).await.unwrap();

        assert_eq!(store.turns("a").await.unwrap(), vec![turn(0)]);
        assert_eq!(store.turns("b").await.unwrap(), vec![turn(1)]);
        assert_eq!(store.session_count().await, 2);
    }

    #[tokio::test]
    async fn test_expired_sessions_are_swept() {
        let store = InMemorySessionStore::new(10).with_ttl(Duration::zero());
        store.append("old", turn(0)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        assert!(store.turns("old").await.unwrap().is_empty());
        assert_eq!(store.evict_expired(), 1);
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_no_ttl_never_expires() {
        let store = InMemorySessionStore::new(10);
        store.append("s", turn(0)).await.unwrap();
        assert_eq!(store.evict_expired(), 0);
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_active() {
        let store = InMemorySessionStore::new(10).with_max_sessions(2);
        store.append("first", turn(0)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.append("second", turn(1)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.append("first", turn(2)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        store.append("third", turn(3)).await.unwrap();

        assert_eq!(store.session_count().await, 2);
        assert!(store.turns("second").await.unwrap().is_empty());
        assert_eq!(store.turns("first").await.unwrap().len(), 2);
    }
}
