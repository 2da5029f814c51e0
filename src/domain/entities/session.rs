use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// One committed question/answer exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

impl Turn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Bounded log of the turns exchanged under one session id.
#[derive(Debug, Clone)]
pub struct Session {
    turns: VecDeque<Turn>,
    max_turns: usize,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    pub fn new(max_turns: usize) -> Self {
        let now = Utc::now();
        Self {
            turns: VecDeque::with_capacity(max_turns.min(16)),
            max_turns: max_turns.max(1),
            created_at: now,
            last_active: now,
        }
    }

    /// Mints a fresh random session id.
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Appends a turn, evicting from the front to stay within the cap.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
        self.last_active = Utc::now();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    /// The last `limit` turns, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<Turn> {
        let skip = self.turns.len().saturating_sub(limit);
        self.turns.iter().skip(skip).cloned().collect()
    }
}

/// Renders turns as the history block of a prompt.
///
/// Empty input renders as an empty string so the slot disappears.
pub fn format_history(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return String::new();
    }

    let mut history = String::from("Previous conversation:\n");
    for turn in turns {
        history.push_str(&format!("Q: {}\nA: {}\n", turn.question, turn.answer));
    }
    history.push('\n');
    history
}
