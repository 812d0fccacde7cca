//! Conversation Turns
//!
//! The transcript is the literal chat history fed back to the model each
//! cycle. Turns are appended and never edited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input
    User,
    /// Assistant (LLM) response
    Assistant,
    /// Tool result narrated back to the model
    Observation,
}

impl Role {
    /// Whether the model should treat this turn as fresh input
    pub fn is_input(self) -> bool {
        matches!(self, Role::User | Role::Observation)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Observation => write!(f, "observation"),
        }
    }
}

/// A single entry in the transcript
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Turn {
    /// Turn role
    pub role: Role,

    /// Raw text content
    pub text: String,

    /// Timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new turn
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn observation(text: impl Into<String>) -> Self {
        Self::new(Role::Observation, text)
    }
}

/// Append-only, insertion-ordered list of turns
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns, oldest first
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Most recent turn with the given role
    pub fn last_with_role(&self, role: Role) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role == role)
    }

    /// Split at the most recent user or observation turn.
    ///
    /// Returns the turns before it and the turn itself. With no input turn
    /// the whole transcript is returned as the prefix.
    pub fn split_last_input(&self) -> (&[Turn], Option<&Turn>) {
        match self.turns.iter().rposition(|t| t.role.is_input()) {
            Some(i) => (&self.turns[..i], Some(&self.turns[i])),
            None => (&self.turns, None),
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
