//! Conversation history as an append-only list of turns.
//!
//! The history is rendered as plain text and pasted into every RAG prompt,
//! so the rendering format is part of the prompt contract.

use serde::{Deserialize, Serialize};

/// One user question and, once answered, the assistant's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub user: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant: Option<String>,
}

impl Turn {
    pub fn is_open(&self) -> bool {
        self.assistant.is_none()
    }
}

/// Session-lifetime conversation history.
///
/// Turns are only ever appended. The last turn may be completed once with
/// the assistant reply; completed turns never change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new open turn for `user`.
    pub fn begin_turn(&mut self, user: impl Into<String>) {
        self.turns.push(Turn {
            user: user.into(),
            assistant: None,
        });
    }

    /// Record the assistant reply on the last turn.
    ///
    /// Returns `false` and changes nothing if there is no turn or the last
    /// turn is already completed.
    pub fn complete_turn(&mut self, assistant: impl Into<String>) -> bool {
        match self.turns.last_mut() {
            Some(turn) if turn.is_open() => {
                turn.assistant = Some(assistant.into());
                true
            }
            _ => false,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Serialize the history for prompt construction.
    ///
    /// Completed turns render as `User: ..\nAssistant: ..\n\n`, open turns
    /// as `User: ..\n`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for turn in &self.turns {
            match &turn.assistant {
                Some(answer) => {
                    out.push_str(&format!("User: {}\nAssistant: {}\n\n", turn.user, answer));
                }
                None => out.push_str(&format!("User: {}\n", turn.user)),
            }
        }
        out
    }
}
