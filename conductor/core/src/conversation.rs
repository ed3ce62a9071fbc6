//! Conversation Transcript
//!
//! Append-only sequence of turns exchanged with the model. Owned exclusively
//! by the Conductor for the lifetime of a run.
//!
//! A tool-results turn may only follow an assistant turn that requested at
//! least one tool, and must answer every request exactly once, in order.
//! [`Conversation::push_tool_results`] enforces this.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Opaque correlation token assigned by the model gateway to a tool request
///
/// Never parsed or ordered; only compared for equality.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(String);

impl InvocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InvocationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One item of an assistant turn
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    /// Plain assistant text
    Text { text: String },
    /// Request to run a tool
    ToolUse {
        id: InvocationId,
        name: String,
        input: Value,
    },
}

/// A borrowed view of a tool request inside an assistant turn
#[derive(Clone, Copy, Debug)]
pub struct ToolInvocation<'a> {
    pub id: &'a InvocationId,
    pub name: &'a str,
    pub input: &'a Value,
}

/// Outcome of one tool invocation, as recorded in the transcript
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResultEntry {
    pub invocation_id: InvocationId,
    pub content: String,
    pub is_error: bool,
}

/// One atomic addition to the conversation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Turn {
    User { text: String },
    Assistant { content: Vec<ContentItem> },
    ToolResults { results: Vec<ToolResultEntry> },
}

impl Turn {
    /// Tool requests carried by this turn, in order (empty for non-assistant turns)
    pub fn tool_invocations(&self) -> impl Iterator<Item = ToolInvocation<'_>> {
        let items: &[ContentItem] = match self {
            Self::Assistant { content } => content,
            _ => &[],
        };
        items.iter().filter_map(|item| match item {
            ContentItem::ToolUse { id, name, input } => Some(ToolInvocation { id, name, input }),
            ContentItem::Text { .. } => None,
        })
    }

    /// Text items carried by this turn, in order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        let items: &[ContentItem] = match self {
            Self::Assistant { content } => content,
            _ => &[],
        };
        items.iter().filter_map(|item| match item {
            ContentItem::Text { text } => Some(text.as_str()),
            ContentItem::ToolUse { .. } => None,
        })
    }
}

/// Violations of the tool-results ordering rule
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("tool results must follow an assistant turn that requested tools")]
    NoPendingInvocations,

    #[error("expected {expected} tool results, got {actual}")]
    ResultCountMismatch { expected: usize, actual: usize },

    #[error("tool result at position {position} answers {actual}, expected {expected}")]
    InvocationMismatch {
        position: usize,
        expected: InvocationId,
        actual: InvocationId,
    },
}

/// Ordered, append-only transcript
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::User { text: text.into() });
    }

    pub fn push_assistant(&mut self, content: Vec<ContentItem>) {
        self.turns.push(Turn::Assistant { content });
    }

    /// Append a tool-results turn answering the previous assistant turn
    ///
    /// # Errors
    ///
    /// Rejects the turn unless the previous turn is an assistant turn with at
    /// least one tool request and `results` answers each request exactly once,
    /// in the same order.
    pub fn push_tool_results(
        &mut self,
        results: Vec<ToolResultEntry>,
    ) -> Result<(), ConversationError> {
        let Some(previous) = self.turns.last() else {
            return Err(ConversationError::NoPendingInvocations);
        };
        let pending: Vec<&InvocationId> = previous.tool_invocations().map(|inv| inv.id).collect();
        if pending.is_empty() {
            return Err(ConversationError::NoPendingInvocations);
        }
        if pending.len() != results.len() {
            return Err(ConversationError::ResultCountMismatch {
                expected: pending.len(),
                actual: results.len(),
            });
        }
        for (position, (expected, entry)) in pending.iter().zip(&results).enumerate() {
            if **expected != entry.invocation_id {
                return Err(ConversationError::InvocationMismatch {
                    position,
                    expected: (*expected).clone(),
                    actual: entry.invocation_id.clone(),
                });
            }
        }

        self.turns.push(Turn::ToolResults { results });
        Ok(())
    }
}
