//! Surface Messages
//!
//! The closed set of events the Conductor emits to whichever display surface
//! is attached. Every message carries a `type` tag, a display `content`
//! string, and an optional structured `data` payload whose shape depends on
//! the tag.
//!
//! # Design Philosophy
//!
//! Surfaces are pure renderers. They never inspect the conversation directly;
//! everything they show arrives as a [`Message`]. A message is created once by
//! the Conductor, handed to the surface, and never mutated afterwards.
//!
//! Structured payloads are stored as JSON values so that a surface on the far
//! side of a serialization boundary sees the same shape as an in-process one.
//! Encoding a payload can fail in principle; when it does the message degrades
//! to content-only instead of being dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discriminator for [`Message`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Text the user typed (echo of accepted input)
    UserInput,
    /// Assistant text from the model
    Assistant,
    /// A tool is about to run
    ToolCall,
    /// A tool finished (successfully or not)
    ToolResult,
    /// Something went wrong; rendered distinctly
    Error,
    /// Informational line from the Conductor itself
    SystemInfo,
}

impl MessageKind {
    /// Wire name of this kind (matches the serde tag)
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserInput => "user_input",
            Self::Assistant => "assistant",
            Self::ToolCall => "tool_call",
            Self::ToolResult => "tool_result",
            Self::Error => "error",
            Self::SystemInfo => "system_info",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload attached to `tool_call` messages
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCallData {
    /// Name the model asked for (may be unregistered)
    pub tool_name: String,
    /// Invocation identifier assigned by the model gateway
    pub tool_id: String,
    /// Raw input exactly as the model produced it
    pub input: Value,
}

/// Payload attached to `tool_result` messages
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResultData {
    /// Name of the tool that ran
    pub tool_name: String,
    /// Invocation identifier this result answers
    pub tool_id: String,
    /// Full, untruncated result text
    pub result: String,
    /// Whether the tool failed (or was not found)
    pub is_error: bool,
}

/// A single event from the Conductor to a display surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// What kind of event this is
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Human-readable content
    pub content: String,
    /// Kind-specific structured payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Message {
    /// Create a content-only message
    pub fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            data: None,
        }
    }

    pub fn user_input(content: impl Into<String>) -> Self {
        Self::new(MessageKind::UserInput, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Assistant, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, content)
    }

    pub fn system_info(content: impl Into<String>) -> Self {
        Self::new(MessageKind::SystemInfo, content)
    }

    /// Announce a tool invocation
    ///
    /// The content is the tool name; the raw input travels in `data`.
    pub fn tool_call(call: &ToolCallData) -> Self {
        Self::with_payload(MessageKind::ToolCall, call.tool_name.clone(), call)
    }

    /// Report a tool outcome
    ///
    /// The content is the full result text; surfaces truncate for display.
    pub fn tool_result(result: &ToolResultData) -> Self {
        Self::with_payload(MessageKind::ToolResult, result.result.clone(), result)
    }

    fn with_payload<T: Serialize>(kind: MessageKind, content: String, payload: &T) -> Self {
        let data = match serde_json::to_value(payload) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(kind = %kind, error = %e, "Failed to encode message payload, sending content only");
                None
            }
        };
        Self {
            kind,
            content,
            data,
        }
    }

    /// Decode the `tool_call` payload, if present and well-formed
    #[must_use]
    pub fn tool_call_data(&self) -> Option<ToolCallData> {
        self.decode_payload(MessageKind::ToolCall)
    }

    /// Decode the `tool_result` payload, if present and well-formed
    #[must_use]
    pub fn tool_result_data(&self) -> Option<ToolResultData> {
        self.decode_payload(MessageKind::ToolResult)
    }

    fn decode_payload<T: serde::de::DeserializeOwned>(&self, expected: MessageKind) -> Option<T> {
        if self.kind != expected {
            return None;
        }
        let value = self.data.as_ref()?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Whether this message should be rendered as a failure
    #[must_use]
    pub fn is_error(&self) -> bool {
        match self.kind {
            MessageKind::Error => true,
            MessageKind::ToolResult => self.tool_result_data().is_some_and(|d| d.is_error),
            _ => false,
        }
    }
}
