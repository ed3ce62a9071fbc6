//! Model Gateway Traits
//!
//! Trait definitions for the language-model service the Conductor talks to.
//! The Conductor treats the gateway as an opaque request/response call: it
//! hands over the full conversation, the tool catalog and the system prompt,
//! and gets back an ordered list of content items or an error.
//!
//! # Design Philosophy
//!
//! Provider details (wire format, authentication, endpoints) stay inside the
//! implementation. No retry or backoff happens at this layer; a failed call is
//! reported once and the Conductor decides what to do with it.

use async_trait::async_trait;
use thiserror::Error;

use crate::conversation::{ContentItem, Conversation};
use crate::tools::ToolSpec;

/// Everything a gateway needs for one inference call
#[derive(Clone, Copy, Debug)]
pub struct InferenceRequest<'a> {
    /// Model identifier (provider-specific)
    pub model: &'a str,
    /// Maximum output tokens
    pub max_tokens: u32,
    /// System prompt text
    pub system_prompt: &'a str,
    /// Full transcript so far
    pub conversation: &'a Conversation,
    /// Tools the model may request
    pub tools: &'a [ToolSpec],
}

/// Structured reply from a gateway
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelResponse {
    /// Ordered text and tool-use items
    pub content: Vec<ContentItem>,
    /// Why generation stopped, when the provider says
    pub stop_reason: Option<String>,
}

impl ModelResponse {
    /// Whether any item asks for a tool
    #[must_use]
    pub fn has_tool_use(&self) -> bool {
        self.content
            .iter()
            .any(|item| matches!(item, ContentItem::ToolUse { .. }))
    }
}

/// Failures of a single inference call
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No credentials were configured
    #[error("missing API key (set ANTHROPIC_API_KEY)")]
    MissingApiKey,

    /// Transport-level failure
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the service
    #[error("API error ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message from the body, or the raw body
        message: String,
    },

    /// Body did not have the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Language-model service
///
/// Implement this trait to add support for a different provider.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Get the gateway name (e.g., "Anthropic")
    fn name(&self) -> &str;

    /// Run one inference call
    async fn infer(&self, request: &InferenceRequest<'_>) -> Result<ModelResponse, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::InvocationId;
    use serde_json::json;

    #[test]
    fn test_has_tool_use() {
        let mut response = ModelResponse {
            content: vec![ContentItem::Text {
                text: "hi".to_string(),
            }],
            stop_reason: Some("end_turn".to_string()),
        };
        assert!(!response.has_tool_use());

        response.content.push(ContentItem::ToolUse {
            id: InvocationId::from("t1"),
            name: "bash".to_string(),
            input: json!({"command": "ls"}),
        });
        assert!(response.has_tool_use());
    }

    #[test]
    fn test_status_error_display() {
        let err = GatewayError::Status {
            status: 529,
            message: "Overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "API error (529): Overloaded");
    }
}
