//! Anthropic Gateway Implementation
//!
//! Model gateway for the Anthropic Messages API.
//!
//! # Messages API
//!
//! - `POST {base_url}/v1/messages` with `x-api-key` and `anthropic-version`
//!   headers
//! - User turns become `user` messages with a single `text` block
//! - Assistant turns become `assistant` messages of `text` / `tool_use` blocks
//! - Tool-results turns become `user` messages of `tool_result` blocks keyed
//!   by `tool_use_id`
//!
//! Request building and response parsing are plain functions so they can be
//! tested without a network.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::traits::{GatewayError, InferenceRequest, ModelGateway, ModelResponse};
use crate::config::TillerConfig;
use crate::conversation::{ContentItem, InvocationId, Turn};

/// Public API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Value of the `anthropic-version` header
pub const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client
#[derive(Clone)]
pub struct AnthropicGateway {
    /// API key sent as `x-api-key`
    api_key: String,
    /// Base URL without trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AnthropicGateway {
    /// Create a new gateway
    ///
    /// # Errors
    ///
    /// Fails if the key is empty or the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GatewayError::MissingApiKey);
        }
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Create from loaded configuration
    ///
    /// # Errors
    ///
    /// Fails if no API key was configured.
    pub fn from_config(config: &TillerConfig) -> Result<Self, GatewayError> {
        let api_key = config.api_key.clone().ok_or(GatewayError::MissingApiKey)?;
        Self::new(api_key, config.base_url.clone(), config.request_timeout)
    }

    /// Get messages endpoint URL
    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[async_trait]
impl ModelGateway for AnthropicGateway {
    fn name(&self) -> &'static str {
        "Anthropic"
    }

    async fn infer(&self, request: &InferenceRequest<'_>) -> Result<ModelResponse, GatewayError> {
        let body = build_request_body(request);
        tracing::debug!(
            model = request.model,
            turns = request.conversation.len(),
            "Sending inference request"
        );

        let response = self
            .http_client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message: api_error_message(&text).unwrap_or(text),
            });
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        parse_response(&value)
    }
}

/// Build the JSON body for a Messages API call
#[must_use]
pub fn build_request_body(request: &InferenceRequest<'_>) -> Value {
    let messages: Vec<Value> = request
        .conversation
        .turns()
        .iter()
        .filter_map(turn_to_wire)
        .collect();
    let mut body = json!({
        "model": request.model,
        "max_tokens": request.max_tokens,
        "messages": messages,
    });
    if !request.system_prompt.is_empty() {
        body["system"] = json!(request.system_prompt);
    }
    if !request.tools.is_empty() {
        body["tools"] = json!(request.tools);
    }
    body
}

/// Wire form of one turn; assistant turns with no content are dropped
fn turn_to_wire(turn: &Turn) -> Option<Value> {
    let message = match turn {
        Turn::User { text } => json!({
            "role": "user",
            "content": [{ "type": "text", "text": text }],
        }),
        Turn::Assistant { content } if content.is_empty() => return None,
        Turn::Assistant { content } => {
            let blocks: Vec<Value> = content
                .iter()
                .map(|item| match item {
                    ContentItem::Text { text } => json!({ "type": "text", "text": text }),
                    ContentItem::ToolUse { id, name, input } => json!({
                        "type": "tool_use",
                        "id": id,
                        "name": name,
                        "input": input,
                    }),
                })
                .collect();
            json!({ "role": "assistant", "content": blocks })
        }
        Turn::ToolResults { results } => {
            let blocks: Vec<Value> = results
                .iter()
                .map(|r| {
                    json!({
                        "type": "tool_result",
                        "tool_use_id": r.invocation_id,
                        "content": r.content,
                        "is_error": r.is_error,
                    })
                })
                .collect();
            json!({ "role": "user", "content": blocks })
        }
    };
    Some(message)
}

#[derive(Deserialize)]
struct WireResponse {
    content: Vec<WireBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

/// Parse a Messages API response body
///
/// # Errors
///
/// Fails if the body has no `content` array.
pub fn parse_response(body: &Value) -> Result<ModelResponse, GatewayError> {
    let wire = WireResponse::deserialize(body)
        .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

    let content = wire
        .content
        .into_iter()
        .filter_map(|block| match block {
            WireBlock::Text { text } => Some(ContentItem::Text { text }),
            WireBlock::ToolUse { id, name, input } => Some(ContentItem::ToolUse {
                id: InvocationId::new(id),
                name,
                input: if input.is_null() { json!({}) } else { input },
            }),
            WireBlock::Other => {
                tracing::debug!("Skipping unsupported content block");
                None
            }
        })
        .collect();

    Ok(ModelResponse {
        content,
        stop_reason: wire.stop_reason,
    })
}

/// Extract `error.message` from an API error body
fn api_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Conversation, ToolResultEntry};
    use crate::tools::ToolCatalog;
    use pretty_assertions::assert_eq;

    fn sample_conversation() -> Conversation {
        let mut conv = Conversation::new();
        conv.push_user("list files");
        conv.push_assistant(vec![
            ContentItem::Text {
                text: "Looking.".to_string(),
            },
            ContentItem::ToolUse {
                id: InvocationId::from("toolu_1"),
                name: "list_files".to_string(),
                input: json!({}),
            },
        ]);
        conv.push_tool_results(vec![ToolResultEntry {
            invocation_id: InvocationId::from("toolu_1"),
            content: "[\"a.rs\"]".to_string(),
            is_error: false,
        }])
        .unwrap();
        conv
    }

    #[test]
    fn test_request_body_shape() {
        let conv = sample_conversation();
        let specs = ToolCatalog::minimal().specs();
        let request = InferenceRequest {
            model: "claude-sonnet-4-0",
            max_tokens: 1024,
            system_prompt: "Be brief.",
            conversation: &conv,
            tools: &specs,
        };

        let body = build_request_body(&request);

        assert_eq!(body["model"], "claude-sonnet-4-0");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["system"], "Be brief.");
        assert_eq!(body["tools"].as_array().unwrap().len(), 2);
        assert_eq!(body["tools"][0]["name"], "read_file");
        assert_eq!(body["tools"][0]["input_schema"]["type"], "object");

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"][0]["text"], "list files");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["content"][1]["type"], "tool_use");
        assert_eq!(messages[1]["content"][1]["id"], "toolu_1");
        assert_eq!(messages[2]["role"], "user");
        assert_eq!(messages[2]["content"][0]["type"], "tool_result");
        assert_eq!(messages[2]["content"][0]["tool_use_id"], "toolu_1");
        assert_eq!(messages[2]["content"][0]["is_error"], false);
    }

    #[test]
    fn test_request_body_skips_empty_assistant_turn() {
        let mut conv = Conversation::new();
        conv.push_user("first");
        conv.push_assistant(vec![]);
        conv.push_user("second");
        let request = InferenceRequest {
            model: "m",
            max_tokens: 16,
            system_prompt: "",
            conversation: &conv,
            tools: &[],
        };

        let body = build_request_body(&request);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m["role"] == "user"));
    }

    #[test]
    fn test_request_body_omits_empty_tools_and_system() {
        let mut conv = Conversation::new();
        conv.push_user("hi");
        let request = InferenceRequest {
            model: "m",
            max_tokens: 16,
            system_prompt: "",
            conversation: &conv,
            tools: &[],
        };

        let body = build_request_body(&request);
        assert!(body.get("tools").is_none());
        assert!(body.get("system").is_none());
    }

    #[test]
    fn test_parse_response_text_and_tool_use() {
        let body = json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Let me check."},
                {"type": "tool_use", "id": "toolu_9", "name": "read_file", "input": {"path": "a"}},
                {"type": "thinking", "thinking": "..."}
            ],
            "stop_reason": "tool_use"
        });

        let response = parse_response(&body).unwrap();

        assert_eq!(
            response.content,
            vec![
                ContentItem::Text {
                    text: "Let me check.".to_string()
                },
                ContentItem::ToolUse {
                    id: InvocationId::from("toolu_9"),
                    name: "read_file".to_string(),
                    input: json!({"path": "a"}),
                },
            ]
        );
        assert_eq!(response.stop_reason.as_deref(), Some("tool_use"));
    }

    #[test]
    fn test_parse_response_rejects_missing_content() {
        let err = parse_response(&json!({"type": "message"})).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[test]
    fn test_api_error_message_extraction() {
        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        assert_eq!(api_error_message(body).as_deref(), Some("Overloaded"));
        assert_eq!(api_error_message("<html>bad gateway</html>"), None);
    }

    #[test]
    fn test_new_rejects_empty_key() {
        let err = AnthropicGateway::new("  ", DEFAULT_BASE_URL, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, GatewayError::MissingApiKey));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let gw = AnthropicGateway::new("k", "http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(gw.messages_url(), "http://localhost:8080/v1/messages");
    }
}
