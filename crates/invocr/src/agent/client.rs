//! Anthropic Messages API types and the HTTP transport.
//!
//! The transport is a trait so the tool-calling loop can be exercised
//! against a scripted fake in tests; the real implementation is a thin
//! reqwest client with no retries — a failed call is terminal for the run.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Maximum length for reported API error bodies to keep logs readable.
const MAX_ERROR_BODY_LENGTH: usize = 200;

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
    /// Block types this client does not act on (e.g. thinking blocks).
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: "assistant".to_string(),
            content,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn send(&self, request: &MessagesRequest) -> Result<MessagesResponse, AgentError>;
}

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: SecretString,
}

impl AnthropicClient {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl ModelTransport for AnthropicClient {
    async fn send(&self, request: &MessagesRequest) -> Result<MessagesResponse, AgentError> {
        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                body: sanitize_error_body(&body),
            });
        }

        Ok(response.json().await?)
    }
}

fn sanitize_error_body(body: &str) -> String {
    if body.len() > MAX_ERROR_BODY_LENGTH {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) && end > 0 {
            end -= 1;
        }
        format!("{}... (truncated)", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_block_tagging() {
        let block = ContentBlock::ToolResult {
            tool_use_id: "toolu_1".to_string(),
            content: "full text".to_string(),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "tool_result");
        assert_eq!(json["tool_use_id"], "toolu_1");
    }

    #[test]
    fn test_unknown_block_type_tolerated() {
        let json = r#"{"content": [{"type": "thinking", "thinking": "..."},
                                    {"type": "text", "text": "done"}],
                       "stop_reason": "end_turn"}"#;
        let response: MessagesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.content[0], ContentBlock::Unknown);
        assert_eq!(
            response.content[1],
            ContentBlock::Text {
                text: "done".to_string()
            }
        );
    }

    #[test]
    fn test_tool_use_roundtrip() {
        let json = r#"{"type": "tool_use", "id": "toolu_2", "name": "get_page_text",
                       "input": {"page_number": 3}}"#;
        let block: ContentBlock = serde_json::from_str(json).unwrap();
        let ContentBlock::ToolUse { name, input, .. } = &block else {
            panic!("expected tool_use block");
        };
        assert_eq!(name, "get_page_text");
        assert_eq!(input["page_number"], 3);
    }

    #[test]
    fn test_sanitize_error_body_truncates() {
        let long = "x".repeat(500);
        let sanitized = sanitize_error_body(&long);
        assert!(sanitized.len() < 250);
        assert!(sanitized.ends_with("(truncated)"));
        assert_eq!(sanitize_error_body("short"), "short");
    }
}
