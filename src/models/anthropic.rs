//! Anthropic Messages API data models
//!
//! Request and response structures for the `/v1/messages` endpoint

use serde::{Deserialize, Serialize};

/// Anthropic messages request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicRequest {
    /// Model name
    pub model: String,
    /// System prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Message list
    pub messages: Vec<AnthropicMessage>,
    /// Maximum tokens to generate (required by the API)
    pub max_tokens: u32,
    /// Temperature parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Anthropic message with plain text content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

/// Anthropic messages response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// Response content block
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnthropicContentBlock {
    /// Text block
    #[serde(rename = "text")]
    Text { text: String },
    /// Any block type this service does not consume
    #[serde(other)]
    Unsupported,
}

impl AnthropicResponse {
    /// Text of the first text block, if any
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            AnthropicContentBlock::Text { text } => Some(text.as_str()),
            AnthropicContentBlock::Unsupported => None,
        })
    }
}

/// Anthropic error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicErrorResponse {
    pub error: AnthropicError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicError {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_text_skips_other_blocks() {
        let response: AnthropicResponse = serde_json::from_str(
            r#"{"id":"msg_1","content":[{"type":"thinking","thinking":"..."},{"type":"text","text":"answer"}],"stop_reason":"end_turn"}"#,
        )
        .unwrap();
        assert_eq!(response.first_text(), Some("answer"));
    }

    #[test]
    fn test_request_shape() {
        let request = AnthropicRequest {
            model: "claude-3-5-haiku-latest".to_string(),
            system: Some("sys".to_string()),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
            max_tokens: 1024,
            temperature: Some(0.3),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["system"], "sys");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
