//! Anthropic Messages API wire types.

use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub(crate) const MESSAGES_PATH: &str = "/v1/messages";
pub(crate) const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
pub(crate) struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system: &'a str,
    pub messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Message<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl MessagesResponse {
    /// Concatenated text of all text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = MessagesRequest {
            model: "claude-sonnet-4-5-20250929",
            max_tokens: 64000,
            temperature: 0.0,
            system: "Refactor this",
            messages: vec![Message {
                role: "user",
                content: "void start() {}",
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "claude-sonnet-4-5-20250929",
                "max_tokens": 64000,
                "temperature": 0.0,
                "system": "Refactor this",
                "messages": [{"role": "user", "content": "void start() {}"}]
            })
        );
    }

    #[test]
    fn test_response_text_skips_non_text_blocks() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "void init() {"},
                {"type": "text", "text": "}"}
            ]
        }))
        .unwrap();
        assert_eq!(response.text(), "void init() {}");
    }
}
