//! Request body for the messages-style model invoke API.

use serde::{Deserialize, Serialize};

use crate::models::config::ModelConfig;

/// Body sent to the text-generation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    /// Messages protocol version.
    #[serde(rename = "anthropic_version")]
    pub protocol_version: String,

    pub messages: Vec<Message>,

    /// Maximum number of generated tokens.
    #[serde(rename = "max_tokens")]
    pub max_output_tokens: u32,

    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
}

impl ModelRequest {
    /// A single user turn carrying `prompt`.
    pub fn user_prompt(prompt: impl Into<String>, config: &ModelConfig) -> Self {
        Self {
            protocol_version: config.protocol_version.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![ContentBlock::Text {
                    text: prompt.into(),
                }],
            }],
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        }
    }

    /// Text of the first user message.
    pub fn prompt_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == "user")
            .and_then(|m| m.content.first())
            .map(|ContentBlock::Text { text }| text.as_str())
    }
}
