//! Chat request types for the vision model.

use serde::Serialize;

use crate::types::ImageMime;

/// Role in a chat conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One block of multimodal message content, in the Anthropic Messages wire
/// shape.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub source_type: &'static str,
    pub media_type: String,
    pub data: String,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    /// A base64-encoded image block tagged with its MIME type.
    pub fn image(mime: ImageMime, data_base64: String) -> Self {
        ContentBlock::Image {
            source: ImageSource {
                source_type: "base64",
                media_type: mime.as_mime().to_string(),
                data: data_base64,
            },
        }
    }
}

/// A message in a chat conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl ChatMessage {
    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    /// An assistant-turn prefix used to bias the response format (e.g. an
    /// opening bracket so the model continues a JSON array).
    pub fn assistant_prefill(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::text(text)],
        }
    }
}

/// Request for a chat completion.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub system: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

impl ChatRequest {
    /// Concatenated text content of all messages. Used by the fake client
    /// for substring matching.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for message in &self.messages {
            for block in &message.content {
                if let ContentBlock::Text { text } = block {
                    out.push_str(text);
                    out.push('\n');
                }
            }
        }
        out
    }
}
