//! Chat-client abstractions for the inference endpoint.
//!
//! This module defines the wire types for chat requests, the
//! [`ChatClient`] seam the pipeline talks through, and the error
//! taxonomy. The concrete Ollama implementation lives in [`ollama`];
//! tests substitute in-memory stubs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

mod credentials;
mod ollama;

pub use credentials::BasicCredentials;
pub use ollama::OllamaClient;

/// Errors from a chat client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("reply decoding failed: {0}")]
    Decode(String),
}

/// A single chat message, optionally carrying base64-encoded images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "user" or "assistant".
    pub role: String,

    /// Message content.
    pub content: String,

    /// Base64-encoded images attached to the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl ChatMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            images: None,
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
            images: None,
        }
    }

    /// Attach a base64-encoded image.
    pub fn with_image(mut self, image: String) -> Self {
        self.images.get_or_insert_with(Vec::new).push(image);
        self
    }
}

/// A full chat request: model, conversation, and optional reply schema.
#[derive(Debug, Clone, Serialize)]
pub struct ChatPayload {
    /// Model to use (e.g. "gemma3:27b").
    pub model: String,

    /// Ordered conversation.
    pub messages: Vec<ChatMessage>,

    /// JSON-schema-like object constraining the reply shape. Passed
    /// through opaquely; never interpreted locally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<JsonValue>,
}

impl ChatPayload {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            format: None,
        }
    }

    /// Constrain the reply to the given schema.
    pub fn with_format(mut self, format: JsonValue) -> Self {
        self.format = Some(format);
        self
    }
}

/// Trait for clients that can run one structured chat exchange.
///
/// Implementations are responsible for forcing non-streaming behavior
/// and for decoding the model's content field as JSON.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send a chat payload and return the decoded structured reply.
    async fn chat(&self, payload: ChatPayload) -> Result<JsonValue, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_omits_unset_fields() {
        let payload = ChatPayload::new("gemma3:27b", vec![ChatMessage::user("hi")]);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "gemma3:27b",
                "messages": [{ "role": "user", "content": "hi" }],
            })
        );
    }

    #[test]
    fn payload_carries_images_and_format() {
        let payload = ChatPayload::new(
            "qwen2.5vl",
            vec![ChatMessage::user("extract").with_image("aGVsbG8=".into())],
        )
        .with_format(json!({ "type": "object" }));

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["messages"][0]["images"], json!(["aGVsbG8="]));
        assert_eq!(value["format"], json!({ "type": "object" }));
    }
}
