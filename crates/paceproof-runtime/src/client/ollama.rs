//! Ollama chat client.
//!
//! Speaks the `/api/chat` wire format: the payload goes out with
//! `stream: false` forced, the reply arrives as `{message: {content}}`,
//! and `content` itself is a JSON document (the structured reply the
//! `format` schema asked for).

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

use super::{BasicCredentials, ChatClient, ChatMessage, ChatPayload, ClientError};
use async_trait::async_trait;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Chat client for an Ollama server behind basic auth.
#[derive(Debug)]
pub struct OllamaClient {
    credentials: BasicCredentials,
    http: reqwest::Client,
}

impl OllamaClient {
    /// Create a client with the default request timeout.
    pub fn new(credentials: BasicCredentials) -> Result<Self, ClientError> {
        Self::with_timeout(credentials, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit request timeout. Vision models
    /// can take a while on large images; callers needing tighter bounds
    /// set them here.
    pub fn with_timeout(
        credentials: BasicCredentials,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(Self { credentials, http })
    }
}

/// On-the-wire request: the payload plus the forced `stream` flag.
#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<JsonValue>,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn chat(&self, payload: ChatPayload) -> Result<JsonValue, ClientError> {
        let request = OllamaRequest {
            model: payload.model,
            messages: payload.messages,
            format: payload.format,
            stream: false,
        };

        let url = format!("{}/api/chat", self.credentials.base_url());
        let response = self
            .http
            .post(&url)
            .basic_auth(
                self.credentials.username(),
                Some(self.credentials.expose_password()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: OllamaResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("malformed chat response: {e}")))?;

        // The structured reply lives inside the message content.
        serde_json::from_str(&body.message.content)
            .map_err(|e| ClientError::Decode(format!("content is not valid JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_request_always_disables_streaming() {
        let request = OllamaRequest {
            model: "gemma3:27b".into(),
            messages: vec![ChatMessage::user("hi")],
            format: None,
            stream: false,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["stream"], serde_json::json!(false));
        assert!(value.get("format").is_none());
    }
}
