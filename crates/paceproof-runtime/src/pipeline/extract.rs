//! Data-extraction stage: request building and reply decoding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use paceproof_core::ExtractedMetrics;
use serde_json::Value as JsonValue;

use crate::client::{ChatMessage, ChatPayload, ClientError};
use crate::config::PromptBundle;

/// Build the single-message extraction request: the extraction prompt
/// with the image attached, constrained by the externally supplied
/// output schema (passed through opaquely).
pub fn build_request(
    prompts: &PromptBundle,
    output_schema: &JsonValue,
    model: &str,
    image: &[u8],
) -> ChatPayload {
    ChatPayload::new(
        model,
        vec![ChatMessage::user(&prompts.data_extract).with_image(BASE64.encode(image))],
    )
    .with_format(output_schema.clone())
}

/// Decode the extraction reply. Unknown fields from a caller-supplied
/// schema are tolerated; only the known metric fields are kept.
pub fn decode_reply(reply: JsonValue) -> Result<ExtractedMetrics, ClientError> {
    serde_json::from_value(reply)
        .map_err(|e| ClientError::Decode(format!("extraction reply did not match schema: {e}")))
}
