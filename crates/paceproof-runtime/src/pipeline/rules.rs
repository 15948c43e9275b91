//! Rule-compliance stage: request building and reply decoding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use paceproof_core::RuleVerdict;
use serde_json::json;

use crate::client::{ChatMessage, ChatPayload, ClientError};
use crate::config::PromptBundle;

/// Fixed final instruction accompanying the image.
const RULE_CHECK_INSTRUCTION: &str =
    "Here is the image. Evaluate its validity against the rules, then answer as JSON.";

/// Build the three-message rule-check conversation: rule definitions,
/// the assistant's priming acknowledgement, and the image with a fixed
/// instruction. The reply is constrained to `{valid_rules, reason_rules}`.
pub fn build_request(prompts: &PromptBundle, model: &str, image: &[u8]) -> ChatPayload {
    ChatPayload::new(
        model,
        vec![
            ChatMessage::user(&prompts.rule_definition),
            ChatMessage::assistant(&prompts.understand),
            ChatMessage::user(RULE_CHECK_INSTRUCTION).with_image(BASE64.encode(image)),
        ],
    )
    .with_format(json!({
        "type": "object",
        "properties": {
            "valid_rules": { "type": "boolean" },
            "reason_rules": { "type": "string" }
        },
        "required": ["valid_rules"]
    }))
}

/// Decode the structured reply. A reply without `valid_rules` violates
/// the requested schema and is a decoding failure.
pub fn decode_reply(reply: serde_json::Value) -> Result<RuleVerdict, ClientError> {
    serde_json::from_value(reply)
        .map_err(|e| ClientError::Decode(format!("rule verdict did not match schema: {e}")))
}
