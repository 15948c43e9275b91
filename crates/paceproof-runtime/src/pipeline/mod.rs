//! Inference orchestrator.
//!
//! Sequences the rule-compliance check and the data extraction against
//! the chat client, fail-closed at every boundary:
//! - a transport or decoding failure at either stage is reported to the
//!   error sink and collapses the run to `None` — "cannot confirm
//!   compliance, therefore reject";
//! - a negative rule verdict returns immediately, extraction is never
//!   attempted (the expected early-reject path, not an error);
//! - only a positive rule verdict followed by a successful extraction
//!   yields a merged record.
//!
//! A failure must never read as "passed": the caller sees either a
//! completed record or `None`, never an exception. `None` evaluates as a
//! rejection and is the one outcome that skips result logging.

pub mod extract;
pub mod rules;

use paceproof_core::InferenceRecord;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::client::ChatClient;
use crate::config::PromptBundle;
use crate::logs::{ErrorSink, Stage};

/// Two-stage inference pipeline over a chat client.
pub struct InferencePipeline {
    client: Arc<dyn ChatClient>,
    errors: Arc<dyn ErrorSink>,
    prompts: PromptBundle,
    output_schema: JsonValue,
    rule_model: String,
    extract_model: String,
}

impl InferencePipeline {
    pub fn new(
        client: Arc<dyn ChatClient>,
        errors: Arc<dyn ErrorSink>,
        prompts: PromptBundle,
        output_schema: JsonValue,
        rule_model: impl Into<String>,
        extract_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            errors,
            prompts,
            output_schema,
            rule_model: rule_model.into(),
            extract_model: extract_model.into(),
        }
    }

    /// Report a caught failure and degrade the run.
    fn fail_closed(&self, stage: Stage, message: &str) -> Option<InferenceRecord> {
        tracing::warn!(%stage, error = message, "inference stage failed, rejecting");
        self.errors.report(stage, message);
        None
    }

    /// Run both stages against the image.
    ///
    /// Returns `None` when a stage failed (already reported to the error
    /// sink); the caller must treat that as a rejection. Never errors.
    pub async fn run_inference(&self, image: &[u8]) -> Option<InferenceRecord> {
        let rule_request = rules::build_request(&self.prompts, &self.rule_model, image);
        let rule = match self.client.chat(rule_request).await {
            Ok(reply) => match rules::decode_reply(reply) {
                Ok(verdict) => verdict,
                Err(e) => return self.fail_closed(Stage::RuleCheck, &e.to_string()),
            },
            Err(e) => return self.fail_closed(Stage::RuleCheck, &e.to_string()),
        };

        if !rule.valid_rules {
            tracing::debug!(reason = ?rule.reason_rules, "image rejected by rules");
            return Some(InferenceRecord::from_rule(rule));
        }

        let extract_request = extract::build_request(
            &self.prompts,
            &self.output_schema,
            &self.extract_model,
            image,
        );
        match self.client.chat(extract_request).await {
            Ok(reply) => match extract::decode_reply(reply) {
                Ok(metrics) => Some(InferenceRecord::merged(rule, metrics)),
                Err(e) => self.fail_closed(Stage::DataExtraction, &e.to_string()),
            },
            Err(e) => self.fail_closed(Stage::DataExtraction, &e.to_string()),
        }
    }

    /// Report an image-resolution failure.
    ///
    /// Image bytes are read on the way into the rule check, so the
    /// failure is charged to that stage.
    pub(crate) fn report_image_failure(&self, message: &str) {
        self.fail_closed(Stage::RuleCheck, message);
    }
}
