//! The validator facade: the one public operation.
//!
//! Composes image resolution, the two-stage inference pipeline, optional
//! result logging, and the acceptance evaluation into a single call that
//! never errors for expected domain outcomes. Only construction fails
//! loudly (unreadable credentials, prompts, or schema).

use chrono::Utc;
use paceproof_core::{accept, InferenceRecord, LogEntry, Verdict};
use std::sync::Arc;

use crate::client::{ChatClient, ClientError, OllamaClient};
use crate::config::{ConfigError, ValidatorConfig};
use crate::image::ImageSource;
use crate::logs::{ErrorSink, FileErrorSink, JsonDirLog, ResultLog};
use crate::pipeline::InferencePipeline;

/// Errors constructing a [`Validator`].
#[derive(thiserror::Error, Debug)]
pub enum ValidatorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Top-level entry point for activity-image validation.
pub struct Validator {
    pipeline: InferencePipeline,
    result_log: Arc<dyn ResultLog>,
}

impl Validator {
    /// Build a validator backed by an [`OllamaClient`] from loaded
    /// configuration. Fails loudly: a validator without working
    /// configuration cannot operate.
    pub fn new(config: ValidatorConfig) -> Result<Self, ValidatorError> {
        let ValidatorConfig {
            credentials,
            prompts,
            output_schema,
            error_log,
            log_dir,
            rule_model,
            extract_model,
        } = config;

        let client = Arc::new(OllamaClient::new(credentials)?);
        let errors = Arc::new(FileErrorSink::new(error_log));
        let result_log = Arc::new(JsonDirLog::new(log_dir));

        Ok(Self::with_collaborators(
            client,
            errors,
            result_log,
            prompts,
            output_schema,
            rule_model,
            extract_model,
        ))
    }

    /// Build a validator from explicit collaborators. This is the seam
    /// tests use to substitute stub clients and in-memory logs.
    #[allow(clippy::too_many_arguments)]
    pub fn with_collaborators(
        client: Arc<dyn ChatClient>,
        errors: Arc<dyn ErrorSink>,
        result_log: Arc<dyn ResultLog>,
        prompts: crate::config::PromptBundle,
        output_schema: serde_json::Value,
        rule_model: impl Into<String>,
        extract_model: impl Into<String>,
    ) -> Self {
        Self {
            pipeline: InferencePipeline::new(
                client,
                errors,
                prompts,
                output_schema,
                rule_model,
                extract_model,
            ),
            result_log,
        }
    }

    /// Validate an image against the declared metrics.
    ///
    /// Runs inference, logs the record if requested and inference
    /// completed, then evaluates acceptance with elevation leniency
    /// enabled. Never errors: transport and decoding failures have
    /// already been degraded to a rejection by the pipeline, and
    /// log-write failures are best-effort.
    pub async fn validate(
        &self,
        image: ImageSource,
        declared_distance: u32,
        declared_elevation: u32,
        make_logs: bool,
    ) -> Verdict {
        let record = match image.resolve().await {
            Ok(bytes) => self.pipeline.run_inference(&bytes).await,
            Err(e) => {
                self.pipeline.report_image_failure(&e.to_string());
                None
            }
        };

        // A failed run produced no record; there is nothing to log.
        if make_logs {
            if let Some(record) = &record {
                self.log_record(record, &image);
            }
        }

        let record = record.unwrap_or_else(InferenceRecord::rejected);
        accept(&record, declared_distance, declared_elevation, true)
    }

    fn log_record(&self, record: &InferenceRecord, image: &ImageSource) {
        let entry = LogEntry {
            time: Utc::now(),
            content: record.clone(),
            image: image.reference(),
        };
        if let Err(e) = self.result_log.append(&entry) {
            tracing::warn!(error = %e, "result log write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatPayload;
    use crate::config::PromptBundle;
    use crate::logs::{LogError, Stage};
    use async_trait::async_trait;
    use serde_json::{json, Value as JsonValue};
    use std::sync::Mutex;

    struct ScriptedClient {
        replies: Mutex<Vec<Result<JsonValue, ClientError>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<JsonValue, ClientError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedClient {
        async fn chat(&self, _payload: ChatPayload) -> Result<JsonValue, ClientError> {
            *self.calls.lock().unwrap() += 1;
            self.replies.lock().unwrap().remove(0)
        }
    }

    #[derive(Default)]
    struct MemorySink {
        lines: Mutex<Vec<String>>,
    }

    impl ErrorSink for MemorySink {
        fn report(&self, stage: Stage, message: &str) {
            self.lines
                .lock()
                .unwrap()
                .push(format!("{stage} error: {message}"));
        }
    }

    #[derive(Default)]
    struct MemoryLog {
        entries: Mutex<Vec<LogEntry>>,
    }

    impl ResultLog for MemoryLog {
        fn append(&self, entry: &LogEntry) -> Result<(), LogError> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    fn prompts() -> PromptBundle {
        serde_json::from_value(json!({
            "rule_definition": "rules",
            "understand": "ok",
            "data_extract": "extract"
        }))
        .unwrap()
    }

    fn validator(
        client: Arc<ScriptedClient>,
        sink: Arc<MemorySink>,
        log: Arc<MemoryLog>,
    ) -> Validator {
        Validator::with_collaborators(
            client,
            sink,
            log,
            prompts(),
            json!({ "type": "object" }),
            "gemma3:27b",
            "qwen2.5vl",
        )
    }

    fn happy_replies() -> Vec<Result<JsonValue, ClientError>> {
        vec![
            Ok(json!({ "valid_rules": true })),
            Ok(json!({ "distance": 7900, "elevation": 110 })),
        ]
    }

    #[tokio::test]
    async fn matching_claims_are_accepted() {
        let v = validator(
            ScriptedClient::new(happy_replies()),
            Arc::default(),
            Arc::default(),
        );
        let verdict = v
            .validate(ImageSource::Bytes(b"img".to_vec()), 7900, 110, false)
            .await;
        assert_eq!(<(bool, u8)>::from(verdict), (true, 0));
    }

    #[tokio::test]
    async fn distance_mismatch_is_code_2() {
        let client = ScriptedClient::new(vec![
            Ok(json!({ "valid_rules": true })),
            Ok(json!({ "distance": 4200, "elevation": 110 })),
        ]);
        let v = validator(client, Arc::default(), Arc::default());
        let verdict = v
            .validate(ImageSource::Bytes(b"img".to_vec()), 7900, 110, false)
            .await;
        assert_eq!(<(bool, u8)>::from(verdict), (false, 2));
    }

    #[tokio::test]
    async fn elevation_mismatch_is_code_3() {
        let client = ScriptedClient::new(vec![
            Ok(json!({ "valid_rules": true })),
            Ok(json!({ "distance": 7900, "elevation": 42 })),
        ]);
        let v = validator(client, Arc::default(), Arc::default());
        let verdict = v
            .validate(ImageSource::Bytes(b"img".to_vec()), 7900, 110, false)
            .await;
        assert_eq!(<(bool, u8)>::from(verdict), (false, 3));
    }

    #[tokio::test]
    async fn null_elevation_is_lenient_through_the_facade() {
        let client = ScriptedClient::new(vec![
            Ok(json!({ "valid_rules": true })),
            Ok(json!({ "distance": 7900, "elevation": null })),
        ]);
        let v = validator(client, Arc::default(), Arc::default());
        let verdict = v
            .validate(ImageSource::Bytes(b"img".to_vec()), 7900, 110, false)
            .await;
        assert!(verdict.accepted);
    }

    #[tokio::test]
    async fn rule_rejection_is_code_1_regardless_of_claims() {
        let client = ScriptedClient::new(vec![Ok(json!({ "valid_rules": false }))]);
        let v = validator(client.clone(), Arc::default(), Arc::default());
        let verdict = v
            .validate(ImageSource::Bytes(b"img".to_vec()), 1, 1, false)
            .await;
        assert_eq!(<(bool, u8)>::from(verdict), (false, 1));
        assert_eq!(*client.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn rule_stage_error_yields_false_1_not_a_panic() {
        let client =
            ScriptedClient::new(vec![Err(ClientError::Http("connection refused".into()))]);
        let sink = Arc::new(MemorySink::default());
        let v = validator(client, sink.clone(), Arc::default());

        let verdict = v
            .validate(ImageSource::Bytes(b"img".to_vec()), 7900, 110, false)
            .await;

        assert_eq!(<(bool, u8)>::from(verdict), (false, 1));
        assert_eq!(sink.lines.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn extraction_error_yields_false_1_with_distinct_sink_line() {
        let client = ScriptedClient::new(vec![
            Ok(json!({ "valid_rules": true })),
            Err(ClientError::Decode("content is not valid JSON".into())),
        ]);
        let sink = Arc::new(MemorySink::default());
        let v = validator(client, sink.clone(), Arc::default());

        let verdict = v
            .validate(ImageSource::Bytes(b"img".to_vec()), 7900, 110, false)
            .await;

        assert_eq!(<(bool, u8)>::from(verdict), (false, 1));
        let lines = sink.lines.lock().unwrap();
        assert!(lines[0].starts_with("Data extraction error:"));
    }

    #[tokio::test]
    async fn unreadable_image_fails_closed_and_hits_the_sink() {
        let client = ScriptedClient::new(vec![]);
        let sink = Arc::new(MemorySink::default());
        let v = validator(client.clone(), sink.clone(), Arc::default());

        let verdict = v
            .validate(
                ImageSource::Path("/nonexistent/run.jpg".into()),
                7900,
                110,
                false,
            )
            .await;

        assert_eq!(<(bool, u8)>::from(verdict), (false, 1));
        assert_eq!(*client.calls.lock().unwrap(), 0);
        assert!(sink.lines.lock().unwrap()[0].starts_with("Rule check error:"));
    }

    #[tokio::test]
    async fn make_logs_true_appends_exactly_one_entry() {
        let log = Arc::new(MemoryLog::default());
        let v = validator(
            ScriptedClient::new(happy_replies()),
            Arc::default(),
            log.clone(),
        );

        v.validate(ImageSource::Bytes(b"img".to_vec()), 7900, 110, true)
            .await;

        let entries = log.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].content.valid_rules);
        assert_eq!(entries[0].content.distance, Some(7900.0));
    }

    #[tokio::test]
    async fn failed_inference_is_never_logged() {
        let log = Arc::new(MemoryLog::default());
        let client =
            ScriptedClient::new(vec![Err(ClientError::Http("connection refused".into()))]);
        let v = validator(client, Arc::default(), log.clone());

        v.validate(ImageSource::Bytes(b"img".to_vec()), 7900, 110, true)
            .await;

        assert!(log.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn make_logs_false_never_touches_the_log() {
        let log = Arc::new(MemoryLog::default());
        let v = validator(
            ScriptedClient::new(happy_replies()),
            Arc::default(),
            log.clone(),
        );

        v.validate(ImageSource::Bytes(b"img".to_vec()), 7900, 110, false)
            .await;

        assert!(log.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn log_entry_carries_the_image_reference() {
        let log = Arc::new(MemoryLog::default());
        let client = ScriptedClient::new(vec![Ok(json!({ "valid_rules": false }))]);
        let v = validator(client, Arc::default(), log.clone());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"jpeg").unwrap();

        v.validate(ImageSource::from(file.path()), 7900, 110, true)
            .await;

        let entries = log.entries.lock().unwrap();
        assert_eq!(
            entries[0].image.as_deref(),
            Some(file.path().display().to_string().as_str())
        );
    }
}
