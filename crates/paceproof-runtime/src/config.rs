//! Static configuration: prompts, output schema, credentials, log
//! locations, and model selection.
//!
//! All of it is loaded once at validator construction and read-only
//! afterward. Load failures are the one place this library fails loudly:
//! without prompts, schema, or credentials there is nothing to run.

use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::client::BasicCredentials;

/// Default model for the rule-compliance stage.
pub const DEFAULT_RULE_MODEL: &str = "gemma3:27b";

/// Default model for the data-extraction stage.
pub const DEFAULT_EXTRACT_MODEL: &str = "qwen2.5vl";

/// Errors loading configuration at construction time.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("credential file {path} is missing the {field} line")]
    MissingCredentialLine { path: PathBuf, field: &'static str },
}

/// The static prompt set driving both inference stages.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptBundle {
    /// Rule definitions presented to the model before it sees the image.
    pub rule_definition: String,

    /// Fixed assistant priming reply, acknowledging the rules.
    pub understand: String,

    /// Instruction for the data-extraction stage.
    pub data_extract: String,
}

impl PromptBundle {
    /// Load the bundle from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = read(path)?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Load the extraction output schema.
///
/// The schema is opaque to this crate: it is decoded only to prove it is
/// valid JSON, then passed through to the inference endpoint untouched.
pub fn load_output_schema(path: impl AsRef<Path>) -> Result<JsonValue, ConfigError> {
    let path = path.as_ref();
    let raw = read(path)?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Everything the validator needs to run.
#[derive(Debug)]
pub struct ValidatorConfig {
    /// Endpoint credentials (base URL, username, password).
    pub credentials: BasicCredentials,

    /// Prompt set for both stages.
    pub prompts: PromptBundle,

    /// Opaque extraction output schema.
    pub output_schema: JsonValue,

    /// File receiving one line per caught inference failure.
    pub error_log: PathBuf,

    /// Directory receiving one result-log file per validated image.
    pub log_dir: PathBuf,

    /// Model for the rule-compliance stage.
    pub rule_model: String,

    /// Model for the data-extraction stage.
    pub extract_model: String,
}

impl ValidatorConfig {
    /// Load credentials, prompts, and schema from their files, with
    /// default log locations and models.
    pub fn load(
        credentials: impl AsRef<Path>,
        prompts: impl AsRef<Path>,
        output_schema: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            credentials: BasicCredentials::from_file(credentials)?,
            prompts: PromptBundle::from_file(prompts)?,
            output_schema: load_output_schema(output_schema)?,
            error_log: PathBuf::from("errors/errors.txt"),
            log_dir: PathBuf::from("logs"),
            rule_model: DEFAULT_RULE_MODEL.to_string(),
            extract_model: DEFAULT_EXTRACT_MODEL.to_string(),
        })
    }

    /// Override the error-log file.
    pub fn with_error_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.error_log = path.into();
        self
    }

    /// Override the result-log directory.
    pub fn with_log_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_dir = path.into();
        self
    }

    /// Override the rule-stage model.
    pub fn with_rule_model(mut self, model: impl Into<String>) -> Self {
        self.rule_model = model.into();
        self
    }

    /// Override the extraction-stage model.
    pub fn with_extract_model(mut self, model: impl Into<String>) -> Self {
        self.extract_model = model.into();
        self
    }
}
