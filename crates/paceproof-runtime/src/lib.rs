//! # paceproof-runtime
//!
//! Ollama-backed inference pipeline and validator facade for
//! activity-image validation.
//!
//! A [`Validator`] runs a two-stage pipeline against a vision-capable
//! model endpoint — a rule-compliance check, then structured metric
//! extraction — and compares the result against the caller's declared
//! distance and elevation. Expected domain outcomes (rule rejection,
//! metric mismatch, transport failure) are values, never errors; only
//! construction with unreadable configuration fails loudly.
//!
//! ## Example
//!
//! ```rust,ignore
//! use paceproof_runtime::{ImageSource, Validator, ValidatorConfig};
//!
//! let config = ValidatorConfig::load(
//!     "credentials.txt",
//!     "prompts.json",
//!     "output_schema.json",
//! )?;
//! let validator = Validator::new(config)?;
//!
//! let verdict = validator
//!     .validate(ImageSource::Path("run.jpg".into()), 7900, 110, true)
//!     .await;
//! println!("accepted: {}, code: {}", verdict.accepted, verdict.reason.code());
//! ```

pub mod client;
pub mod config;
pub mod image;
pub mod logs;
pub mod pipeline;
pub mod validator;

// Re-export main types at crate root
pub use client::{BasicCredentials, ChatClient, ChatMessage, ChatPayload, ClientError, OllamaClient};
pub use config::{ConfigError, PromptBundle, ValidatorConfig};
pub use image::{ImageError, ImageSource};
pub use logs::{ErrorSink, FileErrorSink, JsonDirLog, LogError, ResultLog, Stage};
pub use pipeline::InferencePipeline;
pub use validator::{Validator, ValidatorError};

// The deterministic half lives in paceproof-core; re-export the types
// callers need to interpret a verdict.
pub use paceproof_core::{accept, ElevationField, InferenceRecord, LogEntry, ReasonCode, Verdict};
