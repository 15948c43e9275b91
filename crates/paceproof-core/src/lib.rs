//! # paceproof-core
//!
//! Deterministic half of the activity-image validator: the typed record
//! that threads through the inference pipeline and the acceptance
//! evaluation that turns it into a verdict.
//!
//! ## Key guarantees
//!
//! 1. **Deterministic**: same record and declared metrics always produce
//!    the same verdict.
//! 2. **No I/O**: this crate never touches the network or filesystem;
//!    model calls live in `paceproof-runtime`.
//! 3. **Fail-closed**: a record degraded by an upstream failure
//!    (`InferenceRecord::rejected()`) always evaluates to a rejection.
//! 4. **Stable codes**: reason codes 0–4 are a public contract.
//!
//! ## Example
//!
//! ```rust
//! use paceproof_core::{accept, ElevationField, InferenceRecord};
//!
//! let record = InferenceRecord {
//!     valid_rules: true,
//!     distance: Some(7900.0),
//!     elevation: ElevationField::Meters(110.0),
//!     ..InferenceRecord::default()
//! };
//!
//! let verdict = accept(&record, 7900, 110, true);
//! assert!(verdict.accepted);
//! ```

pub mod acceptance;
pub mod record;

// Re-export main types at crate root
pub use acceptance::{accept, ReasonCode, Verdict};
pub use record::{ElevationField, ExtractedMetrics, InferenceRecord, LogEntry, RuleVerdict};
