//! The structured record threading through the inference pipeline.
//!
//! The record is assembled in two stages: the rule check produces a
//! [`RuleVerdict`], and only if that verdict is positive does extraction
//! produce an [`ExtractedMetrics`]. The merged [`InferenceRecord`] is what
//! gets logged and handed to the acceptance evaluator.
//!
//! ## Absent vs. null
//!
//! The elevation field must distinguish "the extractor did not report the
//! field at all" from "the extractor explicitly reported null" — the
//! leniency rule in acceptance depends on it. [`ElevationField`] keeps the
//! three states apart through serialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Elevation as reported by the extraction stage.
///
/// `Absent` means the field was missing from the reply entirely; it is
/// never serialized. `Null` round-trips as JSON `null`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ElevationField {
    /// Field missing from the extraction reply.
    #[default]
    Absent,
    /// Field explicitly reported as `null`.
    Null,
    /// Reported elevation gain in meters.
    Meters(f64),
}

impl ElevationField {
    /// True if the field was missing from the reply.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl Serialize for ElevationField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Absent is normally skipped at the struct level; if it is
            // serialized anyway, null is the closest wire shape.
            Self::Absent | Self::Null => serializer.serialize_none(),
            Self::Meters(v) => serializer.serialize_f64(*v),
        }
    }
}

impl<'de> Deserialize<'de> for ElevationField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<f64>::deserialize(deserializer)? {
            None => Self::Null,
            Some(v) => Self::Meters(v),
        })
    }
}

/// Decoded reply of the rule-compliance stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleVerdict {
    /// Whether the image satisfies the base acceptability rules.
    pub valid_rules: bool,

    /// Optional human-readable justification from the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_rules: Option<String>,
}

/// Decoded reply of the data-extraction stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedMetrics {
    /// Distance in meters, if the extractor reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    /// Elevation gain in meters, null, or absent.
    #[serde(default, skip_serializing_if = "ElevationField::is_absent")]
    pub elevation: ElevationField,

    /// Kind of exercise the extractor recognized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_of_exercise: Option<String>,
}

/// The full pipeline record: rule verdict plus, on the happy path, the
/// extracted metrics.
///
/// Invariant: extraction fields are only populated when `valid_rules` is
/// true — a failed or errored rule check never carries metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InferenceRecord {
    pub valid_rules: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_rules: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    #[serde(default, skip_serializing_if = "ElevationField::is_absent")]
    pub elevation: ElevationField,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_of_exercise: Option<String>,
}

impl InferenceRecord {
    /// The fail-closed record: `{valid_rules: false}` with nothing else.
    ///
    /// Returned whenever a stage errored, so a transport hiccup can never
    /// read as compliance.
    pub fn rejected() -> Self {
        Self::default()
    }

    /// Record for a completed rule check that did not proceed to
    /// extraction (either rejected, or extraction not yet run).
    pub fn from_rule(rule: RuleVerdict) -> Self {
        Self {
            valid_rules: rule.valid_rules,
            reason_rules: rule.reason_rules,
            ..Self::default()
        }
    }

    /// Field-union of a positive rule verdict and the extraction reply.
    pub fn merged(rule: RuleVerdict, metrics: ExtractedMetrics) -> Self {
        Self {
            valid_rules: rule.valid_rules,
            reason_rules: rule.reason_rules,
            distance: metrics.distance,
            elevation: metrics.elevation,
            type_of_exercise: metrics.type_of_exercise,
        }
    }
}

/// One persisted validation result.
///
/// Created once per logged validation, never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the validation ran.
    pub time: DateTime<Utc>,

    /// The merged inference record.
    pub content: InferenceRecord,

    /// Reference to the validated image (path or URL), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
