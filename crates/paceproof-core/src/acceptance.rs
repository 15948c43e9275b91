//! Deterministic acceptance evaluation.
//!
//! Compares an [`InferenceRecord`] against the user-declared distance and
//! elevation. Checks run in a fixed order and the first failing check
//! wins; the numeric reason codes are a stable public contract.
//!
//! The two metrics are deliberately held to different standards: distance
//! gets a ±5% relative band (screenshots round distances unpredictably),
//! elevation must match exactly when claimed.

use crate::record::{ElevationField, InferenceRecord};

/// Why a validation was accepted or rejected.
///
/// The numeric codes are stable and part of the public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonCode {
    /// All checks passed.
    Accepted = 0,
    /// The rule-compliance check rejected the image (or could not run).
    RulesRejected = 1,
    /// Extracted distance fell outside the ±5% band.
    DistanceMismatch = 2,
    /// Extracted elevation did not equal the declared value.
    ElevationMismatch = 3,
    /// The record was missing a field the evaluation needed.
    MalformedRecord = 4,
}

impl ReasonCode {
    /// Stable numeric code.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Terminal output of a validation: the pass/fail bit plus its reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub accepted: bool,
    pub reason: ReasonCode,
}

impl Verdict {
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            reason: ReasonCode::Accepted,
        }
    }

    pub fn rejected(reason: ReasonCode) -> Self {
        Self {
            accepted: false,
            reason,
        }
    }
}

impl From<Verdict> for (bool, u8) {
    fn from(v: Verdict) -> Self {
        (v.accepted, v.reason.code())
    }
}

/// Outcome of a single metric check.
enum Check {
    Pass,
    Fail,
    /// The record lacked the field the check needed.
    Malformed,
}

/// Evaluate a record against the declared metrics.
///
/// Order: rule compliance, then distance, then elevation; the first
/// failing check determines the reason code. `loose_elevation` makes a
/// null or missing extracted elevation non-disqualifying.
pub fn accept(
    record: &InferenceRecord,
    declared_distance: u32,
    declared_elevation: u32,
    loose_elevation: bool,
) -> Verdict {
    if !record.valid_rules {
        tracing::debug!(reason = ?record.reason_rules, "record rejected by rules");
        return Verdict::rejected(ReasonCode::RulesRejected);
    }

    match check_distance(record, declared_distance) {
        Check::Pass => {}
        Check::Fail => {
            tracing::debug!(
                declared = declared_distance,
                extracted = ?record.distance,
                "distance outside tolerance band"
            );
            return Verdict::rejected(ReasonCode::DistanceMismatch);
        }
        Check::Malformed => return Verdict::rejected(ReasonCode::MalformedRecord),
    }

    match check_elevation(record, declared_elevation, loose_elevation) {
        Check::Pass => Verdict::accepted(),
        Check::Fail => {
            tracing::debug!(
                declared = declared_elevation,
                extracted = ?record.elevation,
                "elevation mismatch"
            );
            Verdict::rejected(ReasonCode::ElevationMismatch)
        }
        Check::Malformed => Verdict::rejected(ReasonCode::MalformedRecord),
    }
}

/// ±5% relative band, open at both ends: `|declared - extracted|` must be
/// strictly below `0.05 * declared`. A declared distance of 0 gives a
/// zero-width band that rejects everything.
fn check_distance(record: &InferenceRecord, declared: u32) -> Check {
    let Some(extracted) = record.distance else {
        return Check::Malformed;
    };
    let declared = f64::from(declared);
    if (declared - extracted).abs() < 0.05 * declared {
        Check::Pass
    } else {
        Check::Fail
    }
}

/// Exact-equality elevation check with two escape hatches: leniency for a
/// null/missing extracted value, and declared 0 meaning "no claim made".
fn check_elevation(record: &InferenceRecord, declared: u32, loose: bool) -> Check {
    match record.elevation {
        ElevationField::Null | ElevationField::Absent if loose => Check::Pass,
        _ if declared == 0 => Check::Pass,
        ElevationField::Meters(extracted) => {
            if extracted == f64::from(declared) {
                Check::Pass
            } else {
                Check::Fail
            }
        }
        // Explicit null with a non-zero claim: checked and failed.
        ElevationField::Null => Check::Fail,
        // Missing entirely: could not even check.
        ElevationField::Absent => Check::Malformed,
    }
}
