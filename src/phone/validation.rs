//! Plausibility report over raw identifiers.

use super::normalize::{Normalizer, PhoneNumber};
use serde::Serialize;

/// Outcome of checking a batch of raw identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Normalized form of every plausible entry, in input order.
    pub valid_numbers: Vec<PhoneNumber>,
    /// Raw form of every implausible entry, in input order.
    pub invalid_numbers: Vec<String>,
    pub total_valid: usize,
    pub total_invalid: usize,
}

/// Normalize each raw identifier and partition by plausibility.
///
/// Unlike [`RecipientSet::build`](super::RecipientSet::build), nothing is
/// skipped or deduplicated: every input lands in exactly one bucket.
pub fn validate_identifiers<S: AsRef<str>>(normalizer: &Normalizer, raws: &[S]) -> ValidationReport {
    let mut report = ValidationReport::default();

    for raw in raws {
        let normalized = normalizer.normalize(raw.as_ref());
        if normalized.is_plausible() {
            report.valid_numbers.push(normalized);
        } else {
            report.invalid_numbers.push(raw.as_ref().to_string());
        }
    }

    report.total_valid = report.valid_numbers.len();
    report.total_invalid = report.invalid_numbers.len();
    report
}
