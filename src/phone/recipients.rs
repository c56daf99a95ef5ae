//! Recipient set construction from heterogeneous sources.

use super::normalize::{CellValue, Normalizer, PhoneNumber};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// One origin of raw recipient identifiers.
#[derive(Debug, Clone, PartialEq)]
pub enum RecipientSource {
    /// Cells from the phone column of an uploaded spreadsheet.
    ///
    /// Missing cells are skipped; every other cell is normalized as-is.
    Spreadsheet(Vec<CellValue>),

    /// Free text typed by a user, entries separated by commas.
    ///
    /// Blank entries are skipped.
    Manual(String),

    /// A programmatic list of identifiers, e.g. from an API payload.
    ///
    /// Blank entries are skipped.
    List(Vec<String>),
}

impl RecipientSource {
    /// Short label used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            RecipientSource::Spreadsheet(_) => "spreadsheet",
            RecipientSource::Manual(_) => "manual",
            RecipientSource::List(_) => "list",
        }
    }

    /// The usable raw entries of this source, in source order.
    fn raw_entries(&self) -> Vec<String> {
        match self {
            RecipientSource::Spreadsheet(cells) => cells.iter().filter_map(CellValue::as_raw).collect(),
            RecipientSource::Manual(text) => text
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect(),
            RecipientSource::List(entries) => entries
                .iter()
                .map(|entry| entry.trim())
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// A deduplicated set of normalized recipients.
///
/// Ordered by the normalized string, so the sequence handed to the worker is
/// deterministic. Source order is not preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecipientSet(BTreeSet<PhoneNumber>);

impl RecipientSet {
    /// Merge all sources into one set.
    ///
    /// Duplicates collapse silently. The result is empty only when no source
    /// yielded a single usable entry; callers must treat that as a validation
    /// failure rather than dispatch an empty batch.
    pub fn build(normalizer: &Normalizer, sources: &[RecipientSource]) -> Self {
        let mut set = Self::default();

        for source in sources {
            let entries = source.raw_entries();
            let before = set.len();
            for raw in &entries {
                set.0.insert(normalizer.normalize(raw));
            }
            debug!(
                source = source.kind(),
                entries = entries.len(),
                added = set.len() - before,
                "merged recipient source"
            );
        }

        set
    }

    /// Number of unique recipients.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no recipient was collected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `number` is part of the set.
    pub fn contains(&self, number: &PhoneNumber) -> bool {
        self.0.contains(number)
    }

    /// Iterate over recipients in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &PhoneNumber> {
        self.0.iter()
    }

    /// The recipients as an ordered sequence.
    pub fn to_vec(&self) -> Vec<PhoneNumber> {
        self.0.iter().cloned().collect()
    }
}

impl FromIterator<PhoneNumber> for RecipientSet {
    fn from_iter<I: IntoIterator<Item = PhoneNumber>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
