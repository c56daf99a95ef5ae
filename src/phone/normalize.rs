//! Phone number normalization.

use crate::error::{DispatchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Country code used when none is configured.
pub const DEFAULT_COUNTRY_CODE: &str = "90";

/// Minimum length (including the leading `+`) of a plausible number.
const MIN_PLAUSIBLE_LEN: usize = 10;

/// A normalized recipient identifier: `+` followed by one or more digits.
///
/// Equality, ordering, and hashing are defined on the normalized string, so
/// two raw inputs that normalize to the same value are the same recipient.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Accept a value that is already in canonical form.
    ///
    /// Returns `None` unless the value is `+` followed by at least one ASCII
    /// digit and nothing else. Use [`Normalizer::normalize`] for raw input.
    pub fn parse(value: &str) -> Option<Self> {
        let digits = value.strip_prefix('+')?;
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    /// Returns the number as a string slice, including the leading `+`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the digits without the leading `+`.
    pub fn digits(&self) -> &str {
        &self.0[1..]
    }

    /// Whether the number is long enough to be dialable.
    pub fn is_plausible(&self) -> bool {
        self.0.len() >= MIN_PLAUSIBLE_LEN
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("'{}' is not a normalized phone number", value))
    }
}

impl From<PhoneNumber> for String {
    fn from(number: PhoneNumber) -> Self {
        number.0
    }
}

/// A single spreadsheet cell as delivered by the spreadsheet reader.
///
/// Deserializes untagged, so a JSON column such as
/// `["0532 111 22 33", 5321112233, 5321112233.0, null]` maps onto
/// `Text`, `Integer`, `Float`, and `Missing` respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// Coerce the cell into the raw string handed to the normalizer.
    ///
    /// Returns `None` for empty cells. Spreadsheet readers report empty
    /// numeric cells as NaN, so non-finite floats count as empty too.
    /// Integral floats are rendered without a fractional part so that
    /// `5321112233.0` contributes the digits `5321112233`.
    pub fn as_raw(&self) -> Option<String> {
        match self {
            CellValue::Missing => None,
            CellValue::Text(text) => Some(text.clone()),
            CellValue::Integer(value) => Some(value.to_string()),
            CellValue::Float(value) if !value.is_finite() => None,
            CellValue::Float(value) if value.fract() == 0.0 => Some(format!("{:.0}", value)),
            CellValue::Float(value) => Some(value.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// Canonicalizes raw identifiers into [`PhoneNumber`]s for one country code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    country_code: String,
}

impl Normalizer {
    /// Create a normalizer for the given country code (digits only, e.g. `"90"`).
    ///
    /// A code starting with `0` is rejected: the trunk-prefix branch would
    /// rewrite the normalizer's own output and break idempotence.
    pub fn new(country_code: impl Into<String>) -> Result<Self> {
        let country_code = country_code.into();

        if country_code.is_empty() || !country_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(DispatchError::UserError(format!(
                "invalid country code '{}': must be one or more digits",
                country_code
            )));
        }

        if country_code.starts_with('0') {
            return Err(DispatchError::UserError(format!(
                "invalid country code '{}': must not start with 0",
                country_code
            )));
        }

        Ok(Self { country_code })
    }

    /// The configured country code digits.
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Normalize a raw identifier. Never fails.
    ///
    /// All non-digit characters are stripped, then:
    /// - a leading trunk `0` is replaced by the country code
    /// - digits not already starting with the country code get it prepended
    /// - digits that already start with the country code only gain the `+`
    pub fn normalize(&self, raw: &str) -> PhoneNumber {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

        let canonical = if let Some(national) = digits.strip_prefix('0') {
            format!("+{}{}", self.country_code, national)
        } else if !digits.starts_with(&self.country_code) {
            format!("+{}{}", self.country_code, digits)
        } else {
            format!("+{}", digits)
        };

        PhoneNumber(canonical)
    }

    /// Normalize a spreadsheet cell, skipping empty cells.
    pub fn normalize_cell(&self, cell: &CellValue) -> Option<PhoneNumber> {
        cell.as_raw().map(|raw| self.normalize(&raw))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}
