//! Recipient identifiers for wa-dispatch.
//!
//! This module turns raw phone-number input into dialable recipients:
//!
//! - **Normalize**: canonicalize a raw identifier into `+<digits>` form
//! - **Recipients**: merge several input sources into one deduplicated set
//! - **Validation**: plausibility report over raw identifiers
//!
//! # Normalization
//!
//! Normalization is total: any input, even one without a single digit,
//! produces a well-defined [`PhoneNumber`]. Whether the result is a plausible
//! number is a separate question answered by [`PhoneNumber::is_plausible`].
//! Normalizing an already-normalized number returns it unchanged, which is
//! what makes the normalized string usable as the deduplication key.

mod normalize;
mod recipients;
mod validation;


// Re-export public API
pub use normalize::{CellValue, Normalizer, PhoneNumber, DEFAULT_COUNTRY_CODE};
pub use recipients::{RecipientSet, RecipientSource};
pub use validation::{ValidationReport, validate_identifiers};
