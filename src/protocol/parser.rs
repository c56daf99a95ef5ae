//! Stateless line classification.

use crate::error::{DispatchError, Result};
use crate::phone::PhoneNumber;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Marker tokens recognized at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Pairing,
    Ready,
    Results,
}

const MARKERS: &[(&str, Marker)] = &[
    ("QR_CODE:", Marker::Pairing),
    ("READY", Marker::Ready),
    ("RESULTS:", Marker::Results),
];

/// Progress lines: optional status emoji, a label, the recipient, optional detail.
static PROGRESS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[✅❌📤]\x{FE0F}?\s*)?(?P<label>Gönderiliyor|Başarılı|Hata|Sending|Sent|Failed):\s*(?P<number>\+[0-9]+)(?:\s+-\s+(?P<detail>.*))?$",
    )
    .expect("Invalid progress line regex")
});

/// Per-recipient state reported by a progress line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressOutcome {
    /// The worker is about to send to this recipient.
    Pending,
    /// The worker reports the message as sent.
    Success,
    /// The worker reports the send as failed.
    Failure,
}

impl ProgressOutcome {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "Gönderiliyor" | "Sending" => Some(Self::Pending),
            "Başarılı" | "Sent" => Some(Self::Success),
            "Hata" | "Failed" => Some(Self::Failure),
            _ => None,
        }
    }
}

/// Final, authoritative outcome for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientOutcome {
    pub recipient: PhoneNumber,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Wire shape of one entry in the `RESULTS:` payload.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireOutcome {
    phone_number: PhoneNumber,
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

impl From<WireOutcome> for RecipientOutcome {
    fn from(wire: WireOutcome) -> Self {
        Self {
            recipient: wire.phone_number,
            success: wire.success,
            error: wire.error,
        }
    }
}

/// One parsed line of worker output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkerEvent {
    /// The messaging client needs a human to pair it (e.g. scan a QR code).
    PairingRequired { payload: String },
    /// The client session is up; recipients may be processed from here on.
    Ready,
    /// Informational progress for one recipient.
    RecipientProgress {
        recipient: PhoneNumber,
        outcome: ProgressOutcome,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    /// The final outcome set.
    BatchResult { outcomes: Vec<RecipientOutcome> },
    /// Anything the protocol does not recognize.
    UnparsedLine { line: String },
}

/// Classify one line of worker output.
///
/// Markers are matched case-sensitively against the start of the line; the
/// longest matching marker wins. `READY` must match the whole line.
///
/// # Errors
///
/// Returns `ProtocolViolation` when a `RESULTS:` line carries a payload that
/// is not a JSON array of outcomes. This is fatal for the batch; progress
/// lines are never used as a substitute.
pub fn parse_line(line: &str) -> Result<WorkerEvent> {
    match match_marker(line) {
        Some((Marker::Pairing, rest)) => {
            return Ok(WorkerEvent::PairingRequired {
                payload: rest.trim_start().to_string(),
            });
        }
        Some((Marker::Ready, "")) => return Ok(WorkerEvent::Ready),
        Some((Marker::Results, rest)) => return parse_results(rest),
        Some((Marker::Ready, _)) | None => {}
    }

    if let Some(event) = parse_progress(line) {
        return Ok(event);
    }

    Ok(WorkerEvent::UnparsedLine {
        line: line.to_string(),
    })
}

/// Longest marker that prefixes `line`, with the remainder after it.
fn match_marker(line: &str) -> Option<(Marker, &str)> {
    MARKERS
        .iter()
        .filter(|(token, _)| line.starts_with(token))
        .max_by_key(|(token, _)| token.len())
        .map(|(token, marker)| (*marker, &line[token.len()..]))
}

fn parse_results(payload: &str) -> Result<WorkerEvent> {
    let wire: Vec<WireOutcome> = serde_json::from_str(payload.trim()).map_err(|e| {
        DispatchError::ProtocolViolation(format!("malformed RESULTS payload: {}", e))
    })?;

    Ok(WorkerEvent::BatchResult {
        outcomes: wire.into_iter().map(RecipientOutcome::from).collect(),
    })
}

fn parse_progress(line: &str) -> Option<WorkerEvent> {
    let caps = PROGRESS_REGEX.captures(line)?;
    let outcome = ProgressOutcome::from_label(caps.name("label")?.as_str())?;
    let recipient = PhoneNumber::parse(caps.name("number")?.as_str())?;
    let detail = caps
        .name("detail")
        .map(|m| m.as_str().trim().to_string())
        .filter(|d| !d.is_empty());

    Some(WorkerEvent::RecipientProgress {
        recipient,
        outcome,
        detail,
    })
}
