//! Stateful protocol enforcement over a whole worker run.

use super::parser::{ProgressOutcome, RecipientOutcome, WorkerEvent, parse_line};
use crate::error::{DispatchError, Result};
use crate::phone::PhoneNumber;
use tracing::{debug, warn};

/// Accumulates events from one worker run and checks their order.
///
/// Feed every stdout line to [`observe`](Self::observe) as it arrives, then
/// call [`finish`](Self::finish) once the worker has exited cleanly.
#[derive(Debug, Default)]
pub struct ProtocolSession {
    ready: bool,
    pairing: Option<String>,
    pairing_requests: usize,
    outcomes: Option<Vec<RecipientOutcome>>,
    progress: Vec<(PhoneNumber, ProgressOutcome)>,
    unparsed: Vec<String>,
    violations: Vec<String>,
}

impl ProtocolSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one line and record it.
    ///
    /// Returns the event as it should be surfaced to observers. A progress
    /// line that arrives before `READY` is surfaced as
    /// [`WorkerEvent::UnparsedLine`] and recorded as a violation.
    pub fn observe(&mut self, line: &str) -> WorkerEvent {
        let event = match parse_line(line) {
            Ok(event) => event,
            Err(err) => {
                self.violations.push(err.to_string());
                return WorkerEvent::UnparsedLine {
                    line: line.to_string(),
                };
            }
        };

        match &event {
            WorkerEvent::PairingRequired { payload } => {
                self.pairing_requests += 1;
                if self.pairing_requests > 1 {
                    warn!(count = self.pairing_requests, "worker requested pairing again");
                }
                if self.ready {
                    warn!("worker requested pairing after READY");
                }
                self.pairing = Some(payload.clone());
            }
            WorkerEvent::Ready => {
                if self.outcomes.is_some() {
                    self.violations.push("READY after RESULTS".to_string());
                } else if self.ready {
                    debug!("duplicate READY ignored");
                }
                self.ready = true;
            }
            WorkerEvent::RecipientProgress {
                recipient, outcome, ..
            } => {
                if !self.ready {
                    self.violations
                        .push(format!("progress for {} before READY", recipient));
                    return WorkerEvent::UnparsedLine {
                        line: line.to_string(),
                    };
                }
                if self.outcomes.is_some() {
                    self.violations
                        .push(format!("progress for {} after RESULTS", recipient));
                }
                self.progress.push((recipient.clone(), *outcome));
            }
            WorkerEvent::BatchResult { outcomes } => {
                if self.outcomes.is_some() {
                    self.violations.push("duplicate RESULTS line".to_string());
                } else {
                    if !self.ready {
                        self.violations.push("RESULTS before READY".to_string());
                    }
                    self.outcomes = Some(outcomes.clone());
                }
            }
            WorkerEvent::UnparsedLine { line } => {
                debug!(line = %line, "unrecognized worker output");
                self.unparsed.push(line.clone());
            }
        }

        event
    }

    /// Whether `READY` has been seen.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// The most recent pairing payload, if the worker asked for pairing.
    pub fn pairing_payload(&self) -> Option<&str> {
        self.pairing.as_deref()
    }

    /// Progress events accepted so far, in arrival order.
    pub fn progress(&self) -> &[(PhoneNumber, ProgressOutcome)] {
        &self.progress
    }

    /// Lines that matched no known shape.
    pub fn unparsed_lines(&self) -> &[String] {
        &self.unparsed
    }

    /// Protocol violations recorded so far.
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Close the session after a clean worker exit.
    ///
    /// # Errors
    ///
    /// `ProtocolViolation` if any ordering rule was broken, a results payload
    /// was malformed, or no `RESULTS` line arrived at all.
    pub fn finish(self) -> Result<Vec<RecipientOutcome>> {
        if !self.violations.is_empty() {
            return Err(DispatchError::ProtocolViolation(self.violations.join("; ")));
        }

        self.outcomes.ok_or_else(|| {
            DispatchError::ProtocolViolation(
                "missing result: worker exited without a RESULTS line".to_string(),
            )
        })
    }
}
