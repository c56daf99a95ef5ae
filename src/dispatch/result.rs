//! Dispatch outcome types.

use crate::error::DispatchError;
use crate::exit_codes;
use crate::job::JobId;
use crate::protocol::RecipientOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a dispatch call was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No usable recipients, or an empty message body.
    Validation,
    /// The worker outlived its deadline and was terminated.
    Timeout,
    /// The worker could not be started or exited nonzero.
    WorkerFailed,
    /// The worker's output broke the line protocol.
    ProtocolViolation,
    /// Another dispatch holds the automation session.
    SessionBusy,
    /// Configuration or local I/O problem.
    Internal,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::Timeout => "timeout",
            FailureKind::WorkerFailed => "worker_failed",
            FailureKind::ProtocolViolation => "protocol_violation",
            FailureKind::SessionBusy => "session_busy",
            FailureKind::Internal => "internal",
        }
    }

    /// Process exit code for a dispatch aborted with this kind.
    pub fn exit_code(self) -> i32 {
        match self {
            FailureKind::Validation => exit_codes::VALIDATION_FAILURE,
            FailureKind::Timeout => exit_codes::TIMEOUT,
            FailureKind::WorkerFailed => exit_codes::WORKER_FAILURE,
            FailureKind::ProtocolViolation => exit_codes::PROTOCOL_VIOLATION,
            FailureKind::SessionBusy => exit_codes::LOCK_FAILURE,
            FailureKind::Internal => exit_codes::USER_ERROR,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured abort reason carried by a [`DispatchResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&DispatchError> for DispatchFailure {
    fn from(err: &DispatchError) -> Self {
        let kind = match err {
            DispatchError::UserError(_) => FailureKind::Internal,
            DispatchError::ValidationError(_) => FailureKind::Validation,
            DispatchError::Timeout { .. } => FailureKind::Timeout,
            DispatchError::WorkerFailed { .. } => FailureKind::WorkerFailed,
            DispatchError::ProtocolViolation(_) => FailureKind::ProtocolViolation,
            DispatchError::LockError(_) => FailureKind::SessionBusy,
        };

        Self {
            kind,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// The answer to one dispatch call.
///
/// Either `failure` is set and `outcomes` is empty, or `failure` is `None`
/// and `outcomes` holds exactly one entry per accepted recipient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchResult {
    /// Identifier of the job, once one was built.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,

    /// Number of unique recipients handed to the worker.
    pub accepted_recipients: usize,

    /// Per-recipient outcomes exactly as the worker reported them.
    pub outcomes: Vec<RecipientOutcome>,

    pub failure: Option<DispatchFailure>,

    /// Last pairing payload the worker asked a human to scan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairing: Option<String>,
}

impl DispatchResult {
    pub(crate) fn failed(
        job_id: Option<JobId>,
        accepted_recipients: usize,
        pairing: Option<String>,
        err: &DispatchError,
    ) -> Self {
        Self {
            job_id,
            accepted_recipients,
            outcomes: Vec::new(),
            failure: Some(DispatchFailure::from(err)),
            pairing,
        }
    }

    /// Whether the batch ran to completion. Individual sends may still have failed.
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn delivered_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }

    /// Process exit code summarizing this result.
    ///
    /// `DELIVERY_FAILURE` when the batch completed but some recipients failed.
    pub fn exit_code(&self) -> i32 {
        match &self.failure {
            Some(failure) => failure.kind.exit_code(),
            None if self.failed_count() > 0 => exit_codes::DELIVERY_FAILURE,
            None => exit_codes::SUCCESS,
        }
    }
}
