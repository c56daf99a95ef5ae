//! Error types for wa-dispatch.
//!
//! Uses thiserror for derive macros. Each variant maps to a process exit code
//! and to a serializable [`FailureKind`](crate::dispatch::FailureKind) at the
//! orchestrator boundary.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for dispatch operations.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Invalid arguments, configuration, or local I/O setup failure.
    #[error("{0}")]
    UserError(String),

    /// The request cannot be dispatched as given (no recipients, empty body).
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// The worker did not finish within the allotted time and was terminated.
    #[error("Worker timed out after {seconds}s and was terminated")]
    Timeout {
        /// The timeout that was exceeded, in seconds.
        seconds: u64,
    },

    /// The worker could not be started or exited unsuccessfully.
    #[error("Worker failed (exit code {code}): {stderr}", code = fmt_exit_code(.exit_code))]
    WorkerFailed {
        /// Exit code, if the process exited normally.
        exit_code: Option<i32>,
        /// Captured standard error (or the spawn error text).
        stderr: String,
    },

    /// The worker's output did not follow the line protocol.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// The automation session is held by another dispatch.
    #[error("Session lock unavailable: {0}")]
    LockError(String),
}

fn fmt_exit_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string())
}

impl DispatchError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            DispatchError::UserError(_) => exit_codes::USER_ERROR,
            DispatchError::ValidationError(_) => exit_codes::VALIDATION_FAILURE,
            DispatchError::Timeout { .. } => exit_codes::TIMEOUT,
            DispatchError::WorkerFailed { .. } => exit_codes::WORKER_FAILURE,
            DispatchError::ProtocolViolation(_) => exit_codes::PROTOCOL_VIOLATION,
            DispatchError::LockError(_) => exit_codes::LOCK_FAILURE,
        }
    }
}

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_has_correct_exit_code() {
        let err = DispatchError::ValidationError("no recipients".to_string());
        assert_eq!(err.exit_code(), exit_codes::VALIDATION_FAILURE);
    }

    #[test]
    fn timeout_has_correct_exit_code() {
        let err = DispatchError::Timeout { seconds: 5 };
        assert_eq!(err.exit_code(), exit_codes::TIMEOUT);
        assert_eq!(
            err.to_string(),
            "Worker timed out after 5s and was terminated"
        );
    }

    #[test]
    fn worker_failed_message_includes_stderr() {
        let err = DispatchError::WorkerFailed {
            exit_code: Some(2),
            stderr: "Cannot find module 'whatsapp-web.js'".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::WORKER_FAILURE);
        assert_eq!(
            err.to_string(),
            "Worker failed (exit code 2): Cannot find module 'whatsapp-web.js'"
        );

        let err = DispatchError::WorkerFailed {
            exit_code: None,
            stderr: "killed".to_string(),
        };
        assert!(err.to_string().contains("exit code none"));
    }

    #[test]
    fn protocol_and_lock_errors_have_correct_exit_codes() {
        let err = DispatchError::ProtocolViolation("missing RESULTS line".to_string());
        assert_eq!(err.exit_code(), exit_codes::PROTOCOL_VIOLATION);
        assert_eq!(err.to_string(), "Protocol violation: missing RESULTS line");

        let err = DispatchError::LockError("held by alice@box".to_string());
        assert_eq!(err.exit_code(), exit_codes::LOCK_FAILURE);
    }

    #[test]
    fn user_error_is_displayed_verbatim() {
        let err = DispatchError::UserError("bad config".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        assert_eq!(err.to_string(), "bad config");
    }
}
