//! Exit code constants for the wa-dispatch CLI.
//!
//! - 0: Success (every recipient delivered)
//! - 1: User error (bad args, unreadable config, spawn setup)
//! - 2: Validation failure (no recipients, empty message)
//! - 3: Worker failure (nonzero exit)
//! - 4: Session lock held by another dispatch
//! - 5: Worker timed out
//! - 6: Worker protocol violation
//! - 7: Batch completed but some recipients failed

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration, or I/O setup failure.
pub const USER_ERROR: i32 = 1;

/// Validation failure: no usable recipients or an empty message body.
pub const VALIDATION_FAILURE: i32 = 2;

/// The worker process exited with a nonzero status.
pub const WORKER_FAILURE: i32 = 3;

/// The automation session is held by another dispatch.
pub const LOCK_FAILURE: i32 = 4;

/// The worker exceeded its allotted time and was terminated.
pub const TIMEOUT: i32 = 5;

/// The worker's output stream broke the line protocol.
pub const PROTOCOL_VIOLATION: i32 = 6;

/// The batch completed, but at least one recipient was reported as failed.
pub const DELIVERY_FAILURE: i32 = 7;
