//! Automation session lock.
//!
//! The worker drives a single logged-in messaging client, so at most one
//! worker may run at a time. That invariant is enforced by an admission gate:
//! the session lock file `<state_dir>/locks/session.lock`.
//!
//! # Lock File
//!
//! The lock file is created using **create_new** semantics (exclusive create),
//! so only one dispatch, in this process or any other, can hold it. A second
//! dispatch is rejected with `LockError` rather than queued.
//!
//! # Lock Metadata
//!
//! The lock file contains JSON metadata:
//! - `owner`: The owner of the lock (e.g., `user@HOST`)
//! - `pid`: The process ID
//! - `created_at`: RFC3339 timestamp
//! - `action`: What holds the session (e.g. `dispatch <job id>`)
//!
//! # RAII Guards
//!
//! The lock is released when its guard is dropped. A guard only deletes a
//! lock file that still carries its own metadata, so a force-cleared and
//! re-taken session survives the old holder's cleanup. If deletion fails
//! during drop, a warning is logged but the program does not crash.

mod guard;
mod metadata;
mod operations;
mod types;


// Re-export public API
pub use guard::LockGuard;
pub use metadata::LockMetadata;
pub use operations::{acquire_session_lock, clear_session_lock, session_lock_status};
pub use types::LockInfo;
