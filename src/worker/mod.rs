//! Automation worker supervision.
//!
//! The worker is an external program (by default `node whatsapp_sender.js`)
//! that drives the messaging web client. It receives one JSON argument
//! describing the job and reports back on stdout using the line protocol in
//! [`crate::protocol`].
//!
//! Exactly one worker runs per dispatch. The supervisor never outlives its
//! worker: on timeout the whole process group is killed and reaped before
//! `run` returns.

mod supervisor;

#[cfg(test)]
mod tests;

// Re-export public API
pub use supervisor::{WorkerRun, WorkerSupervisor};
