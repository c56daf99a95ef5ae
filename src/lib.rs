//! wa-dispatch: send one message to many phone numbers through an external
//! messaging-automation worker.
//!
//! The pipeline normalizes and deduplicates recipient identifiers, hands a
//! job to a supervised worker process, parses the worker's line protocol, and
//! aggregates per-recipient outcomes. See [`dispatch::Dispatcher`] for the
//! entry point.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod exit_codes;
pub mod job;
pub mod locks;
pub mod logging;
pub mod phone;
pub mod protocol;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;
