//! Dispatch orchestration.
//!
//! A dispatch call runs the whole pipeline for one message:
//!
//! 1. merge and normalize the recipient sources into a [`RecipientSet`](crate::phone::RecipientSet)
//! 2. reject empty input or an empty body
//! 3. take the automation session lock
//! 4. run the worker under a deadline, feeding its stdout through a
//!    [`ProtocolSession`](crate::protocol::ProtocolSession)
//! 5. check that the reported outcomes cover the recipient set exactly
//!
//! Any abort along the way becomes a [`DispatchFailure`] on the returned
//! [`DispatchResult`]; no partial outcomes are ever reported.

mod orchestrator;
mod result;


// Re-export public API
pub use orchestrator::{DispatchRequest, Dispatcher};
pub use result::{DispatchFailure, DispatchResult, FailureKind};
