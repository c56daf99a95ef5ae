//! Worker line protocol.
//!
//! The worker talks back over stdout, one message per line. Lines that start
//! with a marker token carry lifecycle information; everything else is
//! free-form diagnostics.
//!
//! # Line Shapes
//!
//! | Line | Event |
//! |------|-------|
//! | `QR_CODE: <payload>` | [`WorkerEvent::PairingRequired`] |
//! | `READY` | [`WorkerEvent::Ready`] |
//! | `✅ Başarılı: +90…` / `❌ Hata: +90… - <detail>` / `Gönderiliyor: +90…` | [`WorkerEvent::RecipientProgress`] |
//! | `RESULTS: [{"phoneNumber": …, "success": …, "error": …}]` | [`WorkerEvent::BatchResult`] |
//! | anything else | [`WorkerEvent::UnparsedLine`] |
//!
//! [`parse_line`] classifies a single line without context. Ordering rules
//! (progress only after `READY`, exactly one `RESULTS`) are enforced by
//! [`ProtocolSession`], which consumes the whole stream.

mod parser;
mod session;


// Re-export public API
pub use parser::{ProgressOutcome, RecipientOutcome, WorkerEvent, parse_line};
pub use session::ProtocolSession;
