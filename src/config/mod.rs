//! Configuration model for wa-dispatch.
//!
//! This module defines the Config struct that represents `wa-dispatch.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, and validation of config values.
//!
//! # File Format
//!
//! ```yaml
//! worker:
//!   command: "node whatsapp_sender.js"
//!   working_dir: ./worker
//!   environment:
//!     PUPPETEER_EXECUTABLE_PATH: /usr/bin/chromium
//! timeout_seconds: 300
//! startup_seconds: 60
//! pacing_delay_ms: 2000
//! country_code: "90"
//! state_dir: .wa-dispatch
//! lock_stale_minutes: 30
//! ```

mod model;
mod operations;


// Re-export public API
pub use model::{Config, WorkerConfig};
pub use operations::{CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE};
