//! Config struct definitions and default implementations.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration for wa-dispatch.
///
/// This struct represents the contents of `wa-dispatch.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Worker settings
    // =========================================================================
    /// How to launch the automation worker.
    pub worker: WorkerConfig,

    /// Default wall-clock limit for one worker run, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Time the worker needs to bring its client session up, in seconds.
    #[serde(default = "default_startup_seconds")]
    pub startup_seconds: u64,

    /// Delay the worker waits between two sends, in milliseconds.
    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,

    // =========================================================================
    // Recipient settings
    // =========================================================================
    /// Country code digits used to normalize national numbers.
    #[serde(default = "default_country_code")]
    pub country_code: String,

    // =========================================================================
    // Session lock settings
    // =========================================================================
    /// Directory holding runtime state (the session lock).
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// Minutes after which a session lock is reported as stale.
    #[serde(default = "default_lock_stale_minutes")]
    pub lock_stale_minutes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker: WorkerConfig::default(),
            timeout_seconds: default_timeout_seconds(),
            startup_seconds: default_startup_seconds(),
            pacing_delay_ms: default_pacing_delay_ms(),
            country_code: default_country_code(),
            state_dir: default_state_dir(),
            lock_stale_minutes: default_lock_stale_minutes(),
        }
    }
}

/// Launch settings for the automation worker process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Command line (shell-words parsed; no shell). The job payload is
    /// appended as the final argument.
    #[serde(default = "default_worker_command")]
    pub command: String,

    /// Working directory for the worker (inherited when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// Environment variables to set for the worker process.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub environment: HashMap<String, String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            command: default_worker_command(),
            working_dir: None,
            environment: HashMap::new(),
        }
    }
}

// Default value functions for serde
pub(crate) fn default_worker_command() -> String {
    "node whatsapp_sender.js".to_string()
}
pub(crate) fn default_timeout_seconds() -> u64 {
    300
}
pub(crate) fn default_startup_seconds() -> u64 {
    60
}
pub(crate) fn default_pacing_delay_ms() -> u64 {
    2000
}
pub(crate) fn default_country_code() -> String {
    crate::phone::DEFAULT_COUNTRY_CODE.to_string()
}
pub(crate) fn default_state_dir() -> PathBuf {
    PathBuf::from(".wa-dispatch")
}
pub(crate) fn default_lock_stale_minutes() -> u32 {
    30
}
