//! Contents of the session lock file.

use crate::error::{DispatchError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Who holds the automation session, serialized as JSON into the lock file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockMetadata {
    /// `user@host` of the dispatching process.
    pub owner: String,

    pub pid: u32,

    /// When the session was taken (RFC3339).
    pub created_at: DateTime<Utc>,

    /// What holds the session, e.g. `dispatch <job id>`.
    pub action: String,
}

impl LockMetadata {
    /// Describe the current process taking the session now.
    pub fn for_current_process(action: impl Into<String>) -> Self {
        Self {
            owner: current_owner(),
            pid: std::process::id(),
            created_at: Utc::now(),
            action: action.into(),
        }
    }

    /// Read the metadata of an existing lock file.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            DispatchError::LockError(format!("cannot read '{}': {}", path.display(), e))
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            DispatchError::LockError(format!(
                "'{}' is not a session lock file: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DispatchError::LockError(format!("cannot encode lock metadata: {}", e)))
    }

    /// How long the session has been held.
    pub fn held_for(&self) -> Duration {
        Utc::now() - self.created_at
    }

    /// [`held_for`](Self::held_for) rendered as `2h 5m`, `7m`, or `42s`.
    pub fn age_string(&self) -> String {
        format_age(self.held_for())
    }

    /// Whether the session has been held longer than `stale_minutes`.
    pub fn is_stale(&self, stale_minutes: u32) -> bool {
        self.held_for() > Duration::minutes(i64::from(stale_minutes))
    }
}

fn format_age(age: Duration) -> String {
    match (age.num_hours(), age.num_minutes() % 60) {
        (0, 0) => format!("{}s", age.num_seconds().max(0)),
        (0, minutes) => format!("{}m", minutes),
        (hours, minutes) => format!("{}h {}m", hours, minutes),
    }
}

fn current_owner() -> String {
    let user = ["USER", "USERNAME"]
        .iter()
        .find_map(|key| std::env::var(key).ok())
        .unwrap_or_else(|| "unknown".to_string());

    let host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    format!("{}@{}", user, host)
}
