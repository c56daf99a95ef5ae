//! Lock status reporting.

use super::metadata::LockMetadata;
use std::fmt;
use std::path::PathBuf;

/// Snapshot of a held session lock.
#[derive(Debug, Clone)]
pub struct LockInfo {
    pub path: PathBuf,
    pub metadata: LockMetadata,
    /// Held longer than `lock_stale_minutes`; the holder has probably crashed.
    pub is_stale: bool,
}

impl fmt::Display for LockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let meta = &self.metadata;
        write!(
            f,
            "held by {} (pid {}) for {}: {}",
            meta.owner,
            meta.pid,
            meta.age_string(),
            meta.action
        )?;
        if self.is_stale {
            f.write_str(" [STALE]")?;
        }
        Ok(())
    }
}
