//! RAII ownership of the session lock.

use super::metadata::LockMetadata;
use crate::error::{DispatchError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Proof that this process holds the automation session.
///
/// Dropping the guard deletes the lock file, but only while the file still
/// carries this guard's metadata: if the lock was force-cleared and taken by
/// another dispatch in the meantime, the newer lock is left alone. Drop never
/// panics; failures are logged.
#[derive(Debug)]
#[must_use = "the session is released as soon as the guard is dropped"]
pub struct LockGuard {
    path: PathBuf,
    metadata: LockMetadata,
    released: bool,
}

impl LockGuard {
    pub(super) fn new(path: PathBuf, metadata: LockMetadata) -> Self {
        Self {
            path,
            metadata,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The metadata written when the lock was taken.
    pub fn metadata(&self) -> &LockMetadata {
        &self.metadata
    }

    /// Release the session now, reporting failures to the caller.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.remove_if_owned()
    }

    fn remove_if_owned(&self) -> Result<()> {
        let on_disk = LockMetadata::read(&self.path)?;
        if on_disk != self.metadata {
            return Err(DispatchError::LockError(format!(
                "'{}' now belongs to {} ({}); leaving it in place",
                self.path.display(),
                on_disk.owner,
                on_disk.action
            )));
        }

        std::fs::remove_file(&self.path).map_err(|e| {
            DispatchError::LockError(format!("cannot remove '{}': {}", self.path.display(), e))
        })?;
        debug!(path = %self.path.display(), "session lock released");
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.remove_if_owned() {
            warn!(error = %e, "failed to release session lock");
        }
    }
}
