//! Taking, inspecting, and clearing the session lock.

use super::guard::LockGuard;
use super::metadata::LockMetadata;
use super::types::LockInfo;
use crate::config::Config;
use crate::error::{DispatchError, Result};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::debug;

/// Take the automation session for `action`.
///
/// The lock file is created with `create_new`, so exactly one caller wins
/// even when several processes race. Losers get `LockError` naming the
/// current holder; nothing waits or retries.
pub fn acquire_session_lock(config: &Config, action: &str) -> Result<LockGuard> {
    let path = config.session_lock_path();
    std::fs::create_dir_all(config.locks_dir()).map_err(|e| {
        DispatchError::LockError(format!(
            "cannot create '{}': {}",
            config.locks_dir().display(),
            e
        ))
    })?;

    let metadata = LockMetadata::for_current_process(action);
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(session_busy(&path)),
        Err(e) => {
            return Err(DispatchError::LockError(format!(
                "cannot create '{}': {}",
                path.display(),
                e
            )));
        }
    };

    let written = metadata
        .to_json()
        .and_then(|json| {
            file.write_all(json.as_bytes())
                .and_then(|()| file.sync_all())
                .map_err(|e| DispatchError::LockError(format!("cannot write lock metadata: {}", e)))
        });
    if let Err(e) = written {
        // A half-written lock would block every later dispatch.
        let _ = std::fs::remove_file(&path);
        return Err(e);
    }

    debug!(path = %path.display(), action, "session lock acquired");
    Ok(LockGuard::new(path, metadata))
}

fn session_busy(path: &Path) -> DispatchError {
    match LockMetadata::read(path) {
        Ok(holder) => DispatchError::LockError(format!(
            "another dispatch holds the automation session\n\
             Holder: {} (pid {}), {} for {}\n\
             Lock:   {}",
            holder.owner,
            holder.pid,
            holder.action,
            holder.age_string(),
            path.display()
        )),
        Err(_) => DispatchError::LockError(format!(
            "another dispatch holds the automation session\nLock:   {}",
            path.display()
        )),
    }
}

/// Report the current session holder, or `None` when the session is free.
pub fn session_lock_status(config: &Config) -> Result<Option<LockInfo>> {
    let path = config.session_lock_path();
    if !path.exists() {
        return Ok(None);
    }

    let metadata = LockMetadata::read(&path)?;
    Ok(Some(LockInfo {
        is_stale: metadata.is_stale(config.lock_stale_minutes),
        path,
        metadata,
    }))
}

/// Delete a lock left behind by a crashed or killed dispatch.
///
/// Refuses unless `force` is set. Returns what was removed, or `None` when
/// the lock file was unreadable (it is removed all the same).
pub fn clear_session_lock(config: &Config, force: bool) -> Result<Option<LockInfo>> {
    if !force {
        return Err(DispatchError::UserError(
            "refusing to clear the session lock without --force".to_string(),
        ));
    }

    let path = config.session_lock_path();
    if !path.exists() {
        return Err(DispatchError::UserError(format!(
            "no session lock exists at '{}'",
            path.display()
        )));
    }

    let info = session_lock_status(config).ok().flatten();
    std::fs::remove_file(&path).map_err(|e| {
        DispatchError::UserError(format!("cannot remove '{}': {}", path.display(), e))
    })?;

    Ok(info)
}
