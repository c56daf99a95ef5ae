use crate::config::{Config, WorkerConfig};
use crate::job::{JobDescriptor, MessageBody};
use crate::phone::{PhoneNumber, RecipientSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// A shell script standing in for the automation worker.
///
/// The script receives the job payload as `$1`. Its temp directory doubles as
/// the dispatch state directory.
pub(crate) struct FakeWorker {
    dir: TempDir,
    script: PathBuf,
}

impl FakeWorker {
    pub(crate) fn new(body: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("worker.sh");
        std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        Self { dir, script }
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            command: format!("sh {}", shell_words::quote(&self.script.to_string_lossy())),
            ..Default::default()
        }
    }

    pub(crate) fn config(&self) -> Config {
        Config {
            worker: self.worker_config(),
            state_dir: self.dir.path().join("state"),
            ..Default::default()
        }
    }
}

pub(crate) fn make_job(numbers: &[&str], message: &str) -> JobDescriptor {
    let set: RecipientSet = numbers
        .iter()
        .map(|n| PhoneNumber::parse(n).unwrap())
        .collect();
    JobDescriptor::new(MessageBody::new(message).unwrap(), &set).unwrap()
}

/// Whether `pid` names a live (non-zombie) process.
#[cfg(target_os = "linux")]
pub(crate) fn is_alive(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => {
            // The state field follows the parenthesized command name.
            let state = stat
                .rsplit_once(')')
                .and_then(|(_, rest)| rest.split_whitespace().next());
            !matches!(state, Some("Z") | Some("X") | None)
        }
        Err(_) => false,
    }
}

/// Poll `condition` until it holds or `limit` elapses.
pub(crate) fn eventually(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < limit {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    condition()
}

pub(crate) fn read_pid(path: &Path) -> u32 {
    let found = eventually(Duration::from_secs(5), || {
        std::fs::read_to_string(path)
            .map(|s| s.trim().parse::<u32>().is_ok())
            .unwrap_or(false)
    });
    assert!(found, "pid file {} was never written", path.display());
    std::fs::read_to_string(path).unwrap().trim().parse().unwrap()
}
