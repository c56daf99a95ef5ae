//! Worker subprocess supervisor.
//!
//! Launches the automation worker with the job payload, streams its stdout
//! line by line, and enforces the timeout.

use crate::config::WorkerConfig;
use crate::error::{DispatchError, Result};
use crate::job::JobDescriptor;
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result of a worker process that exited on its own with status 0.
#[derive(Debug, Clone)]
pub struct WorkerRun {
    /// Exit code of the process.
    pub exit_code: Option<i32>,
    /// Every stdout line, in arrival order.
    pub stdout_lines: Vec<String>,
    /// Everything the worker wrote to stderr.
    pub stderr: String,
    /// Wall-clock time from spawn to exit.
    pub duration: Duration,
}

/// Runs one worker process per job.
#[derive(Debug, Clone)]
pub struct WorkerSupervisor {
    config: WorkerConfig,
}

impl WorkerSupervisor {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Run the worker for `job` and block until it exits or `timeout` elapses.
    ///
    /// The job payload is appended as the final argument of the configured
    /// command. Each stdout line is handed to `on_line` as soon as it is read.
    ///
    /// # Errors
    ///
    /// * `UserError` - the command is empty or cannot be parsed
    /// * `WorkerFailed` - the worker could not be started or exited nonzero
    /// * `Timeout` - the worker was still running at the deadline; it has
    ///   been killed and reaped before this returns
    pub fn run(
        &self,
        job: &JobDescriptor,
        timeout: Duration,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<WorkerRun> {
        let mut args = shell_words::split(&self.config.command).map_err(|e| {
            DispatchError::UserError(format!(
                "failed to parse worker command '{}': {}\n\
                 Fix: check for unmatched quotes or invalid escape sequences.",
                self.config.command, e
            ))
        })?;

        if args.is_empty() {
            return Err(DispatchError::UserError(format!(
                "worker command is empty after parsing: '{}'",
                self.config.command
            )));
        }

        args.push(job.to_payload()?);

        let program = &args[0];
        let mut command = Command::new(program);
        command
            .args(&args[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &self.config.working_dir {
            command.current_dir(dir);
        }

        for (key, value) in &self.config.environment {
            command.env(key, value);
        }

        // A fresh process group lets a timeout take the browser down with the worker.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let start_time = Instant::now();
        // `None` when the timeout reaches past what `Instant` can represent.
        let deadline = start_time.checked_add(timeout);
        let mut child = command.spawn().map_err(|e| DispatchError::WorkerFailed {
            exit_code: None,
            stderr: format!("failed to start worker '{}': {}", program, e),
        })?;

        info!(
            job_id = %job.id(),
            pid = child.id(),
            recipients = job.recipients().len(),
            timeout_secs = timeout.as_secs(),
            "worker started"
        );

        let (Some(stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take()) else {
            terminate(&mut child);
            return Err(DispatchError::UserError(
                "worker stdio pipes were not captured".to_string(),
            ));
        };

        let (tx, rx) = mpsc::channel();
        let stdout_reader = thread::spawn(move || forward_lines(stdout, tx));
        let stderr_reader = thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        });

        let mut stdout_lines = Vec::new();
        loop {
            let received = match deadline {
                Some(deadline) => {
                    rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(line) => {
                    debug!(line = %line, "worker output");
                    on_line(&line);
                    stdout_lines.push(line);
                }
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    warn!(job_id = %job.id(), "worker timed out, terminating");
                    terminate(&mut child);
                    return Err(DispatchError::Timeout {
                        seconds: timeout.as_secs(),
                    });
                }
            }
        }

        // Stdout closed; the process may still be shutting down.
        let status = match wait_until(&mut child, deadline)? {
            Some(status) => status,
            None => {
                warn!(job_id = %job.id(), "worker closed stdout but did not exit, terminating");
                terminate(&mut child);
                return Err(DispatchError::Timeout {
                    seconds: timeout.as_secs(),
                });
            }
        };

        let _ = stdout_reader.join();
        let stderr = stderr_reader.join().unwrap_or_default();
        let duration = start_time.elapsed();

        info!(
            job_id = %job.id(),
            exit_code = ?status.code(),
            duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "worker exited"
        );

        if !status.success() {
            let stderr = stderr.trim();
            return Err(DispatchError::WorkerFailed {
                exit_code: status.code(),
                stderr: if stderr.is_empty() {
                    "worker produced no stderr output".to_string()
                } else {
                    stderr.to_string()
                },
            });
        }

        Ok(WorkerRun {
            exit_code: status.code(),
            stdout_lines,
            stderr,
            duration,
        })
    }
}

/// Read stdout line by line and forward each line until EOF or the receiver hangs up.
fn forward_lines(stdout: ChildStdout, tx: Sender<String>) {
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                if tx.send(line).is_err() {
                    break;
                }
            }
        }
    }
}

/// Poll for exit until `deadline`, or indefinitely without one.
///
/// Returns `None` if the process is still running at the deadline.
fn wait_until(child: &mut Child, deadline: Option<Instant>) -> Result<Option<ExitStatus>> {
    let poll_interval = Duration::from_millis(50);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {
                if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                    return Ok(None);
                }
                thread::sleep(poll_interval);
            }
            Err(e) => {
                terminate(child);
                return Err(DispatchError::UserError(format!(
                    "failed to check worker status: {}",
                    e
                )));
            }
        }
    }
}

/// Kill the worker's process group, then the worker itself, and reap it.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        if let Err(e) = Command::new("kill")
            .args(["-KILL", "--", group.as_str()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            warn!(pid = child.id(), error = %e, "failed to kill worker process group");
        }
    }

    // On Unix this is SIGKILL; on Windows it is TerminateProcess.
    let _ = child.kill();
    let _ = child.wait();
}
