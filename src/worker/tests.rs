//! Tests for the worker supervisor.
//!
//! Workers are `sh` scripts, so these tests only run on Unix.

#![cfg(unix)]

use super::*;
use crate::config::WorkerConfig;
use crate::error::DispatchError;
use crate::test_support::{FakeWorker, make_job};
use std::time::{Duration, Instant};

fn run_script(body: &str, timeout: Duration) -> (crate::error::Result<WorkerRun>, Vec<String>) {
    let worker = FakeWorker::new(body);
    let supervisor = WorkerSupervisor::new(worker.worker_config());
    let job = make_job(&["+905321112233"], "Merhaba");

    let mut seen = Vec::new();
    let result = supervisor.run(&job, timeout, &mut |line| seen.push(line.to_string()));
    (result, seen)
}

#[test]
fn test_payload_is_final_argument() {
    let (result, seen) = run_script(r#"printf 'ARG:%s\n' "$1""#, Duration::from_secs(10));

    let run = result.unwrap();
    assert_eq!(run.exit_code, Some(0));
    assert_eq!(
        seen,
        vec![r#"ARG:{"phoneNumbers":["+905321112233"],"message":"Merhaba"}"#.to_string()]
    );
    assert_eq!(run.stdout_lines, seen);
}

#[test]
fn test_lines_are_streamed_in_order() {
    let (result, seen) = run_script(
        "echo 'QR_CODE: abc'\necho READY\necho 'RESULTS: []'",
        Duration::from_secs(10),
    );

    assert!(result.is_ok());
    assert_eq!(seen, vec!["QR_CODE: abc", "READY", "RESULTS: []"]);
}

#[test]
fn test_crlf_is_trimmed() {
    let (result, seen) = run_script(r"printf 'READY\r\nlast'", Duration::from_secs(10));

    assert!(result.is_ok());
    assert_eq!(seen, vec!["READY", "last"]);
}

#[test]
fn test_invalid_utf8_is_replaced() {
    let (result, seen) = run_script(r"printf '\377oops\n'", Duration::from_secs(10));

    assert!(result.is_ok());
    assert_eq!(seen.len(), 1);
    assert!(seen[0].ends_with("oops"));
    assert!(seen[0].contains('\u{FFFD}'));
}

#[test]
fn test_stderr_is_captured() {
    let (result, _) = run_script("echo 'chromium warning' >&2\necho done", Duration::from_secs(10));

    let run = result.unwrap();
    assert!(run.stderr.contains("chromium warning"));
}

#[test]
fn test_nonzero_exit_is_worker_failed() {
    let (result, seen) = run_script(
        "echo READY\necho 'browser crashed' >&2\nexit 3",
        Duration::from_secs(10),
    );

    assert_eq!(seen, vec!["READY"]);
    match result.unwrap_err() {
        DispatchError::WorkerFailed { exit_code, stderr } => {
            assert_eq!(exit_code, Some(3));
            assert_eq!(stderr, "browser crashed");
        }
        other => panic!("expected WorkerFailed, got {:?}", other),
    }
}

#[test]
fn test_nonzero_exit_without_stderr() {
    let (result, _) = run_script("exit 1", Duration::from_secs(10));

    let err = result.unwrap_err();
    assert!(err.to_string().contains("no stderr output"));
    assert_eq!(err.exit_code(), crate::exit_codes::WORKER_FAILURE);
}

#[test]
fn test_missing_program_is_worker_failed() {
    let supervisor = WorkerSupervisor::new(WorkerConfig {
        command: "wa_dispatch_nonexistent_worker_xyz".to_string(),
        ..Default::default()
    });
    let job = make_job(&["+905321112233"], "Merhaba");

    let err = supervisor
        .run(&job, Duration::from_secs(5), &mut |_| {})
        .unwrap_err();
    match err {
        DispatchError::WorkerFailed { exit_code, stderr } => {
            assert_eq!(exit_code, None);
            assert!(stderr.contains("failed to start worker"));
        }
        other => panic!("expected WorkerFailed, got {:?}", other),
    }
}

#[test]
fn test_unparsable_command_is_user_error() {
    let supervisor = WorkerSupervisor::new(WorkerConfig {
        command: "node \"unterminated".to_string(),
        ..Default::default()
    });
    let job = make_job(&["+905321112233"], "Merhaba");

    let err = supervisor
        .run(&job, Duration::from_secs(5), &mut |_| {})
        .unwrap_err();
    assert!(matches!(err, DispatchError::UserError(_)));
    assert!(err.to_string().contains("failed to parse worker command"));
}

#[test]
fn test_environment_and_working_dir_are_applied() {
    let worker = FakeWorker::new("echo \"$GREETING\"\npwd");
    let mut config = worker.worker_config();
    config
        .environment
        .insert("GREETING".to_string(), "selam".to_string());
    config.working_dir = Some(worker.path().to_path_buf());

    let supervisor = WorkerSupervisor::new(config);
    let job = make_job(&["+905321112233"], "Merhaba");
    let run = supervisor
        .run(&job, Duration::from_secs(10), &mut |_| {})
        .unwrap();

    assert_eq!(run.stdout_lines[0], "selam");
    let cwd = std::path::Path::new(&run.stdout_lines[1]).canonicalize().unwrap();
    assert_eq!(cwd, worker.path().canonicalize().unwrap());
}

#[test]
fn test_timeout_kills_worker() {
    let start = Instant::now();
    let (result, seen) = run_script("echo READY\nexec sleep 30", Duration::from_secs(1));

    assert_eq!(seen, vec!["READY"]);
    match result.unwrap_err() {
        DispatchError::Timeout { seconds } => assert_eq!(seconds, 1),
        other => panic!("expected Timeout, got {:?}", other),
    }
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[test]
fn test_timeout_after_stdout_closed() {
    let start = Instant::now();
    let (result, _) = run_script("echo READY\nexec >&-\nexec sleep 30", Duration::from_secs(1));

    assert!(matches!(result, Err(DispatchError::Timeout { .. })));
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[cfg(target_os = "linux")]
#[test]
fn test_timeout_leaves_no_orphans() {
    use crate::test_support::{eventually, is_alive, read_pid};

    let worker = FakeWorker::new(
        "dir=$(dirname \"$0\")\n\
         echo $$ > \"$dir/worker.pid\"\n\
         sleep 30 &\n\
         echo $! > \"$dir/child.pid\"\n\
         echo READY\n\
         wait",
    );
    let supervisor = WorkerSupervisor::new(worker.worker_config());
    let job = make_job(&["+905321112233"], "Merhaba");

    let result = supervisor.run(&job, Duration::from_secs(1), &mut |_| {});
    assert!(matches!(result, Err(DispatchError::Timeout { .. })));

    let worker_pid = read_pid(&worker.path().join("worker.pid"));
    let child_pid = read_pid(&worker.path().join("child.pid"));
    assert!(!is_alive(worker_pid), "worker survived the timeout");
    assert!(
        eventually(Duration::from_secs(5), || !is_alive(child_pid)),
        "worker child survived the timeout"
    );
}
