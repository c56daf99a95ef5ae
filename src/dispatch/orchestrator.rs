//! The dispatch pipeline: recipients in, per-recipient outcomes out.

use super::result::DispatchResult;
use crate::config::Config;
use crate::error::{DispatchError, Result};
use crate::job::{JobDescriptor, MessageBody};
use crate::locks::acquire_session_lock;
use crate::phone::{RecipientSet, RecipientSource};
use crate::protocol::{ProtocolSession, RecipientOutcome, WorkerEvent};
use crate::worker::WorkerSupervisor;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{error, info, warn};

/// Inputs of one dispatch call.
#[derive(Debug, Clone, Default)]
pub struct DispatchRequest {
    /// Where the recipients come from. Entries across sources are merged and deduplicated.
    pub sources: Vec<RecipientSource>,
    /// Message text sent to every recipient.
    pub body: String,
    /// Explicit worker deadline. `None` derives one from the config.
    pub timeout: Option<Duration>,
}

impl DispatchRequest {
    pub fn new(sources: Vec<RecipientSource>, body: impl Into<String>) -> Self {
        Self {
            sources,
            body: body.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Runs dispatch calls against one configured worker.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: Config,
    supervisor: WorkerSupervisor,
}

impl Dispatcher {
    pub fn new(config: Config) -> Self {
        let supervisor = WorkerSupervisor::new(config.worker.clone());
        Self { config, supervisor }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Dispatch a message, ignoring intermediate worker events.
    pub fn dispatch(&self, request: &DispatchRequest) -> DispatchResult {
        self.dispatch_with(request, &mut |_| {})
    }

    /// Dispatch a message, handing every parsed worker event to `on_event`
    /// as it arrives.
    ///
    /// Never fails: every abort is reported through
    /// [`DispatchResult::failure`], with `outcomes` left empty.
    pub fn dispatch_with(
        &self,
        request: &DispatchRequest,
        on_event: &mut dyn FnMut(&WorkerEvent),
    ) -> DispatchResult {
        let normalizer = match self.config.normalizer() {
            Ok(normalizer) => normalizer,
            Err(e) => return DispatchResult::failed(None, 0, None, &e),
        };

        let recipients = RecipientSet::build(&normalizer, &request.sources);
        let job = match build_job(request, &recipients) {
            Ok(job) => job,
            Err(e) => {
                warn!(error = %e, "dispatch rejected");
                return DispatchResult::failed(None, recipients.len(), None, &e);
            }
        };

        let accepted = recipients.len();
        let _session_lock =
            match acquire_session_lock(&self.config, &format!("dispatch {}", job.id())) {
                Ok(guard) => guard,
                Err(e) => {
                    warn!(job_id = %job.id(), "automation session is busy");
                    return DispatchResult::failed(Some(job.id()), accepted, None, &e);
                }
            };

        let timeout = self.effective_timeout(request.timeout, accepted);
        info!(
            job_id = %job.id(),
            recipients = accepted,
            timeout_secs = timeout.as_secs(),
            "dispatch started"
        );

        let mut session = ProtocolSession::new();
        let run = self.supervisor.run(&job, timeout, &mut |line| {
            let event = session.observe(line);
            on_event(&event);
        });
        let pairing = session.pairing_payload().map(str::to_string);

        let outcomes = run.and_then(|run| {
            if !session.unparsed_lines().is_empty() {
                warn!(
                    job_id = %job.id(),
                    count = session.unparsed_lines().len(),
                    "worker emitted unrecognized lines"
                );
            }
            session.finish().map_err(|e| with_worker_stderr(e, &run.stderr))
        });

        match outcomes.and_then(|outcomes| check_completeness(&recipients, outcomes)) {
            Ok(outcomes) => {
                let result = DispatchResult {
                    job_id: Some(job.id()),
                    accepted_recipients: accepted,
                    outcomes,
                    failure: None,
                    pairing,
                };
                info!(
                    job_id = %job.id(),
                    delivered = result.delivered_count(),
                    failed = result.failed_count(),
                    "dispatch finished"
                );
                result
            }
            Err(e) => {
                error!(job_id = %job.id(), error = %e, "dispatch failed");
                DispatchResult::failed(Some(job.id()), accepted, pairing, &e)
            }
        }
    }

    /// Deadline for a worker handling `recipients` sends.
    fn effective_timeout(&self, requested: Option<Duration>, recipients: usize) -> Duration {
        match requested {
            Some(timeout) => {
                let budget = self.config.recipient_budget(recipients);
                if timeout < budget {
                    warn!(
                        timeout_secs = timeout.as_secs(),
                        budget_secs = budget.as_secs(),
                        recipients,
                        "requested timeout is shorter than the pacing budget"
                    );
                }
                timeout
            }
            None => self.config.default_timeout(recipients),
        }
    }
}

fn build_job(request: &DispatchRequest, recipients: &RecipientSet) -> Result<JobDescriptor> {
    if request.timeout == Some(Duration::ZERO) {
        return Err(DispatchError::ValidationError(
            "timeout must be greater than zero".to_string(),
        ));
    }

    let body = MessageBody::new(request.body.as_str())?;
    JobDescriptor::new(body, recipients)
}

/// Attach the worker's stderr to a protocol violation.
///
/// A worker that catches its own error still exits 0; the cause is only on stderr.
fn with_worker_stderr(err: DispatchError, stderr: &str) -> DispatchError {
    let stderr = stderr.trim();
    match err {
        DispatchError::ProtocolViolation(message) if !stderr.is_empty() => {
            DispatchError::ProtocolViolation(format!("{}\nWorker stderr:\n{}", message, stderr))
        }
        other => other,
    }
}

/// Check that `outcomes` covers every recipient exactly once and nothing else.
fn check_completeness(
    recipients: &RecipientSet,
    outcomes: Vec<RecipientOutcome>,
) -> Result<Vec<RecipientOutcome>> {
    let problems = completeness_problems(recipients, &outcomes);
    if problems.is_empty() {
        Ok(outcomes)
    } else {
        Err(DispatchError::ProtocolViolation(format!(
            "results do not match the recipient set: {}",
            problems.join("; ")
        )))
    }
}

fn completeness_problems(recipients: &RecipientSet, outcomes: &[RecipientOutcome]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen = BTreeSet::new();

    for outcome in outcomes {
        if !recipients.contains(&outcome.recipient) {
            problems.push(format!("unexpected recipient {} in results", outcome.recipient));
        } else if !seen.insert(&outcome.recipient) {
            problems.push(format!("duplicate outcome for {}", outcome.recipient));
        }
    }

    let missing: Vec<String> = recipients
        .iter()
        .filter(|number| !seen.contains(number))
        .map(|number| number.to_string())
        .collect();
    if !missing.is_empty() {
        problems.push(format!("missing outcome for {}", missing.join(", ")));
    }

    problems
}
