//! Implementation of the `wa-dispatch send` command.

use super::input::{SendPayload, load_payload, parse_cells, read_text};
use crate::cli::SendArgs;
use std::time::Duration;
use wa_dispatch::config::Config;
use wa_dispatch::dispatch::{DispatchRequest, DispatchResult, Dispatcher};
use wa_dispatch::error::{DispatchError, Result};
use wa_dispatch::phone::RecipientSource;
use wa_dispatch::protocol::{ProgressOutcome, WorkerEvent};

/// Execute the `send` command.
///
/// Returns the process exit code summarizing the dispatch result.
pub fn cmd_send(config: &Config, args: SendArgs) -> Result<i32> {
    let request = build_request(&args)?;
    let dispatcher = Dispatcher::new(config.clone());

    let quiet = args.json;
    let result = dispatcher.dispatch_with(&request, &mut |event| report_event(event, quiet));

    if args.json {
        let json = serde_json::to_string_pretty(&result).map_err(|e| {
            DispatchError::UserError(format!("failed to serialize dispatch result: {}", e))
        })?;
        println!("{}", json);
    } else {
        print_summary(&result);
    }

    Ok(result.exit_code())
}

fn build_request(args: &SendArgs) -> Result<DispatchRequest> {
    let payload = match &args.payload {
        Some(path) => load_payload(path)?,
        None => SendPayload::default(),
    };

    // Flags win over the payload's message.
    let body = match (&args.message, &args.message_file) {
        (Some(message), _) => message.clone(),
        (None, Some(path)) => read_text(path)?,
        (None, None) => payload.message.clone().unwrap_or_default(),
    };

    let mut sources: Vec<RecipientSource> = args
        .numbers
        .iter()
        .map(|list| RecipientSource::Manual(list.clone()))
        .collect();

    if let Some(path) = &args.numbers_file {
        sources.push(RecipientSource::Spreadsheet(parse_cells(&read_text(path)?)));
    }
    if !payload.phone_numbers.is_empty() {
        sources.push(RecipientSource::List(payload.phone_numbers));
    }
    if !payload.cells.is_empty() {
        sources.push(RecipientSource::Spreadsheet(payload.cells));
    }

    let mut request = DispatchRequest::new(sources, body);
    if let Some(seconds) = args.timeout {
        request = request.with_timeout(Duration::from_secs(seconds));
    }
    Ok(request)
}

/// Surface worker events on stderr while the batch runs.
fn report_event(event: &WorkerEvent, quiet: bool) {
    match event {
        // Pairing always needs a human, even in JSON mode.
        WorkerEvent::PairingRequired { payload } => {
            eprintln!("Pairing required. Scan this code with the phone app:");
            eprintln!("{}", payload);
        }
        WorkerEvent::Ready if !quiet => eprintln!("Session ready, sending..."),
        WorkerEvent::RecipientProgress {
            recipient,
            outcome,
            detail,
        } if !quiet => match (outcome, detail) {
            (ProgressOutcome::Pending, _) => eprintln!("  sending   {}", recipient),
            (ProgressOutcome::Success, _) => eprintln!("  sent      {}", recipient),
            (ProgressOutcome::Failure, Some(detail)) => {
                eprintln!("  failed    {} ({})", recipient, detail)
            }
            (ProgressOutcome::Failure, None) => eprintln!("  failed    {}", recipient),
        },
        _ => {}
    }
}

fn print_summary(result: &DispatchResult) {
    if let Some(job_id) = result.job_id {
        println!("Job:        {}", job_id);
    }
    println!("Recipients: {}", result.accepted_recipients);

    if let Some(failure) = &result.failure {
        println!("Status:     FAILED ({})", failure.kind);
        println!();
        println!("{}", failure.message);
        return;
    }

    println!(
        "Status:     completed ({} delivered, {} failed)",
        result.delivered_count(),
        result.failed_count()
    );

    let failed: Vec<_> = result.outcomes.iter().filter(|o| !o.success).collect();
    if !failed.is_empty() {
        println!();
        println!("Failed recipients:");
        for outcome in failed {
            println!(
                "  {}  {}",
                outcome.recipient,
                outcome.error.as_deref().unwrap_or("no reason given")
            );
        }
    }
}
