//! wa-dispatch: batch message dispatcher for a messaging-automation worker.
//!
//! This is the main entry point for the `wa-dispatch` CLI. It parses
//! arguments, installs logging, loads the configuration, dispatches to the
//! appropriate command handler, and maps errors to exit codes.

mod cli;
mod commands;

use cli::Cli;
use std::process::ExitCode;
use wa_dispatch::config::Config;
use wa_dispatch::{exit_codes, logging};

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if let Err(err) = logging::init(&cli.log_level, cli.log_format) {
        eprintln!("Error: {:#}", err);
        return ExitCode::from(exit_codes::USER_ERROR as u8);
    }

    let result = Config::resolve(cli.config.as_deref())
        .and_then(|config| commands::dispatch(&config, cli.command));

    match result {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
