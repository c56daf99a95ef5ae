//! CLI argument parsing for wa-dispatch.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wa_dispatch::logging::LogFormat;

/// wa-dispatch: send one message to many phone numbers through a
/// messaging-automation worker.
///
/// Recipients may come from a comma-separated list, a spreadsheet column
/// export, or a JSON payload. They are normalized to `+<digits>` and
/// deduplicated before a single worker process is started for the batch.
#[derive(Parser, Debug)]
#[command(name = "wa-dispatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the YAML config file (default: $WA_DISPATCH_CONFIG or ./wa-dispatch.yaml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level filter; RUST_LOG overrides it.
    #[arg(long, global = true, default_value = "info", value_name = "LEVEL")]
    pub log_level: String,

    /// Log record format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for wa-dispatch.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a message to a batch of recipients.
    ///
    /// Exits 0 when every recipient was delivered, 7 when the batch completed
    /// with some failed recipients, and with the failure's code otherwise.
    Send(SendArgs),

    /// Normalize phone numbers and report which look plausible.
    ///
    /// Does not start the worker.
    Validate(ValidateArgs),

    /// Automation session lock commands.
    Lock(LockCommand),

    /// Print the effective configuration as YAML.
    Config,
}

/// Arguments for the `send` command.
#[derive(Parser, Debug)]
pub struct SendArgs {
    /// Message text.
    #[arg(short, long, conflicts_with = "message_file")]
    pub message: Option<String>,

    /// Read the message text from a file.
    #[arg(long, value_name = "PATH")]
    pub message_file: Option<PathBuf>,

    /// Comma-separated phone numbers (repeatable).
    #[arg(short, long, value_name = "LIST")]
    pub numbers: Vec<String>,

    /// Spreadsheet column export: one cell per line, empty line for an empty cell.
    #[arg(long, value_name = "PATH")]
    pub numbers_file: Option<PathBuf>,

    /// JSON request body `{"message", "phone_numbers", "cells"}`; `-` reads stdin.
    #[arg(long, value_name = "PATH")]
    pub payload: Option<PathBuf>,

    /// Worker timeout in seconds (default: derived from config and batch size).
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Print the dispatch result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Phone numbers to check.
    pub numbers: Vec<String>,

    /// Read numbers from a file, one per line.
    #[arg(long, value_name = "PATH")]
    pub numbers_file: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Lock management subcommand.
#[derive(Parser, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

/// Available lock actions.
#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// Show who holds the automation session, if anyone.
    Status,

    /// Remove a session lock left behind by a crashed dispatch.
    ///
    /// Requires --force flag to prevent accidental clearing.
    Clear(LockClearArgs),
}

/// Arguments for the `lock clear` command.
#[derive(Parser, Debug)]
pub struct LockClearArgs {
    /// Force clearing the lock (required for safety).
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
