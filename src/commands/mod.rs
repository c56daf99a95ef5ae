//! Command implementations for wa-dispatch.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Every command returns the process exit code it wants;
//! errors are mapped to exit codes by `main`.

mod config_cmd;
mod input;
mod lock;
mod send;
mod validate;

use crate::cli::{Command, LockAction, LockCommand};
use wa_dispatch::config::Config;
use wa_dispatch::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(config: &Config, command: Command) -> Result<i32> {
    match command {
        Command::Send(args) => send::cmd_send(config, args),
        Command::Validate(args) => validate::cmd_validate(config, args),
        Command::Lock(lock_cmd) => dispatch_lock(config, lock_cmd),
        Command::Config => config_cmd::cmd_config(config),
    }
}

/// Dispatch lock subcommands.
fn dispatch_lock(config: &Config, lock_cmd: LockCommand) -> Result<i32> {
    match lock_cmd.action {
        LockAction::Status => lock::cmd_lock_status(config),
        LockAction::Clear(args) => lock::cmd_lock_clear(config, args),
    }
}
