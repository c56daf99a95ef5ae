//! Implementation of the `wa-dispatch lock` commands.

use crate::cli::LockClearArgs;
use wa_dispatch::config::Config;
use wa_dispatch::error::{DispatchError, Result};
use wa_dispatch::exit_codes;
use wa_dispatch::locks::{self, LockInfo};

/// Show the session lock holder, if any.
pub fn cmd_lock_status(config: &Config) -> Result<i32> {
    match locks::session_lock_status(config)? {
        None => println!("Session is free."),
        Some(lock) => {
            print_lock(&lock);
            if lock.is_stale {
                println!();
                println!(
                    "Note: the lock exceeds the {} min threshold. If no dispatch is running, \
                     use `wa-dispatch lock clear --force` to clear it.",
                    config.lock_stale_minutes
                );
            }
        }
    }

    Ok(exit_codes::SUCCESS)
}

/// Remove a leftover session lock.
pub fn cmd_lock_clear(config: &Config, args: LockClearArgs) -> Result<i32> {
    // Require --force flag
    if !args.force {
        return Err(DispatchError::UserError(
            "refusing to clear the session lock without --force flag.\n\n\
             Clearing the lock while a worker is running lets two workers drive one session.\n\
             Only clear it if you are certain the holder has crashed.\n\n\
             To clear the lock, run:\n  wa-dispatch lock clear --force"
                .to_string(),
        ));
    }

    match locks::clear_session_lock(config, true)? {
        Some(cleared) => {
            println!("Cleared:");
            print_lock(&cleared);
        }
        None => println!(
            "Cleared unreadable session lock at {}",
            config.session_lock_path().display()
        ),
    }

    Ok(exit_codes::SUCCESS)
}

fn print_lock(lock: &LockInfo) {
    println!("Session lock:");
    println!("    Owner:      {}", lock.metadata.owner);
    println!("    PID:        {}", lock.metadata.pid);
    println!(
        "    Created:    {}",
        lock.metadata.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("    Age:        {}", lock.metadata.age_string());
    println!("    Action:     {}", lock.metadata.action);
    if lock.is_stale {
        println!("    Status:     STALE");
    }
    println!("    Path:       {}", lock.path.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            state_dir: temp_dir.path().to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_of_free_session() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(cmd_lock_status(&test_config(&temp_dir)).unwrap(), exit_codes::SUCCESS);
    }

    #[test]
    fn test_clear_without_force_keeps_lock() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let _guard = locks::acquire_session_lock(&config, "dispatch").unwrap();

        let err = cmd_lock_clear(&config, LockClearArgs { force: false }).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert!(config.session_lock_path().exists());
    }

    #[test]
    fn test_clear_with_force_removes_lock() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let guard = locks::acquire_session_lock(&config, "dispatch").unwrap();
        std::mem::forget(guard);

        cmd_lock_clear(&config, LockClearArgs { force: true }).unwrap();
        assert!(!config.session_lock_path().exists());
    }
}
