//! Config loading, validation, and derived values.

use super::model::Config;
use crate::error::{DispatchError, Result};
use crate::phone::Normalizer;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "wa-dispatch.yaml";

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "WA_DISPATCH_CONFIG";

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            DispatchError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Resolve and load the effective configuration.
    ///
    /// Lookup order:
    /// 1. `explicit` (the `--config` flag); the file must exist
    /// 2. the `WA_DISPATCH_CONFIG` environment variable; the file must exist
    /// 3. `wa-dispatch.yaml` in the working directory, if present
    /// 4. built-in defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
            && !path.is_empty()
        {
            return Self::load(PathBuf::from(path));
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return Self::load(default_path);
        }

        Ok(Self::default())
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| DispatchError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            DispatchError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `worker.command` must not be blank
    /// - `timeout_seconds` and `lock_stale_minutes` must be positive
    /// - `country_code` must be digits not starting with 0
    pub fn validate(&self) -> Result<()> {
        if self.worker.command.trim().is_empty() {
            return Err(DispatchError::UserError(
                "config validation failed: worker.command must not be empty".to_string(),
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(DispatchError::UserError(
                "config validation failed: timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.lock_stale_minutes == 0 {
            return Err(DispatchError::UserError(
                "config validation failed: lock_stale_minutes must be greater than 0".to_string(),
            ));
        }

        Normalizer::new(self.country_code.as_str())
            .map_err(|e| DispatchError::UserError(format!("config validation failed: {}", e)))?;

        Ok(())
    }

    /// Build the normalizer for the configured country code.
    pub fn normalizer(&self) -> Result<Normalizer> {
        Normalizer::new(self.country_code.as_str())
    }

    /// Path to the locks directory.
    pub fn locks_dir(&self) -> PathBuf {
        self.state_dir.join("locks")
    }

    /// Path to the automation session lock file.
    pub fn session_lock_path(&self) -> PathBuf {
        self.locks_dir().join("session.lock")
    }

    /// Minimum time a worker needs for `recipients` sends.
    ///
    /// Session startup plus one pacing delay per recipient.
    pub fn recipient_budget(&self, recipients: usize) -> Duration {
        let pacing = Duration::from_millis(self.pacing_delay_ms);
        Duration::from_secs(self.startup_seconds)
            .saturating_add(pacing.saturating_mul(u32::try_from(recipients).unwrap_or(u32::MAX)))
    }

    /// Timeout to apply when the caller does not supply one.
    ///
    /// The configured `timeout_seconds`, raised to the recipient budget when
    /// a large batch would not fit.
    pub fn default_timeout(&self, recipients: usize) -> Duration {
        Duration::from_secs(self.timeout_seconds).max(self.recipient_budget(recipients))
    }
}
