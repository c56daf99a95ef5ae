//! Implementation of the `wa-dispatch config` command.

use wa_dispatch::config::Config;
use wa_dispatch::error::Result;
use wa_dispatch::exit_codes;

/// Print the effective configuration as YAML.
pub fn cmd_config(config: &Config) -> Result<i32> {
    print!("{}", config.to_yaml()?);
    Ok(exit_codes::SUCCESS)
}
