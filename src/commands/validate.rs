//! Implementation of the `wa-dispatch validate` command.

use super::input::{parse_lines, read_text};
use crate::cli::ValidateArgs;
use wa_dispatch::config::Config;
use wa_dispatch::error::{DispatchError, Result};
use wa_dispatch::exit_codes;
use wa_dispatch::phone::{ValidationReport, validate_identifiers};

/// Execute the `validate` command.
///
/// Exits with `VALIDATION_FAILURE` when any entry is implausible.
pub fn cmd_validate(config: &Config, args: ValidateArgs) -> Result<i32> {
    let mut raws = args.numbers.clone();
    if let Some(path) = &args.numbers_file {
        raws.extend(parse_lines(&read_text(path)?));
    }

    if raws.is_empty() {
        return Err(DispatchError::UserError(
            "no phone numbers given.\n\n\
             Pass numbers as arguments or use --numbers-file <path>."
                .to_string(),
        ));
    }

    let report = validate_identifiers(&config.normalizer()?, &raws);

    if args.json {
        let json = serde_json::to_string_pretty(&report).map_err(|e| {
            DispatchError::UserError(format!("failed to serialize validation report: {}", e))
        })?;
        println!("{}", json);
    } else {
        print_report(&report);
    }

    Ok(if report.total_invalid > 0 {
        exit_codes::VALIDATION_FAILURE
    } else {
        exit_codes::SUCCESS
    })
}

fn print_report(report: &ValidationReport) {
    println!("Valid ({}):", report.total_valid);
    for number in &report.valid_numbers {
        println!("  {}", number);
    }

    if report.total_invalid > 0 {
        println!();
        println!("Invalid ({}):", report.total_invalid);
        for raw in &report.invalid_numbers {
            println!("  {}", raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn validate_args(numbers: &[&str]) -> ValidateArgs {
        ValidateArgs {
            numbers: numbers.iter().map(|s| s.to_string()).collect(),
            numbers_file: None,
            json: true,
        }
    }

    #[test]
    fn test_all_plausible_exits_zero() {
        let code = cmd_validate(
            &Config::default(),
            validate_args(&["0532 111 22 33", "+90 (532) 999-88-77"]),
        )
        .unwrap();
        assert_eq!(code, exit_codes::SUCCESS);
    }

    #[test]
    fn test_implausible_entry_exits_with_validation_failure() {
        let code = cmd_validate(&Config::default(), validate_args(&["0532 111 22 33", "12"])).unwrap();
        assert_eq!(code, exit_codes::VALIDATION_FAILURE);
    }

    #[test]
    fn test_reads_numbers_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("numbers.txt");
        std::fs::write(&path, "05321112233\n\n05329998877\n").unwrap();

        let args = ValidateArgs {
            numbers_file: Some(path),
            ..validate_args(&[])
        };
        assert_eq!(cmd_validate(&Config::default(), args).unwrap(), exit_codes::SUCCESS);
    }

    #[test]
    fn test_no_input_is_user_error() {
        let err = cmd_validate(&Config::default(), validate_args(&[])).unwrap_err();
        assert!(err.to_string().contains("no phone numbers given"));
    }
}
