//! Reading command inputs from files and stdin.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use wa_dispatch::error::{DispatchError, Result};
use wa_dispatch::phone::CellValue;

/// JSON request body accepted by `send --payload`.
#[derive(Debug, Default, Deserialize)]
pub struct SendPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    /// Spreadsheet column cells, already extracted by the caller.
    #[serde(default)]
    pub cells: Vec<CellValue>,
}

/// Read a whole file, or stdin when `path` is `-`.
pub fn read_text(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| DispatchError::UserError(format!("failed to read stdin: {}", e)))?;
        return Ok(content);
    }

    std::fs::read_to_string(path).map_err(|e| {
        DispatchError::UserError(format!("failed to read '{}': {}", path.display(), e))
    })
}

pub fn load_payload(path: &Path) -> Result<SendPayload> {
    let content = read_text(path)?;
    parse_payload(&content)
        .map_err(|e| DispatchError::UserError(format!("{} ({})", e, path.display())))
}

fn parse_payload(content: &str) -> Result<SendPayload> {
    serde_json::from_str(content)
        .map_err(|e| DispatchError::UserError(format!("invalid JSON payload: {}", e)))
}

/// Parse a single-column spreadsheet export into cells.
///
/// Each line is one cell; a blank line is an empty cell. A first line without
/// any digit is taken as the column header (e.g. `Telefon`) and dropped.
pub fn parse_cells(content: &str) -> Vec<CellValue> {
    let mut lines = content.lines().peekable();

    if let Some(first) = lines.peek()
        && !first.trim().is_empty()
        && !first.chars().any(|c| c.is_ascii_digit())
    {
        lines.next();
    }

    lines
        .map(|line| {
            let cell = line.trim().trim_matches('"');
            if cell.is_empty() {
                CellValue::Missing
            } else {
                CellValue::Text(cell.to_string())
            }
        })
        .collect()
}

/// Non-blank lines of a numbers file.
pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cells_skip_header_and_keep_empty_cells() {
        let cells = parse_cells("Telefon\n0532 111 22 33\n\n\"+90 532 999 88 77\"\n");
        assert_eq!(
            cells,
            vec![
                CellValue::Text("0532 111 22 33".into()),
                CellValue::Missing,
                CellValue::Text("+90 532 999 88 77".into()),
            ]
        );
    }

    #[test]
    fn test_cells_without_header() {
        let cells = parse_cells("5321112233\r\n05329998877\r\n");
        assert_eq!(
            cells,
            vec![
                CellValue::Text("5321112233".into()),
                CellValue::Text("05329998877".into()),
            ]
        );
    }

    #[test]
    fn test_lines_drop_blanks() {
        assert_eq!(parse_lines(" 0532 \n\n  \n123\n"), vec!["0532", "123"]);
    }

    #[test]
    fn test_payload_fields_are_optional() {
        let payload = parse_payload("{}").unwrap();
        assert!(payload.message.is_none());
        assert!(payload.phone_numbers.is_empty());
        assert!(payload.cells.is_empty());
    }

    #[test]
    fn test_payload_full() {
        let payload = parse_payload(
            r#"{"message":"Merhaba","phone_numbers":["0532 111 22 33"],"cells":[5321112233,null,"0555"]}"#,
        )
        .unwrap();
        assert_eq!(payload.message.as_deref(), Some("Merhaba"));
        assert_eq!(payload.phone_numbers, vec!["0532 111 22 33"]);
        assert_eq!(
            payload.cells,
            vec![
                CellValue::Integer(5321112233),
                CellValue::Missing,
                CellValue::Text("0555".into()),
            ]
        );
    }

    #[test]
    fn test_load_payload_reports_path_on_bad_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("body.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_payload(&path).unwrap_err();
        assert!(err.to_string().contains("invalid JSON payload"));
        assert!(err.to_string().contains("body.json"));
    }

    #[test]
    fn test_read_missing_file_is_user_error() {
        let err = read_text(Path::new("/nonexistent/message.txt")).unwrap_err();
        assert!(matches!(err, DispatchError::UserError(_)));
    }
}
