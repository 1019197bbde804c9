//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use medtrack_core::Fields;
use serde_json::Value;

use crate::cli::PayloadArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Refuses to guess when stdin is not a terminal.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Resolve `--data` / `--from-file` into a document body.
pub fn read_payload(payload: &PayloadArgs) -> Result<Fields, CliError> {
    let value = match (&payload.data, &payload.from_file) {
        (Some(data), _) => serde_json::from_str(data).map_err(|e| CliError::Validation {
            field: "data".into(),
            reason: format!("invalid JSON: {e}"),
        })?,
        (None, Some(path)) => read_json_file(path)?,
        (None, None) => {
            return Err(CliError::Validation {
                field: "data".into(),
                reason: "one of --data or --from-file is required".into(),
            });
        }
    };

    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(CliError::Validation {
            field: "data".into(),
            reason: format!("expected a JSON object, got {other}"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn inline_object_becomes_fields() {
        let payload = PayloadArgs {
            data: Some(r#"{"name":"Aspirin","quantity":10}"#.into()),
            from_file: None,
        };
        let fields = read_payload(&payload).unwrap();
        assert_eq!(fields["name"], "Aspirin");
        assert_eq!(fields["quantity"], 10);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let payload = PayloadArgs {
            data: Some("[1, 2]".into()),
            from_file: None,
        };
        assert!(matches!(
            read_payload(&payload),
            Err(CliError::Validation { .. })
        ));
    }

    #[test]
    fn payload_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"temperature": 21.5}}"#).unwrap();
        let payload = PayloadArgs {
            data: None,
            from_file: Some(file.path().to_path_buf()),
        };
        let fields = read_payload(&payload).unwrap();
        assert_eq!(fields["temperature"], 21.5);
    }
}
