//! Import/export of the planner document.
//!
//! A document is valid for import iff it parses as JSON and carries
//! array-typed `goals` and `classes` fields; the shape is not otherwise
//! deep-validated. Exports are indented JSON named
//! `zenith-planner-YYYYMMDD-HHMMSS.json`.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::TransferError;
use crate::state::PlannerState;

/// Result type for import/export operations.
pub type TransferResult<T> = std::result::Result<T, TransferError>;

/// Whether `value` has the required document shape: array-typed `goals` and
/// `classes` fields.
pub fn is_valid_document(value: &serde_json::Value) -> bool {
    value.get("goals").is_some_and(serde_json::Value::is_array)
        && value.get("classes").is_some_and(serde_json::Value::is_array)
}

/// Parse and validate a planner document.
///
/// Fails with [`TransferError::Parse`] on invalid JSON and
/// [`TransferError::MalformedDocument`] when `goals`/`classes` are missing or
/// not arrays. Never mutates anything — callers replace their state only on
/// success.
pub fn parse_document(json: &str) -> TransferResult<PlannerState> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| TransferError::Parse {
            message: e.to_string(),
        })?;
    if !is_valid_document(&value) {
        return Err(TransferError::MalformedDocument);
    }
    serde_json::from_value(value).map_err(|e| TransferError::Parse {
        message: e.to_string(),
    })
}

/// Serialize the full state as an indented JSON document.
pub fn export_document(state: &PlannerState) -> TransferResult<String> {
    serde_json::to_string_pretty(state).map_err(|e| TransferError::Parse {
        message: e.to_string(),
    })
}

/// Export file name for a given local timestamp:
/// `zenith-planner-YYYYMMDD-HHMMSS.json`.
pub fn export_file_name(at: NaiveDateTime) -> String {
    format!("zenith-planner-{}.json", at.format("%Y%m%d-%H%M%S"))
}

/// Write an export document into `dir`, returning the created path.
pub fn write_export(state: &PlannerState, dir: &Path, at: NaiveDateTime) -> TransferResult<PathBuf> {
    let path = dir.join(export_file_name(at));
    let document = export_document(state)?;
    std::fs::write(&path, document).map_err(|e| TransferError::Write {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_document_round_trips() {
        let state = parse_document(r#"{"goals": [], "classes": []}"#).unwrap();
        assert!(state.goals.is_empty());
        assert!(state.classes.is_empty());

        let json = export_document(&state).unwrap();
        let back = parse_document(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn non_array_goals_is_malformed() {
        let err = parse_document(r#"{"goals": {}, "classes": []}"#).unwrap_err();
        assert!(matches!(err, TransferError::MalformedDocument));
    }

    #[test]
    fn missing_classes_is_malformed() {
        let err = parse_document(r#"{"goals": []}"#).unwrap_err();
        assert!(matches!(err, TransferError::MalformedDocument));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = parse_document("{not json").unwrap_err();
        assert!(matches!(err, TransferError::Parse { .. }));
    }

    #[test]
    fn export_is_indented() {
        let json = export_document(&PlannerState::default()).unwrap();
        assert!(json.contains('\n'), "export should be pretty-printed");
    }

    #[test]
    fn export_file_name_format() {
        let at = NaiveDate::from_ymd_opt(2024, 6, 12)
            .unwrap()
            .and_hms_opt(9, 5, 3)
            .unwrap();
        assert_eq!(export_file_name(at), "zenith-planner-20240612-090503.json");
    }

    #[test]
    fn write_export_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let at = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let path = write_export(&PlannerState::default(), dir.path(), at).unwrap();
        assert!(path.ends_with("zenith-planner-20240102-030405.json"));
        let body = std::fs::read_to_string(&path).unwrap();
        assert!(parse_document(&body).is_ok());
    }
}
