use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use intake_core::model::Report;

use crate::error::ReportError;

/// File name for a report exported at `at`.
#[must_use]
pub fn report_file_name(at: DateTime<Utc>) -> String {
    format!("responses_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Write `report` as pretty JSON into `dir` and return the file path.
///
/// # Errors
///
/// Returns `ReportError::Json` if serialization fails and `ReportError::Io`
/// if the directory or file cannot be written.
pub fn write_report(report: &Report, dir: &Path, at: DateTime<Utc>) -> Result<PathBuf, ReportError> {
    let json = serde_json::to_string_pretty(report)?;
    fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(report_file_name(at));
    fs::write(&path, json).map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "report exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::model::{QuestionBank, ResponseStore, Section};
    use intake_core::time::fixed_now;

    #[test]
    fn file_name_uses_compact_timestamp() {
        let name = report_file_name(fixed_now());
        assert!(name.starts_with("responses_"));
        assert!(name.ends_with(".json"));
        assert_eq!(name.len(), "responses_YYYYMMDD_HHMMSS.json".len());
    }

    #[test]
    fn writes_pretty_json_into_dir() {
        let dir = tempfile::tempdir().unwrap();
        let bank = QuestionBank::new(vec![Section::new(
            "Company",
            vec![("What do you sell?".to_owned(), None, None)],
        )]);
        let report = Report::build(&bank, &ResponseStore::new(), fixed_now());

        let path = write_report(&report, &dir.path().join("out"), fixed_now()).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["total_questions"], 1);
        assert_eq!(
            value["questionnaire_responses"]["Company"][0]["answer"],
            "Not answered"
        );
        assert!(raw.contains('\n'));
    }
}
