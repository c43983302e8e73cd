//! Question bank loading.
//!
//! The bank document is a JSON object whose groups map a key such as
//! `gl_questions` to an array of `{question, context?, category?}` entries.
//! Groups may sit at the top level or under a `bpr_questionnaire` wrapper.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::question::{QuestionBank, Section};

/// Wrapper key used by exported BPR questionnaires.
pub const WRAPPER_KEY: &str = "bpr_questionnaire";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("question bank not found at {path}")]
    Missing { path: PathBuf },

    #[error("failed to read question bank at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in question bank: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid question bank structure: {0}")]
    InvalidStructure(String),

    #[error("question bank contains no questions")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    question: String,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

impl QuestionBank {
    /// Load and normalize a bank from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Missing` if the file does not exist, `BankError::Io`
    /// if it cannot be read, and any error from [`QuestionBank::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, BankError> {
        if !path.exists() {
            return Err(BankError::Missing {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|source| BankError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Parse and normalize a bank document.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Malformed` for invalid JSON,
    /// `BankError::InvalidStructure` for documents that do not have the
    /// expected shape, and `BankError::Empty` when no questions are present.
    pub fn from_json_str(raw: &str) -> Result<Self, BankError> {
        let root: Value = serde_json::from_str(raw)?;
        let Value::Object(root) = root else {
            return Err(BankError::InvalidStructure(
                "top-level value must be an object".into(),
            ));
        };

        let groups = match root.get(WRAPPER_KEY) {
            Some(Value::Object(groups)) => groups,
            Some(_) => {
                return Err(BankError::InvalidStructure(format!(
                    "`{WRAPPER_KEY}` must be an object"
                )));
            }
            None => &root,
        };

        let bank = Self::new(parse_groups(groups)?);
        if bank.is_empty() {
            return Err(BankError::Empty);
        }
        Ok(bank)
    }
}

fn parse_groups(groups: &Map<String, Value>) -> Result<Vec<Section>, BankError> {
    let mut seen = HashSet::new();
    let mut sections = Vec::with_capacity(groups.len());

    for (key, value) in groups {
        let name = display_section_name(key);
        if name.is_empty() {
            return Err(BankError::InvalidStructure(format!(
                "group `{key}` has no usable name"
            )));
        }
        if !seen.insert(name.clone()) {
            return Err(BankError::InvalidStructure(format!(
                "duplicate section `{name}` (from group `{key}`)"
            )));
        }

        let Value::Array(items) = value else {
            return Err(BankError::InvalidStructure(format!(
                "group `{key}` must be an array of questions"
            )));
        };

        let mut entries = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let entry: RawEntry = serde_json::from_value(item.clone()).map_err(|err| {
                BankError::InvalidStructure(format!("{key}[{i}]: {err}"))
            })?;
            let text = entry.question.trim();
            if text.is_empty() {
                return Err(BankError::InvalidStructure(format!(
                    "{key}[{i}]: question text is blank"
                )));
            }
            entries.push((
                text.to_owned(),
                non_blank(entry.context),
                non_blank(entry.category),
            ));
        }

        sections.push(Section::new(name, entries));
    }

    Ok(sections)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Turn a group key into a section display name.
///
/// `gl_questions` becomes `General Ledger`, `company_questions` becomes
/// `Company`.
#[must_use]
pub fn display_section_name(key: &str) -> String {
    let stem = key.strip_suffix("_questions").unwrap_or(key);
    let title = stem
        .split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");

    match title.as_str() {
        "Gl" => "General Ledger".into(),
        "Ap" => "Accounts Payable".into(),
        "Ar" => "Accounts Receivable".into(),
        "Pea" => "Prepaid Expense Amortization".into(),
        "Cash" => "Cash Management".into(),
        _ => title,
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Short topic blurb shown under a section on the selection screen.
#[must_use]
pub fn section_description(section: &str) -> &'static str {
    match section {
        "Company" => "basic company information and project details",
        "Security" => "security settings and access controls",
        "General Ledger" => "general ledger configuration and accounting settings",
        "Financial Reports" => "financial reporting requirements",
        "Cash Management" => "cash and bank account management",
        "Accounts Payable" => "supplier and payment management",
        "Purchasing" => "purchasing process and workflow",
        "Accounts Receivable" => "customer and invoice management",
        "Order Entry" => "sales order and invoicing process",
        "Prepaid Expense Amortization" => "prepaid expense handling and amortization",
        _ => "system configuration",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_group_keys() {
        assert_eq!(display_section_name("company_questions"), "Company");
        assert_eq!(display_section_name("gl_questions"), "General Ledger");
        assert_eq!(
            display_section_name("financial_reports_questions"),
            "Financial Reports"
        );
        assert_eq!(display_section_name("pea_questions"), "Prepaid Expense Amortization");
        assert_eq!(display_section_name("ORDER_ENTRY"), "Order Entry");
    }

    #[test]
    fn loads_wrapped_document_in_order() {
        let raw = r#"{
            "bpr_questionnaire": {
                "security_questions": [
                    {"question": "Who approves access?", "context": "", "category": "Access"}
                ],
                "company_questions": [
                    {"question": "Company name?"},
                    {"question": "Which database do you run?", "context": "Production systems"}
                ]
            }
        }"#;
        let bank = QuestionBank::from_json_str(raw).unwrap();

        let names: Vec<_> = bank.section_names().collect();
        assert_eq!(names, vec!["Security", "Company"]);

        let q = bank.question("Security", 0).unwrap();
        assert_eq!(q.context(), None);
        assert_eq!(q.category(), Some("Access"));

        let q = bank.question("Company", 1).unwrap();
        assert_eq!(q.context(), Some("Production systems"));
        assert_eq!(q.index(), 1);
    }

    #[test]
    fn loads_unwrapped_document() {
        let raw = r#"{"ap_questions": [{"question": "How many vendors?"}]}"#;
        let bank = QuestionBank::from_json_str(raw).unwrap();
        assert!(bank.section("Accounts Payable").is_some());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = QuestionBank::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, BankError::Malformed(_)));
    }

    #[test]
    fn rejects_non_array_group() {
        let err = QuestionBank::from_json_str(r#"{"company": {"question": "x"}}"#).unwrap_err();
        assert!(matches!(err, BankError::InvalidStructure(_)));
    }

    #[test]
    fn rejects_blank_question_text() {
        let err = QuestionBank::from_json_str(r#"{"company": [{"question": "  "}]}"#).unwrap_err();
        assert!(matches!(err, BankError::InvalidStructure(_)));
    }

    #[test]
    fn rejects_duplicate_section_names() {
        let raw = r#"{"gl": [{"question": "a"}], "gl_questions": [{"question": "b"}]}"#;
        let err = QuestionBank::from_json_str(raw).unwrap_err();
        assert!(matches!(err, BankError::InvalidStructure(_)));
    }

    #[test]
    fn rejects_bank_without_questions() {
        let err = QuestionBank::from_json_str(r#"{"bpr_questionnaire": {}}"#).unwrap_err();
        assert!(matches!(err, BankError::Empty));
        let err = QuestionBank::from_json_str(r#"{"company": []}"#).unwrap_err();
        assert!(matches!(err, BankError::Empty));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bpr.json");
        let err = QuestionBank::load(&path).unwrap_err();
        assert!(matches!(err, BankError::Missing { .. }));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bpr.json");
        std::fs::write(&path, r#"{"cash_questions": [{"question": "How many bank accounts?"}]}"#)
            .unwrap();
        let bank = QuestionBank::load(&path).unwrap();
        assert_eq!(bank.total_questions(), 1);
        assert_eq!(section_description("Cash Management"), "cash and bank account management");
    }
}
