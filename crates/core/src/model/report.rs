use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::model::question::QuestionBank;
use crate::model::response::{FollowupAnswer, ResponseStore};

/// Answer text exported for questions without a response.
pub const NOT_ANSWERED: &str = "Not answered";

/// Exported view of one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub question: String,
    pub context: Option<String>,
    pub category: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followup_clarifications: Option<Vec<FollowupAnswer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub name: String,
    pub entries: Vec<ReportEntry>,
}

/// The questionnaire export.
///
/// Serializes `questionnaire_responses` as an object keyed by section name,
/// in bank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    #[serde(serialize_with = "serialize_sections")]
    pub questionnaire_responses: Vec<ReportSection>,
    pub completion_date: DateTime<Utc>,
    pub total_questions: usize,
}

impl Report {
    #[must_use]
    pub fn build(bank: &QuestionBank, store: &ResponseStore, completed_at: DateTime<Utc>) -> Self {
        let questionnaire_responses = bank
            .sections()
            .iter()
            .map(|section| ReportSection {
                name: section.name().to_owned(),
                entries: section
                    .questions()
                    .iter()
                    .map(|question| {
                        let response = store.get_at(section.name(), question.index());
                        ReportEntry {
                            question: question.text().to_owned(),
                            context: question.context().map(str::to_owned),
                            category: question
                                .category()
                                .unwrap_or(section.name())
                                .to_owned(),
                            answer: response
                                .map_or(NOT_ANSWERED, |r| r.answer())
                                .to_owned(),
                            followup_clarifications: response.map(|r| r.followups().to_vec()),
                            timestamp: response.map(|r| r.answered_at()),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            questionnaire_responses,
            completion_date: completed_at,
            total_questions: bank.total_questions(),
        }
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&ReportSection> {
        self.questionnaire_responses.iter().find(|s| s.name == name)
    }
}

#[allow(clippy::ptr_arg)]
fn serialize_sections<S: Serializer>(
    sections: &Vec<ReportSection>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(sections.len()))?;
    for section in sections {
        map.serialize_entry(&section.name, &section.entries)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::Section;
    use crate::model::response::{Response, ResponseKey};
    use crate::time::fixed_now;

    fn bank() -> QuestionBank {
        QuestionBank::new(vec![
            Section::new(
                "Company",
                vec![
                    ("Name?".to_owned(), Some("Legal entity".to_owned()), None),
                    ("Database?".to_owned(), None, Some("Infrastructure".to_owned())),
                ],
            ),
            Section::new("Security", vec![("Approver?".to_owned(), None, None)]),
        ])
    }

    #[test]
    fn report_marks_unanswered_and_defaults_category() {
        let bank = bank();
        let mut store = ResponseStore::new();
        store.commit(
            ResponseKey::new("Company", 1),
            Response::new(
                "SQL\n\nAdditional Details:\nWhich database?: PostgreSQL",
                vec![FollowupAnswer::new("Which database?", "PostgreSQL")],
                fixed_now(),
            ),
        );

        let report = Report::build(&bank, &store, fixed_now());
        assert_eq!(report.total_questions, 3);

        let company = report.section("Company").unwrap();
        assert_eq!(company.entries[0].answer, NOT_ANSWERED);
        assert_eq!(company.entries[0].category, "Company");
        assert!(company.entries[0].timestamp.is_none());
        assert_eq!(company.entries[1].category, "Infrastructure");
        assert_eq!(
            company.entries[1].followup_clarifications.as_deref().map(<[_]>::len),
            Some(1)
        );
    }

    #[test]
    fn report_serializes_sections_in_bank_order() {
        let bank = bank();
        let mut store = ResponseStore::new();
        store.commit(ResponseKey::new("Security", 0), Response::skipped(fixed_now()));

        let json = serde_json::to_value(Report::build(&bank, &store, fixed_now())).unwrap();
        let sections = json["questionnaire_responses"].as_object().unwrap();
        assert_eq!(
            sections.keys().collect::<Vec<_>>(),
            vec!["Company", "Security"]
        );
        let security = &sections["Security"][0];
        assert_eq!(security["answer"], "Skipped");
        assert!(security["context"].is_null());
        assert_eq!(security["followup_clarifications"], serde_json::json!([]));
        assert!(sections["Company"][0].get("timestamp").is_none());
        assert_eq!(json["total_questions"], 3);
    }
}
