use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::answer::AnswerText;
use crate::model::question::Section;

/// Answer text recorded when a question is skipped.
pub const SKIPPED_ANSWER: &str = "Skipped";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResponseError {
    #[error("no response recorded for {key}")]
    NotFound { key: ResponseKey },
}

/// Identifies one question: section name plus zero-based index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResponseKey {
    pub section: String,
    pub index: usize,
}

impl ResponseKey {
    #[must_use]
    pub fn new(section: impl Into<String>, index: usize) -> Self {
        Self {
            section: section.into(),
            index,
        }
    }
}

impl fmt::Display for ResponseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.section, self.index + 1)
    }
}

/// One clarifying question and the answer the user gave to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowupAnswer {
    pub question: String,
    pub answer: String,
}

impl FollowupAnswer {
    #[must_use]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Accepted answer for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    answer: String,
    followups: Vec<FollowupAnswer>,
    answered_at: DateTime<Utc>,
}

impl Response {
    #[must_use]
    pub fn new(
        answer: impl Into<String>,
        followups: Vec<FollowupAnswer>,
        answered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            answer: answer.into(),
            followups,
            answered_at,
        }
    }

    /// Response recorded for a skipped question.
    #[must_use]
    pub fn skipped(answered_at: DateTime<Utc>) -> Self {
        Self::new(SKIPPED_ANSWER, Vec::new(), answered_at)
    }

    /// Copy of this response with a replaced answer and timestamp.
    ///
    /// Follow-up history is carried over unchanged.
    #[must_use]
    pub fn edited(&self, answer: &AnswerText, at: DateTime<Utc>) -> Self {
        Self {
            answer: answer.as_str().to_owned(),
            followups: self.followups.clone(),
            answered_at: at,
        }
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn followups(&self) -> &[FollowupAnswer] {
        &self.followups
    }

    #[must_use]
    pub fn answered_at(&self) -> DateTime<Utc> {
        self.answered_at
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.answer == SKIPPED_ANSWER
    }
}

/// Accepted responses keyed by `(section, question index)`.
///
/// Presence of an entry is the only definition of "answered". Writes replace
/// the whole `Response`; nothing is mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseStore {
    responses: BTreeMap<ResponseKey, Response>,
}

impl ResponseStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the response for `key`.
    pub fn commit(&mut self, key: ResponseKey, response: Response) {
        self.responses.insert(key, response);
    }

    /// Replace the answer text of an existing response, keeping its follow-ups.
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::NotFound` if `key` has no response.
    pub fn update_answer(
        &mut self,
        key: &ResponseKey,
        answer: &AnswerText,
        at: DateTime<Utc>,
    ) -> Result<&Response, ResponseError> {
        let current = self
            .responses
            .get(key)
            .ok_or_else(|| ResponseError::NotFound { key: key.clone() })?;
        let updated = current.edited(answer, at);
        self.responses.insert(key.clone(), updated);
        self.responses
            .get(key)
            .ok_or_else(|| ResponseError::NotFound { key: key.clone() })
    }

    #[must_use]
    pub fn get(&self, key: &ResponseKey) -> Option<&Response> {
        self.responses.get(key)
    }

    #[must_use]
    pub fn get_at(&self, section: &str, index: usize) -> Option<&Response> {
        self.responses.get(&ResponseKey::new(section, index))
    }

    #[must_use]
    pub fn is_answered(&self, section: &str, index: usize) -> bool {
        self.get_at(section, index).is_some()
    }

    /// Number of answered questions in `section`.
    ///
    /// Only indices inside the section count, so stray keys can never push
    /// the count above the section length.
    #[must_use]
    pub fn answered_count(&self, section: &Section) -> usize {
        (0..section.len())
            .filter(|&i| self.is_answered(section.name(), i))
            .count()
    }

    /// Position of the first unanswered question, or `section.len()` when
    /// every question has a response.
    #[must_use]
    pub fn first_unanswered(&self, section: &Section) -> usize {
        (0..section.len())
            .find(|&i| !self.is_answered(section.name(), i))
            .unwrap_or(section.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResponseKey, &Response)> {
        self.responses.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn clear(&mut self) {
        self.responses.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn section() -> Section {
        Section::new(
            "Company",
            vec![
                ("a".to_owned(), None, None),
                ("b".to_owned(), None, None),
                ("c".to_owned(), None, None),
            ],
        )
    }

    #[test]
    fn first_unanswered_skips_answered_prefix_and_gaps() {
        let section = section();
        let mut store = ResponseStore::new();
        assert_eq!(store.first_unanswered(&section), 0);

        store.commit(ResponseKey::new("Company", 0), Response::skipped(fixed_now()));
        store.commit(ResponseKey::new("Company", 2), Response::skipped(fixed_now()));
        assert_eq!(store.first_unanswered(&section), 1);
        assert_eq!(store.answered_count(&section), 2);

        store.commit(ResponseKey::new("Company", 1), Response::skipped(fixed_now()));
        assert_eq!(store.first_unanswered(&section), 3);
    }

    #[test]
    fn stray_keys_do_not_inflate_answered_count() {
        let section = section();
        let mut store = ResponseStore::new();
        store.commit(ResponseKey::new("Company", 7), Response::skipped(fixed_now()));
        store.commit(ResponseKey::new("Other", 0), Response::skipped(fixed_now()));
        assert_eq!(store.answered_count(&section), 0);
    }

    #[test]
    fn update_answer_keeps_followups_and_refreshes_timestamp() {
        let mut store = ResponseStore::new();
        let key = ResponseKey::new("Company", 0);
        let followups = vec![FollowupAnswer::new("Which database?", "PostgreSQL")];
        store.commit(key.clone(), Response::new("SQL", followups.clone(), fixed_now()));

        let later = fixed_now() + Duration::minutes(3);
        let answer = AnswerText::parse("PostgreSQL 15 on RDS").unwrap();
        let updated = store.update_answer(&key, &answer, later).unwrap();

        assert_eq!(updated.answer(), "PostgreSQL 15 on RDS");
        assert_eq!(updated.followups(), followups.as_slice());
        assert_eq!(updated.answered_at(), later);
    }

    #[test]
    fn update_answer_requires_existing_response() {
        let mut store = ResponseStore::new();
        let answer = AnswerText::parse("x").unwrap();
        let err = store
            .update_answer(&ResponseKey::new("Company", 0), &answer, fixed_now())
            .unwrap_err();
        assert!(matches!(err, ResponseError::NotFound { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn skipped_response_uses_marker() {
        let response = Response::skipped(fixed_now());
        assert_eq!(response.answer(), "Skipped");
        assert!(response.is_skipped());
        assert!(response.followups().is_empty());
    }
}
