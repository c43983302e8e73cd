use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("please provide an answer before continuing")]
    Empty,
}

/// Free-text answer that is known to contain non-whitespace content.
///
/// The stored value is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnswerText(String);

impl AnswerText {
    /// Validate raw input from a text field.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::Empty` when the input is empty or whitespace only.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, AnswerError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AnswerError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for AnswerText {
    type Error = AnswerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<AnswerText> for String {
    fn from(value: AnswerText) -> Self {
        value.0
    }
}

impl AsRef<str> for AnswerText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_input() {
        assert_eq!(AnswerText::parse("").unwrap_err(), AnswerError::Empty);
        assert_eq!(AnswerText::parse("  \n\t ").unwrap_err(), AnswerError::Empty);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let answer = AnswerText::parse("  PostgreSQL 15\n").unwrap();
        assert_eq!(answer.as_str(), "PostgreSQL 15");
    }
}
