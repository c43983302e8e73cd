//! Answer adequacy review.
//!
//! The session only ever sees a [`Verdict`]. Prompting and the tolerant
//! parsing of free-form model output stay inside this module.

mod chat;
mod llm;
mod parse;

use async_trait::async_trait;

use crate::error::ClassifierError;

pub use chat::{ChatClient, ChatConfig};
pub use llm::{LlmClassifier, build_prompt};
pub use parse::{ADEQUATE_MARKER, FOLLOWUP_MARKER, parse_verdict};

/// Most follow-up questions asked for a single answer.
pub const MAX_FOLLOWUPS: usize = 2;

/// Outcome of reviewing one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Adequate,
    NeedsFollowup(Vec<String>),
}

impl Verdict {
    /// Build a follow-up verdict from candidate questions.
    ///
    /// Blank candidates are dropped and at most [`MAX_FOLLOWUPS`] are kept.
    /// With nothing left to ask the answer is treated as adequate.
    #[must_use]
    pub fn needs_followup<I, S>(questions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let questions: Vec<String> = questions
            .into_iter()
            .map(Into::into)
            .map(|q| q.trim().to_owned())
            .filter(|q| !q.is_empty())
            .take(MAX_FOLLOWUPS)
            .collect();
        if questions.is_empty() {
            Self::Adequate
        } else {
            Self::NeedsFollowup(questions)
        }
    }

    #[must_use]
    pub fn is_adequate(&self) -> bool {
        matches!(self, Self::Adequate)
    }
}

/// Judges whether an answer is specific enough, possibly proposing
/// follow-up questions.
#[async_trait]
pub trait AdequacyClassifier: Send + Sync {
    /// Review `answer` to `question`.
    ///
    /// # Errors
    ///
    /// Returns `ClassifierError` when the review cannot be obtained.
    async fn evaluate(
        &self,
        question: &str,
        context: Option<&str>,
        answer: &str,
    ) -> Result<Verdict, ClassifierError>;
}

/// Accepts every answer without a network call. Used in offline mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAdequate;

#[async_trait]
impl AdequacyClassifier for AlwaysAdequate {
    async fn evaluate(
        &self,
        _question: &str,
        _context: Option<&str>,
        _answer: &str,
    ) -> Result<Verdict, ClassifierError> {
        Ok(Verdict::Adequate)
    }
}
