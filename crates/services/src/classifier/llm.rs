use async_trait::async_trait;
use tracing::debug;

use super::chat::ChatClient;
use super::parse::parse_verdict;
use super::{AdequacyClassifier, Verdict};
use crate::error::ClassifierError;

const NO_CONTEXT: &str = "No additional context provided";

/// Build the review prompt for one answer.
#[must_use]
pub fn build_prompt(question: &str, context: Option<&str>, answer: &str) -> String {
    let context = context.unwrap_or(NO_CONTEXT);
    format!(
        r#"You are helping with a Business Requirements Planning (BRP) questionnaire for an ERP implementation.

Question: {question}
Context: {context}
User's Answer: {answer}

Evaluate whether the user's answer is:
1. Clear and specific enough to answer the question
2. Relevant to the question asked
3. Detailed enough for ERP implementation planning

If the answer is adequate, respond with: "ADEQUATE"

If the answer needs clarification, respond with "NEEDS_FOLLOWUP" followed by 1-2 specific follow-up questions formatted as a JSON array.

Examples of answers that need follow-up:
- Vague answers like "SQL" when asked about database systems (which SQL database?)
- "Yes" or "No" without details when more context is needed
- Irrelevant or off-topic responses

Be strict but fair. Only mark an answer adequate if it provides the information needed for ERP planning."#
    )
}

/// Classifier backed by a chat completions model.
#[derive(Clone)]
pub struct LlmClassifier {
    chat: ChatClient,
}

impl LlmClassifier {
    #[must_use]
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.chat.enabled()
    }
}

#[async_trait]
impl AdequacyClassifier for LlmClassifier {
    async fn evaluate(
        &self,
        question: &str,
        context: Option<&str>,
        answer: &str,
    ) -> Result<Verdict, ClassifierError> {
        let prompt = build_prompt(question, context, answer);
        let reply = self.chat.complete(&prompt).await?;
        debug!(model = self.chat.model(), reply = %reply, "answer review reply");
        Ok(parse_verdict(&reply))
    }
}
