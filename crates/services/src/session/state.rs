use intake_core::model::{AnswerText, FollowupAnswer, ResponseKey};

/// Header placed between the original answer and the follow-up lines of a
/// combined answer.
pub const ADDITIONAL_DETAILS_HEADER: &str = "Additional Details:";

/// Merge an original answer with its follow-up answers.
///
/// One `<question>: <answer>` line per follow-up, in collection order.
#[must_use]
pub fn combined_answer(original: &str, followups: &[FollowupAnswer]) -> String {
    let details = followups
        .iter()
        .map(|f| format!("{}: {}", f.question, f.answer))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{original}\n\n{ADDITIONAL_DETAILS_HEADER}\n{details}")
}

/// Sub-state of the follow-up dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowupState {
    original: String,
    pending: Vec<String>,
    collected: Vec<FollowupAnswer>,
    cursor: usize,
}

impl FollowupState {
    pub(crate) fn new(original: AnswerText, pending: Vec<String>) -> Self {
        Self {
            original: original.into_inner(),
            pending,
            collected: Vec::new(),
            cursor: 0,
        }
    }

    /// The answer that triggered the follow-ups.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[must_use]
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    #[must_use]
    pub fn collected(&self) -> &[FollowupAnswer] {
        &self.collected
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Follow-up currently being asked; `None` once all have been answered.
    #[must_use]
    pub fn current_question(&self) -> Option<&str> {
        self.pending.get(self.cursor).map(String::as_str)
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.pending.len()
    }

    #[must_use]
    pub fn combined_answer(&self) -> String {
        combined_answer(&self.original, &self.collected)
    }

    /// Record the answer to the current follow-up and move to the next one.
    pub(crate) fn record(&mut self, answer: AnswerText) {
        if let Some(question) = self.pending.get(self.cursor) {
            self.collected
                .push(FollowupAnswer::new(question.clone(), answer.into_inner()));
            self.cursor += 1;
        }
    }

    pub(crate) fn into_parts(self) -> (String, Vec<FollowupAnswer>) {
        (self.original, self.collected)
    }
}

/// What the active question is doing. Exactly one mode holds at a time and
/// sub-state only exists inside its own variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    Followup(FollowupState),
    Editing(ResponseKey),
}

impl Mode {
    #[must_use]
    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }

    #[must_use]
    pub fn followup(&self) -> Option<&FollowupState> {
        match self {
            Self::Followup(state) => Some(state),
            _ => None,
        }
    }

    #[must_use]
    pub fn edit_target(&self) -> Option<&ResponseKey> {
        match self {
            Self::Editing(key) => Some(key),
            _ => None,
        }
    }
}

/// Cursor state of a single questionnaire session.
///
/// Which questions are answered and which sections are complete is never
/// cached here; both come from the `ResponseStore`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) active_section: Option<String>,
    pub(crate) active_index: usize,
    pub(crate) mode: Mode,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn active_section(&self) -> Option<&str> {
        self.active_section.as_deref()
    }

    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    #[must_use]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub(crate) fn leave_section(&mut self) {
        self.active_section = None;
        self.active_index = 0;
        if !matches!(self.mode, Mode::Editing(_)) {
            self.mode = Mode::Normal;
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(raw: &str) -> AnswerText {
        AnswerText::parse(raw).unwrap()
    }

    #[test]
    fn combined_answer_keeps_collection_order() {
        let combined = combined_answer(
            "A",
            &[FollowupAnswer::new("Q1", "R1"), FollowupAnswer::new("Q2", "R2")],
        );
        assert_eq!(combined, "A\n\nAdditional Details:\nQ1: R1\nQ2: R2");
        let lines: Vec<_> = combined.lines().collect();
        assert_eq!(&lines[lines.len() - 2..], ["Q1: R1", "Q2: R2"]);
    }

    #[test]
    fn followup_state_walks_pending_questions() {
        let mut state = FollowupState::new(
            answer("SQL"),
            vec!["Which vendor?".into(), "Which version?".into()],
        );
        assert_eq!(state.current_question(), Some("Which vendor?"));
        assert!(!state.is_exhausted());

        state.record(answer(" Postgres "));
        assert_eq!(state.cursor(), 1);
        assert_eq!(state.current_question(), Some("Which version?"));

        state.record(answer("16"));
        assert!(state.is_exhausted());
        assert_eq!(state.current_question(), None);
        assert_eq!(
            state.collected(),
            [
                FollowupAnswer::new("Which vendor?", "Postgres"),
                FollowupAnswer::new("Which version?", "16"),
            ]
        );

        state.record(answer("ignored"));
        assert_eq!(state.collected().len(), 2);
    }

    #[test]
    fn leaving_a_section_drops_followup_state() {
        let mut state = SessionState {
            active_section: Some("Company".into()),
            active_index: 1,
            mode: Mode::Followup(FollowupState::new(answer("x"), vec!["y?".into()])),
        };
        state.leave_section();
        assert_eq!(state, SessionState::new());
    }
}
