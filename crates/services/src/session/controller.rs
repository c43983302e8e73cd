use std::sync::Arc;

use tracing::{debug, info, warn};

use intake_core::Clock;
use intake_core::model::{
    AnswerText, FollowupAnswer, Progress, Question, QuestionBank, Report, Response, ResponseKey,
    ResponseStore, Section, SectionProgress,
};

use super::screen::{
    EditView, FollowupStep, FollowupView, QuestionView, Screen, ScreenKind, SelectionView,
    SummaryView,
};
use super::state::{FollowupState, Mode, SessionState};
use crate::classifier::{AdequacyClassifier, MAX_FOLLOWUPS, Verdict};
use crate::error::SessionError;

//
// ─── OUTCOME ───────────────────────────────────────────────────────────────────
//

/// Non-fatal message for the user produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The answer was accepted without review because the classifier failed.
    ClassifierUnavailable(String),
    SectionCompleted(String),
    AnswerSaved,
    AnswerUpdated,
}

/// What a transition did besides moving the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Response written by this transition, if any. At most one per action.
    pub committed: Option<ResponseKey>,
    pub notices: Vec<Notice>,
}

impl Outcome {
    fn none() -> Self {
        Self::default()
    }

    fn committed(key: ResponseKey) -> Self {
        Self {
            committed: Some(key),
            notices: Vec::new(),
        }
    }

    fn with_notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }
}

fn selection_view(progress: Progress) -> SelectionView {
    SelectionView {
        sections: progress.incomplete_sections().cloned().collect(),
        progress,
    }
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// State machine for one questionnaire session.
///
/// Owns the session cursor and the `ResponseStore`. Every action checks the
/// screen it belongs to and leaves state untouched when it is rejected.
pub struct SessionController {
    bank: Arc<QuestionBank>,
    store: ResponseStore,
    state: SessionState,
    clock: Clock,
    classifier: Arc<dyn AdequacyClassifier>,
}

impl SessionController {
    #[must_use]
    pub fn new(bank: Arc<QuestionBank>, classifier: Arc<dyn AdequacyClassifier>, clock: Clock) -> Self {
        Self::with_store(bank, ResponseStore::new(), classifier, clock)
    }

    /// Start from previously accepted responses.
    #[must_use]
    pub fn with_store(
        bank: Arc<QuestionBank>,
        store: ResponseStore,
        classifier: Arc<dyn AdequacyClassifier>,
        clock: Clock,
    ) -> Self {
        Self {
            bank,
            store,
            state: SessionState::new(),
            clock,
            classifier,
        }
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn store(&self) -> &ResponseStore {
        &self.store
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Progress recomputed from the store.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::compute(&self.bank, &self.store)
    }

    /// Export view of every question at the current instant.
    #[must_use]
    pub fn report(&self) -> Report {
        Report::build(&self.bank, &self.store, self.clock.now())
    }

    //
    // ─── SCREEN SELECTION ──────────────────────────────────────────────────────
    //

    /// Which screen applies right now, without side effects.
    #[must_use]
    pub fn screen_kind(&self) -> ScreenKind {
        if matches!(self.state.mode, Mode::Editing(_)) {
            return ScreenKind::Editing;
        }
        if self.progress().all_complete() {
            return ScreenKind::Summary;
        }
        let Some(section) = self.active_section() else {
            return ScreenKind::SectionSelection;
        };
        if self.state.active_index >= section.len() {
            return ScreenKind::SectionComplete;
        }
        match &self.state.mode {
            Mode::Followup(followup) if followup.is_exhausted() => ScreenKind::FollowupReview,
            Mode::Followup(_) => ScreenKind::Followup,
            _ => ScreenKind::MainQuestion,
        }
    }

    /// Select the screen to present.
    ///
    /// When the active section has run out of questions the section is
    /// closed here and [`Screen::SectionComplete`] is returned once; the next
    /// call shows section selection (or the summary).
    pub fn screen(&mut self) -> Screen {
        let progress = self.progress();
        match self.screen_kind() {
            ScreenKind::Editing => {
                if let Some(view) = self.edit_view() {
                    return Screen::Editing(view);
                }
                // Edit target no longer has a response.
                self.state.mode = Mode::Normal;
                self.screen()
            }
            ScreenKind::Summary => Screen::Summary(SummaryView { progress }),
            ScreenKind::SectionSelection => Screen::SectionSelection(selection_view(progress)),
            ScreenKind::SectionComplete => {
                let section = self.state.active_section.clone().unwrap_or_default();
                self.state.leave_section();
                debug!(%section, "section closed");
                Screen::SectionComplete { section }
            }
            ScreenKind::Followup | ScreenKind::FollowupReview => match self.followup_view() {
                Some(view) => Screen::Followup(view),
                None => Screen::SectionSelection(selection_view(progress)),
            },
            ScreenKind::MainQuestion => match self.question_view(progress) {
                Some(view) => Screen::MainQuestion(view),
                None => {
                    self.state.leave_section();
                    self.screen()
                }
            },
        }
    }

    fn active_section(&self) -> Option<&Section> {
        self.state
            .active_section
            .as_deref()
            .and_then(|name| self.bank.section(name))
    }

    fn current_question(&self) -> Result<&Question, SessionError> {
        let section = self.active_section().ok_or(SessionError::NoActiveSection)?;
        section
            .question(self.state.active_index)
            .ok_or(SessionError::NoActiveSection)
    }

    fn question_view(&self, progress: Progress) -> Option<QuestionView> {
        let section = self.active_section()?;
        let question = section.question(self.state.active_index)?.clone();
        Some(QuestionView {
            section: section.name().to_owned(),
            index: self.state.active_index,
            question,
            section_progress: SectionProgress::compute(section, &self.store),
            progress,
        })
    }

    fn followup_view(&self) -> Option<FollowupView> {
        let followup = self.state.mode.followup()?;
        let question = self.current_question().ok()?.clone();
        let step = match followup.current_question() {
            Some(text) => FollowupStep::Asking {
                index: followup.cursor(),
                total: followup.pending().len(),
                question: text.to_owned(),
            },
            None => FollowupStep::Exhausted {
                combined: followup.combined_answer(),
                collected: followup.collected().to_vec(),
            },
        };
        Some(FollowupView {
            section: self.state.active_section.clone()?,
            question,
            original: followup.original().to_owned(),
            step,
        })
    }

    fn edit_view(&self) -> Option<EditView> {
        let key = self.state.mode.edit_target()?;
        Some(EditView {
            key: key.clone(),
            question: self.bank.question(&key.section, key.index)?.clone(),
            response: self.store.get(key)?.clone(),
        })
    }

    fn require(&self, action: &'static str, allowed: &[ScreenKind]) -> Result<(), SessionError> {
        let screen = self.screen_kind();
        if allowed.contains(&screen) {
            Ok(())
        } else {
            Err(SessionError::InvalidAction {
                action,
                screen: screen.name(),
            })
        }
    }

    //
    // ─── SECTION SELECTION ─────────────────────────────────────────────────────
    //

    /// Open `name` at its first unanswered question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownSection` for names not in the bank and
    /// `SessionError::InvalidAction` outside section selection.
    pub fn start_section(&mut self, name: &str) -> Result<Outcome, SessionError> {
        self.require("start section", &[ScreenKind::SectionSelection])?;
        let section = self
            .bank
            .section(name)
            .ok_or_else(|| SessionError::UnknownSection(name.to_owned()))?;
        let index = self.store.first_unanswered(section);
        self.state.active_section = Some(section.name().to_owned());
        self.state.active_index = index;
        self.state.mode = Mode::Normal;
        debug!(section = name, index, "section started");
        Ok(Outcome::none())
    }

    //
    // ─── MAIN QUESTION ─────────────────────────────────────────────────────────
    //

    /// Submit an answer to the current question and have it reviewed.
    ///
    /// A classifier failure never blocks the user: the answer is accepted and
    /// a [`Notice::ClassifierUnavailable`] is returned.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Validation` for blank input and
    /// `SessionError::InvalidAction` outside the question screen.
    pub async fn submit(&mut self, raw: &str) -> Result<Outcome, SessionError> {
        self.require("submit", &[ScreenKind::MainQuestion])?;
        let answer = AnswerText::parse(raw)?;
        let question = self.current_question()?.clone();

        let verdict = self
            .classifier
            .evaluate(question.text(), question.context(), answer.as_str())
            .await;

        match verdict {
            Ok(Verdict::NeedsFollowup(questions)) => {
                let pending: Vec<String> = questions
                    .into_iter()
                    .map(|q| q.trim().to_owned())
                    .filter(|q| !q.is_empty())
                    .take(MAX_FOLLOWUPS)
                    .collect();
                if pending.is_empty() {
                    return self.commit_current(answer.into_inner(), Vec::new());
                }
                debug!(count = pending.len(), "entering follow-up");
                self.state.mode = Mode::Followup(FollowupState::new(answer, pending));
                Ok(Outcome::none())
            }
            Ok(Verdict::Adequate) => self.commit_current(answer.into_inner(), Vec::new()),
            Err(err) => {
                warn!(error = %err, "answer review failed, accepting answer");
                let outcome = self.commit_current(answer.into_inner(), Vec::new())?;
                Ok(outcome.with_notice(Notice::ClassifierUnavailable(err.to_string())))
            }
        }
    }

    /// Record the current question as skipped. Never consults the classifier.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidAction` outside the question screen.
    pub fn skip(&mut self) -> Result<Outcome, SessionError> {
        self.require("skip", &[ScreenKind::MainQuestion])?;
        let section = self
            .state
            .active_section
            .clone()
            .ok_or(SessionError::NoActiveSection)?;
        let key = ResponseKey::new(section, self.state.active_index);
        let was_complete = self.section_complete(&key.section);
        self.store.commit(key.clone(), Response::skipped(self.clock.now()));
        self.state.active_index += 1;
        info!(%key, "question skipped");
        Ok(self.completion_notice(Outcome::committed(key), was_complete))
    }

    /// Leave the active section, abandoning any follow-up in progress.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidAction` when no question is on screen.
    pub fn back_to_sections(&mut self) -> Result<Outcome, SessionError> {
        self.require(
            "back to sections",
            &[
                ScreenKind::MainQuestion,
                ScreenKind::Followup,
                ScreenKind::FollowupReview,
            ],
        )?;
        self.state.leave_section();
        debug!("back to section selection");
        Ok(Outcome::none())
    }

    //
    // ─── FOLLOW-UP ─────────────────────────────────────────────────────────────
    //

    /// Answer the current follow-up question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Validation` for blank input and
    /// `SessionError::InvalidAction` when no follow-up is being asked.
    pub fn followup_next(&mut self, raw: &str) -> Result<Outcome, SessionError> {
        self.require("next", &[ScreenKind::Followup])?;
        let answer = AnswerText::parse(raw)?;
        if let Mode::Followup(followup) = &mut self.state.mode {
            followup.record(answer);
            debug!(cursor = followup.cursor(), "follow-up answered");
        }
        Ok(Outcome::none())
    }

    /// Accept the original answer as-is and drop the remaining follow-ups.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidAction` when no follow-up is being asked.
    pub fn use_original(&mut self) -> Result<Outcome, SessionError> {
        self.require("use original", &[ScreenKind::Followup])?;
        let Mode::Followup(followup) = std::mem::take(&mut self.state.mode) else {
            return Err(SessionError::NoActiveSection);
        };
        let (original, _) = followup.into_parts();
        self.commit_current(original, Vec::new())
    }

    /// Commit the combined answer together with the follow-up history.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidAction` unless every follow-up is answered.
    pub fn accept_final(&mut self) -> Result<Outcome, SessionError> {
        self.require("accept", &[ScreenKind::FollowupReview])?;
        let Mode::Followup(followup) = std::mem::take(&mut self.state.mode) else {
            return Err(SessionError::NoActiveSection);
        };
        let combined = followup.combined_answer();
        let (_, collected) = followup.into_parts();
        self.commit_current(combined, collected)
    }

    /// Discard the follow-up attempt and ask the same question again.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidAction` unless every follow-up is answered.
    pub fn start_over(&mut self) -> Result<Outcome, SessionError> {
        self.require("start over", &[ScreenKind::FollowupReview])?;
        self.state.mode = Mode::Normal;
        debug!(index = self.state.active_index, "follow-up discarded");
        Ok(Outcome::none())
    }

    //
    // ─── EDITING ───────────────────────────────────────────────────────────────
    //

    /// Open an answered question for editing.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoResponse` when `key` has no response and
    /// `SessionError::InvalidAction` outside the summary screen.
    pub fn request_edit(&mut self, key: ResponseKey) -> Result<Outcome, SessionError> {
        self.require("edit", &[ScreenKind::Summary])?;
        if self.store.get(&key).is_none() {
            return Err(SessionError::NoResponse(key));
        }
        debug!(%key, "editing");
        self.state.mode = Mode::Editing(key);
        Ok(Outcome::none())
    }

    /// Overwrite the edited answer. Follow-up history is kept and the
    /// classifier is not consulted.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Validation` for blank input and
    /// `SessionError::InvalidAction` outside the editing screen.
    pub fn save_edit(&mut self, raw: &str) -> Result<Outcome, SessionError> {
        self.require("save changes", &[ScreenKind::Editing])?;
        let answer = AnswerText::parse(raw)?;
        let Some(key) = self.state.mode.edit_target().cloned() else {
            return Err(SessionError::InvalidAction {
                action: "save changes",
                screen: self.screen_kind().name(),
            });
        };
        self.store
            .update_answer(&key, &answer, self.clock.now())
            .map_err(|_| SessionError::NoResponse(key.clone()))?;
        self.state.mode = Mode::Normal;
        info!(%key, "response edited");
        Ok(Outcome::committed(key).with_notice(Notice::AnswerUpdated))
    }

    /// Leave editing without changing anything.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidAction` outside the editing screen.
    pub fn cancel_edit(&mut self) -> Result<Outcome, SessionError> {
        self.require("cancel", &[ScreenKind::Editing])?;
        self.state.mode = Mode::Normal;
        Ok(Outcome::none())
    }

    //
    // ─── RESET ─────────────────────────────────────────────────────────────────
    //

    /// Drop every response and return to section selection. The bank stays
    /// loaded. Available on every screen.
    pub fn restart(&mut self) -> Outcome {
        self.store.clear();
        self.state.reset();
        info!("session restarted");
        Outcome::none()
    }

    //
    // ─── COMMIT ────────────────────────────────────────────────────────────────
    //

    fn section_complete(&self, name: &str) -> bool {
        self.bank
            .section(name)
            .is_some_and(|s| SectionProgress::compute(s, &self.store).is_complete())
    }

    fn completion_notice(&self, outcome: Outcome, was_complete: bool) -> Outcome {
        let Some(key) = outcome.committed.clone() else {
            return outcome;
        };
        if !was_complete && self.section_complete(&key.section) {
            info!(section = %key.section, "section completed");
            outcome.with_notice(Notice::SectionCompleted(key.section))
        } else {
            outcome
        }
    }

    fn commit_current(
        &mut self,
        answer: String,
        followups: Vec<FollowupAnswer>,
    ) -> Result<Outcome, SessionError> {
        let section = self
            .state
            .active_section
            .clone()
            .ok_or(SessionError::NoActiveSection)?;
        let key = ResponseKey::new(section, self.state.active_index);
        let was_complete = self.section_complete(&key.section);
        self.store.commit(
            key.clone(),
            Response::new(answer, followups, self.clock.now()),
        );
        self.state.mode = Mode::Normal;
        self.state.active_index += 1;
        info!(%key, "response committed");
        let outcome = Outcome::committed(key).with_notice(Notice::AnswerSaved);
        Ok(self.completion_notice(outcome, was_complete))
    }
}
