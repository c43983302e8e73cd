use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use intake_core::model::ResponseKey;
use services::{Notice, Outcome, QuestionnaireService, Screen, SessionController, SessionError};

/// A discrete user trigger, already carrying any text the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    StartSection(String),
    Submit(String),
    Skip,
    BackToSections,
    FollowupNext(String),
    UseOriginal,
    AcceptFinal,
    StartOver,
    RequestEdit(ResponseKey),
    SaveEdit(String),
    CancelEdit,
    /// Dismiss a transient screen.
    Acknowledge,
    Export,
    Restart,
    Quit,
}

/// What the questionnaire needs from a front end.
pub trait Ui {
    /// Show `screen` and wait for the user's next trigger.
    ///
    /// # Errors
    ///
    /// Returns an error when the front end can no longer read input.
    fn present(&mut self, screen: &Screen, session: &SessionController) -> Result<Action>;

    fn notify(&mut self, notice: &Notice);

    /// Report a recoverable problem; the same screen is shown again.
    fn problem(&mut self, message: &str);

    fn exported(&mut self, path: &Path);
}

/// Redraw, read a trigger, apply it, persist. Returns when the user quits.
pub struct Driver {
    service: QuestionnaireService,
    report_dir: PathBuf,
}

impl Driver {
    #[must_use]
    pub fn new(service: QuestionnaireService, report_dir: PathBuf) -> Self {
        Self {
            service,
            report_dir,
        }
    }

    /// Run the interactive loop until [`Action::Quit`].
    ///
    /// # Errors
    ///
    /// Only UI failures end the loop with an error; session and storage
    /// errors are reported through [`Ui::problem`].
    pub async fn run<U: Ui>(&self, ui: &mut U, session: &mut SessionController) -> Result<()> {
        loop {
            let screen = session.screen();
            let action = ui.present(&screen, session)?;
            debug!(?action, screen = screen.kind().name(), "action");

            let result = match action {
                Action::Quit => return Ok(()),
                Action::Acknowledge => Ok(Outcome::default()),
                Action::Export => {
                    match self.service.export(session, &self.report_dir) {
                        Ok(path) => ui.exported(&path),
                        Err(err) => ui.problem(&err.to_string()),
                    }
                    continue;
                }
                Action::Restart => self.service.restart(session).await,
                Action::StartSection(name) => session.start_section(&name),
                Action::Submit(text) => session.submit(&text).await,
                Action::Skip => session.skip(),
                Action::BackToSections => session.back_to_sections(),
                Action::FollowupNext(text) => session.followup_next(&text),
                Action::UseOriginal => session.use_original(),
                Action::AcceptFinal => session.accept_final(),
                Action::StartOver => session.start_over(),
                Action::RequestEdit(key) => session.request_edit(key),
                Action::SaveEdit(text) => session.save_edit(&text),
                Action::CancelEdit => session.cancel_edit(),
            };

            match result {
                Ok(outcome) => {
                    if let Err(err) = self.service.persist(session, &outcome).await {
                        warn!(error = %err, "failed to persist response");
                        ui.problem(&format!("answer kept for this session but not saved: {err}"));
                    }
                    for notice in &outcome.notices {
                        ui.notify(notice);
                    }
                }
                Err(err @ SessionError::Storage(_)) => {
                    warn!(error = %err, "storage failure");
                    ui.problem(&err.to_string());
                }
                Err(err) => ui.problem(&err.to_string()),
            }
        }
    }
}
