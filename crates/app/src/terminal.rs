use std::path::Path;

use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Editor, Select};

use intake_core::model::{
    NOT_ANSWERED, Progress, ResponseKey, SectionProgress, SectionStatus, section_description,
};
use services::session::{EditView, FollowupStep, FollowupView, QuestionView, SelectionView};
use services::{Notice, Screen, SessionController};

use crate::driver::{Action, Ui};

/// Interactive front end on the controlling terminal.
pub struct TerminalUi {
    term: Term,
    theme: ColorfulTheme,
}

impl TerminalUi {
    #[must_use]
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            theme: ColorfulTheme::default(),
        }
    }

    fn choose(&self, prompt: &str, items: &[&str]) -> Result<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_on(&self.term)?)
    }

    /// Open the user's editor for a multi-line answer.
    ///
    /// `None` when the editor was closed without saving.
    fn read_text(prompt: &str, initial: &str) -> Result<Option<String>> {
        println!(
            "{} {}",
            style(prompt).bold(),
            style("(opens your editor, save and close to continue)").dim()
        );
        let edited = Editor::new().extension(".txt").edit(initial)?;
        Ok(edited.map(|text| strip_trailing_newlines(&text).to_owned()))
    }

    fn confirm_restart(&self) -> Result<Action> {
        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt("Discard every answer and start again?")
            .default(false)
            .interact_on(&self.term)?;
        Ok(if confirmed {
            Action::Restart
        } else {
            Action::Acknowledge
        })
    }

    fn header(progress: &Progress) {
        println!();
        println!(
            "{}",
            style("Business Requirements Planning Questionnaire").bold().cyan()
        );
        println!(
            "{}",
            style(format!(
                "Overall progress: {}/{} questions ({:.0}%)",
                progress.answered,
                progress.total,
                progress.ratio() * 100.0
            ))
            .dim()
        );
        for section in &progress.sections {
            println!("  {}", section_line(section));
        }
        println!();
    }

    fn section_selection(&self, view: &SelectionView) -> Result<Action> {
        Self::header(&view.progress);
        let rows: Vec<String> = view
            .sections
            .iter()
            .map(|s| {
                format!(
                    "{} ({}/{}) - Questions about {}",
                    s.name,
                    s.answered,
                    s.total,
                    section_description(&s.name)
                )
            })
            .collect();
        let mut items: Vec<&str> = rows.iter().map(String::as_str).collect();
        items.extend(["Restart", "Quit"]);

        let choice = self.choose("Select a section", &items)?;
        Ok(match view.sections.get(choice) {
            Some(section) => Action::StartSection(section.name.clone()),
            None if choice == rows.len() => self.confirm_restart()?,
            None => Action::Quit,
        })
    }

    fn main_question(&self, view: &QuestionView) -> Result<Action> {
        Self::header(&view.progress);
        println!(
            "{}  {}",
            style(&view.section).bold(),
            style(format!(
                "Question {} of {}",
                view.index + 1,
                view.section_progress.total
            ))
            .dim()
        );
        println!();
        println!("{}", style(view.question.text()).bold());
        if let Some(context) = view.question.context() {
            println!("{}", style(context).italic().dim());
        }
        if let Some(category) = view.question.category() {
            println!("{}", style(format!("Category: {category}")).dim());
        }
        println!();

        match self.choose(
            "What next?",
            &["Answer", "Skip", "Back to sections", "Restart", "Quit"],
        )? {
            0 => Ok(text_action(
                Self::read_text("Your answer", "")?,
                Action::Submit,
                Action::Acknowledge,
            )),
            1 => Ok(Action::Skip),
            2 => Ok(Action::BackToSections),
            3 => self.confirm_restart(),
            _ => Ok(Action::Quit),
        }
    }

    fn followup(&self, view: &FollowupView, progress: &Progress) -> Result<Action> {
        Self::header(progress);
        println!("{}", style(&view.section).bold());
        println!("{}", style(view.question.text()).bold());
        println!("{} {}", style("Your answer:").dim(), view.original);
        println!();

        match &view.step {
            FollowupStep::Asking {
                index,
                total,
                question,
            } => {
                println!(
                    "{} {}",
                    style(format!("Follow-up {} of {}:", index + 1, total)).yellow(),
                    question
                );
                match self.choose(
                    "What next?",
                    &["Answer follow-up", "Use my original answer", "Back to sections", "Quit"],
                )? {
                    0 => Ok(text_action(
                        Self::read_text("Follow-up answer", "")?,
                        Action::FollowupNext,
                        Action::Acknowledge,
                    )),
                    1 => Ok(Action::UseOriginal),
                    2 => Ok(Action::BackToSections),
                    _ => Ok(Action::Quit),
                }
            }
            FollowupStep::Exhausted { combined, .. } => {
                println!("{}", style("Final answer:").green());
                println!("{combined}");
                println!();
                match self.choose(
                    "Save this answer?",
                    &["Accept final answer", "Start over", "Back to sections", "Quit"],
                )? {
                    0 => Ok(Action::AcceptFinal),
                    1 => Ok(Action::StartOver),
                    2 => Ok(Action::BackToSections),
                    _ => Ok(Action::Quit),
                }
            }
        }
    }

    fn section_complete(&self, section: &str) -> Result<Action> {
        println!(
            "{}",
            style(format!("Section \"{section}\" complete")).green().bold()
        );
        match self.choose("Continue", &["Back to sections", "Quit"])? {
            0 => Ok(Action::Acknowledge),
            _ => Ok(Action::Quit),
        }
    }

    fn summary(&self, progress: &Progress, session: &SessionController) -> Result<Action> {
        Self::header(progress);
        println!("{}", style("All sections complete").green().bold());
        for section in session.bank().sections() {
            println!();
            println!("{}", style(section.name()).bold().underlined());
            for question in section.questions() {
                let answer = session
                    .store()
                    .get_at(section.name(), question.index())
                    .map_or(NOT_ANSWERED, |r| r.answer());
                println!("  {} {}", style(format!("{}.", question.index() + 1)).dim(), question.text());
                println!("     {answer}");
            }
        }
        println!();

        match self.choose(
            "What next?",
            &["Edit an answer", "Export report", "Restart", "Quit"],
        )? {
            0 => self.pick_edit_target(session),
            1 => Ok(Action::Export),
            2 => self.confirm_restart(),
            _ => Ok(Action::Quit),
        }
    }

    fn pick_edit_target(&self, session: &SessionController) -> Result<Action> {
        let sections = session.bank().sections();
        let names: Vec<&str> = sections.iter().map(|s| s.name()).collect();
        let section = &sections[self.choose("Section", &names)?];

        let answered: Vec<_> = section
            .questions()
            .iter()
            .filter(|q| session.store().is_answered(section.name(), q.index()))
            .collect();
        if answered.is_empty() {
            return Ok(Action::Acknowledge);
        }
        let labels: Vec<&str> = answered.iter().map(|q| q.text()).collect();
        let question = answered[self.choose("Question", &labels)?];
        Ok(Action::RequestEdit(ResponseKey::new(
            section.name(),
            question.index(),
        )))
    }

    fn editing(&self, view: &EditView) -> Result<Action> {
        println!();
        println!("{}", style(format!("Editing {}", view.key)).bold().cyan());
        println!("{}", style(view.question.text()).bold());
        println!("{} {}", style("Current answer:").dim(), view.response.answer());
        if !view.response.followups().is_empty() {
            println!("{}", style("Follow-up history:").dim());
            for followup in view.response.followups() {
                println!("  {} {}", style(&followup.question).dim(), followup.answer);
            }
        }
        println!();

        match self.choose("What next?", &["Edit answer", "Cancel"])? {
            0 => Ok(text_action(
                Self::read_text("New answer", view.response.answer())?,
                Action::SaveEdit,
                Action::CancelEdit,
            )),
            _ => Ok(Action::CancelEdit),
        }
    }
}

/// Map editor output to an action; closing without saving yields `on_close`.
fn text_action(edited: Option<String>, on_text: fn(String) -> Action, on_close: Action) -> Action {
    edited.map_or(on_close, on_text)
}

fn strip_trailing_newlines(text: &str) -> &str {
    text.trim_end_matches(['\n', '\r'])
}

fn status_marker(status: SectionStatus) -> &'static str {
    match status {
        SectionStatus::Complete => "✅",
        SectionStatus::InProgress => "🔄",
        SectionStatus::NotStarted => "⭕",
    }
}

fn section_line(section: &SectionProgress) -> String {
    format!(
        "{} {} {}/{} ({:.0}%)",
        status_marker(section.status()),
        section.name,
        section.answered,
        section.total,
        section.ratio() * 100.0
    )
}

impl Default for TerminalUi {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui for TerminalUi {
    fn present(&mut self, screen: &Screen, session: &SessionController) -> Result<Action> {
        match screen {
            Screen::Summary(view) => self.summary(&view.progress, session),
            Screen::Editing(view) => self.editing(view),
            Screen::SectionSelection(view) => self.section_selection(view),
            Screen::SectionComplete { section } => self.section_complete(section),
            Screen::Followup(view) => self.followup(view, &session.progress()),
            Screen::MainQuestion(view) => self.main_question(view),
        }
    }

    fn notify(&mut self, notice: &Notice) {
        match notice {
            Notice::ClassifierUnavailable(reason) => println!(
                "{} {}",
                style("Answer review unavailable, answer accepted as-is:").yellow(),
                reason
            ),
            Notice::SectionCompleted(section) => {
                println!("{}", style(format!("Completed {section}")).green());
            }
            Notice::AnswerSaved => println!("{}", style("Answer saved").green()),
            Notice::AnswerUpdated => println!("{}", style("Answer updated").green()),
        }
    }

    fn problem(&mut self, message: &str) {
        println!("{} {message}", style("!").red().bold());
    }

    fn exported(&mut self, path: &Path) {
        println!(
            "{} {}",
            style("Report written to").green(),
            style(path.display()).bold()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_text_keeps_inner_lines() {
        let combined = "SQL\n\nAdditional Details:\nWhich database?: PostgreSQL 16\n";
        let action = text_action(
            Some(strip_trailing_newlines(combined).to_owned()),
            Action::SaveEdit,
            Action::CancelEdit,
        );
        assert_eq!(
            action,
            Action::SaveEdit("SQL\n\nAdditional Details:\nWhich database?: PostgreSQL 16".into())
        );
    }

    #[test]
    fn closing_the_editor_without_saving_cancels() {
        assert_eq!(
            text_action(None, Action::SaveEdit, Action::CancelEdit),
            Action::CancelEdit
        );
        assert_eq!(
            text_action(None, Action::Submit, Action::Acknowledge),
            Action::Acknowledge
        );
    }

    #[test]
    fn section_lines_show_status_and_counts() {
        let line = |answered| {
            section_line(&SectionProgress {
                name: "Company".into(),
                answered,
                total: 4,
            })
        };
        assert_eq!(line(0), "⭕ Company 0/4 (0%)");
        assert_eq!(line(1), "🔄 Company 1/4 (25%)");
        assert_eq!(line(4), "✅ Company 4/4 (100%)");
    }
}
