use intake_core::model::{FollowupAnswer, Progress, Question, Response, ResponseKey, SectionProgress};

/// Discriminant of [`Screen`], used to check which actions are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Summary,
    Editing,
    SectionSelection,
    SectionComplete,
    Followup,
    FollowupReview,
    MainQuestion,
}

impl ScreenKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Editing => "editing",
            Self::SectionSelection => "section selection",
            Self::SectionComplete => "section complete",
            Self::Followup => "follow-up",
            Self::FollowupReview => "follow-up review",
            Self::MainQuestion => "question",
        }
    }
}

/// The single screen the UI should present.
///
/// Views are owned snapshots; they never borrow the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Summary(SummaryView),
    Editing(EditView),
    SectionSelection(SelectionView),
    SectionComplete { section: String },
    Followup(FollowupView),
    MainQuestion(QuestionView),
}

impl Screen {
    #[must_use]
    pub fn kind(&self) -> ScreenKind {
        match self {
            Self::Summary(_) => ScreenKind::Summary,
            Self::Editing(_) => ScreenKind::Editing,
            Self::SectionSelection(_) => ScreenKind::SectionSelection,
            Self::SectionComplete { .. } => ScreenKind::SectionComplete,
            Self::Followup(view) => match view.step {
                FollowupStep::Asking { .. } => ScreenKind::Followup,
                FollowupStep::Exhausted { .. } => ScreenKind::FollowupReview,
            },
            Self::MainQuestion(_) => ScreenKind::MainQuestion,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryView {
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditView {
    pub key: ResponseKey,
    pub question: Question,
    pub response: Response,
}

/// Sections still open for answering, with counts.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionView {
    pub sections: Vec<SectionProgress>,
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub section: String,
    pub index: usize,
    pub question: Question,
    pub section_progress: SectionProgress,
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FollowupView {
    pub section: String,
    pub question: Question,
    pub original: String,
    pub step: FollowupStep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowupStep {
    /// Asking follow-up `index` of `total`.
    Asking {
        index: usize,
        total: usize,
        question: String,
    },
    /// Every follow-up answered; the combined answer awaits acceptance.
    Exhausted {
        combined: String,
        collected: Vec<FollowupAnswer>,
    },
}
