mod controller;
mod screen;
mod state;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{Notice, Outcome, SessionController};
pub use screen::{
    EditView, FollowupStep, FollowupView, QuestionView, Screen, ScreenKind, SelectionView,
    SummaryView,
};
pub use state::{ADDITIONAL_DETAILS_HEADER, FollowupState, Mode, SessionState, combined_answer};
pub use workflow::QuestionnaireService;
