#![forbid(unsafe_code)]

pub mod classifier;
pub mod error;
pub mod report;
pub mod session;

pub use intake_core::Clock;

pub use classifier::{AdequacyClassifier, AlwaysAdequate, ChatClient, ChatConfig, LlmClassifier, Verdict};
pub use error::{ClassifierError, ReportError, SessionError};
pub use session::{Notice, Outcome, QuestionnaireService, Screen, ScreenKind, SessionController};
