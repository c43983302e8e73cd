mod answer;
mod bank;
mod progress;
mod question;
mod report;
mod response;

pub use answer::{AnswerError, AnswerText};
pub use bank::{BankError, WRAPPER_KEY, display_section_name, section_description};
pub use progress::{Progress, SectionProgress, SectionStatus};
pub use question::{Question, QuestionBank, Section};
pub use report::{NOT_ANSWERED, Report, ReportEntry, ReportSection};
pub use response::{
    FollowupAnswer, Response, ResponseError, ResponseKey, ResponseStore, SKIPPED_ANSWER,
};
