mod grading;
mod ids;
mod question;

pub use grading::{AnswerRecord, GradingReport, GradingReportError, GradingSummary, QuestionOutcome};
pub use ids::QuestionId;
pub use question::{Question, QuestionKind};
