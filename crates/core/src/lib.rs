#![forbid(unsafe_code)]

pub mod model;
pub mod time;

pub use model::{
    AnswerRecord, GradingReport, GradingReportError, GradingSummary, Question, QuestionId,
    QuestionKind, QuestionOutcome,
};
pub use time::Clock;
