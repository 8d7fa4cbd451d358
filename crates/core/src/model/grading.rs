use thiserror::Error;

use crate::model::{Question, QuestionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GradingReportError {
    #[error("score percentage is not a finite number")]
    InvalidPercentage,
}

/// One question paired with the learner's buffered answer.
///
/// This is the unit of a grading batch; the reference answer travels with it
/// so the grading service can score without re-fetching the question set.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    pub question: Question,
    pub user_answer: String,
}

/// Aggregate score block of a grading response.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingSummary {
    score_percentage: f64,
    total_correct: u32,
    total_questions: u32,
    overall_feedback: String,
}

impl GradingSummary {
    /// Build a summary from the service's aggregate fields.
    ///
    /// # Errors
    ///
    /// Returns `GradingReportError::InvalidPercentage` if the percentage is
    /// NaN or infinite.
    pub fn new(
        score_percentage: f64,
        total_correct: u32,
        total_questions: u32,
        overall_feedback: impl Into<String>,
    ) -> Result<Self, GradingReportError> {
        if !score_percentage.is_finite() {
            return Err(GradingReportError::InvalidPercentage);
        }

        Ok(Self {
            score_percentage,
            total_correct,
            total_questions,
            overall_feedback: overall_feedback.into(),
        })
    }

    #[must_use]
    pub fn score_percentage(&self) -> f64 {
        self.score_percentage
    }

    #[must_use]
    pub fn total_correct(&self) -> u32 {
        self.total_correct
    }

    /// Question count as claimed by the grading service.
    ///
    /// May disagree with the submitted count; display code should prefer the
    /// session's own question list length.
    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn overall_feedback(&self) -> &str {
        &self.overall_feedback
    }
}

/// Per-question verdict from the grading service.
///
/// `question_ref` is optional: some service versions omit or mangle
/// identifiers, in which case outcomes are paired with questions by position.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionOutcome {
    pub question_ref: Option<QuestionId>,
    pub is_correct: bool,
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub feedback: String,
    pub explanation: Option<String>,
}

/// Normalized result of grading one submitted batch.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingReport {
    summary: GradingSummary,
    outcomes: Vec<QuestionOutcome>,
}

impl GradingReport {
    #[must_use]
    pub fn new(summary: GradingSummary, outcomes: Vec<QuestionOutcome>) -> Self {
        Self { summary, outcomes }
    }

    #[must_use]
    pub fn summary(&self) -> &GradingSummary {
        &self.summary
    }

    /// Per-question outcomes in service order; may be empty, in which case
    /// only the aggregate is shown.
    #[must_use]
    pub fn outcomes(&self) -> &[QuestionOutcome] {
        &self.outcomes
    }
}
