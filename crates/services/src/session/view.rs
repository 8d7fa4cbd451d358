use quiz_core::{GradingReport, GradingSummary, Question, QuestionOutcome};

use super::progress::SessionProgress;
use super::service::{QuizSession, SessionFailure, SessionPhase};

/// Presentation-agnostic projection of a session.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no layout or localization assumptions
///
/// Every phase maps to a renderable variant, and each terminal variant
/// carries enough for a single reset/retry affordance, so the UI always has
/// a forward path.
#[derive(Debug, PartialEq)]
pub enum SessionView<'a> {
    /// No questions were supplied.
    Empty,
    /// One question with its buffered answer.
    Question {
        question: &'a Question,
        answer: &'a str,
        progress: SessionProgress,
    },
    /// The grading call is outstanding.
    Grading,
    /// Aggregate score plus per-question outcomes aligned to the original set.
    Results(ResultsView<'a>),
    /// Grading failed; `raw_response` inside the failure is present for
    /// diagnostic display when the service replied with an unusable shape.
    Failed(&'a SessionFailure),
}

impl<'a> SessionView<'a> {
    /// Project the session into what should be rendered right now.
    #[must_use]
    pub fn project(session: &'a QuizSession) -> Self {
        match session.phase() {
            SessionPhase::Answering => match session.current_question() {
                Some(question) => Self::Question {
                    question,
                    answer: session.answer(session.current_index()).unwrap_or_default(),
                    progress: session.progress(),
                },
                None => Self::Empty,
            },
            SessionPhase::Submitting => Self::Grading,
            // Phase and payload are set together in `apply_grading`; the
            // fallbacks below are unreachable through the public API.
            SessionPhase::ResultReady => session
                .report()
                .map_or(Self::Grading, |report| {
                    Self::Results(ResultsView::new(session.questions(), report))
                }),
            SessionPhase::ResultError => {
                session.failure().map_or(Self::Grading, Self::Failed)
            }
        }
    }
}

/// Graded round, reconciled against the original question list.
#[derive(Debug, PartialEq)]
pub struct ResultsView<'a> {
    pub summary: &'a GradingSummary,
    /// Question count for display. Prefers the session's own list length
    /// over the service-claimed `total_questions`.
    pub total_questions: usize,
    pub items: Vec<ResultItemView<'a>>,
}

impl<'a> ResultsView<'a> {
    #[must_use]
    pub fn new(questions: &'a [Question], report: &'a GradingReport) -> Self {
        Self {
            summary: report.summary(),
            total_questions: questions.len(),
            items: reconcile(questions, report.outcomes()),
        }
    }
}

/// One per-question outcome paired with the question it grades.
#[derive(Debug, PartialEq)]
pub struct ResultItemView<'a> {
    /// 1-based display number.
    pub number: usize,
    pub outcome: &'a QuestionOutcome,
    /// The original question, when it could be matched.
    pub question: Option<&'a Question>,
}

/// Pair grading outcomes with the questions they grade.
///
/// Identifier match first; positional fallback when the service omitted or
/// mangled `question_id`. Never matched by prompt text.
fn reconcile<'a>(
    questions: &'a [Question],
    outcomes: &'a [QuestionOutcome],
) -> Vec<ResultItemView<'a>> {
    outcomes
        .iter()
        .enumerate()
        .map(|(index, outcome)| {
            let question = outcome
                .question_ref
                .as_ref()
                .and_then(|id| questions.iter().find(|question| question.id() == id))
                .or_else(|| questions.get(index));
            ResultItemView {
                number: index + 1,
                outcome,
                question,
            }
        })
        .collect()
}
