use serde::{Deserialize, Serialize};

use crate::model::QuestionId;

//
// ─── QUESTION KIND ─────────────────────────────────────────────────────────────
//

/// Kind of answer a question expects.
///
/// Generators occasionally emit kinds this crate does not know about. Those are
/// preserved verbatim in `Other` so they can be rendered as unsupported instead
/// of being rejected at parse time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionKind {
    MultipleChoice,
    ShortAnswer,
    Other(String),
}

impl QuestionKind {
    /// The wire spelling of this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::ShortAnswer => "short_answer",
            Self::Other(kind) => kind,
        }
    }

    /// Returns true for kinds this crate knows how to answer.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for QuestionKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "multiple_choice" => Self::MultipleChoice,
            "short_answer" => Self::ShortAnswer,
            _ => Self::Other(kind),
        }
    }
}

impl From<QuestionKind> for String {
    fn from(kind: QuestionKind) -> Self {
        kind.as_str().to_owned()
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single quiz question as supplied by the question source.
///
/// Immutable once constructed; the session never edits questions, only pairs
/// them with answers. Serde names follow the generator's wire format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    #[serde(rename = "question")]
    prompt: String,
    #[serde(rename = "type")]
    kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
    correct_answer: String,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default, rename = "document_name", skip_serializing_if = "Option::is_none")]
    source_label: Option<String>,
}

impl Question {
    /// Creates a new `Question` with no options, explanation, or source label.
    #[must_use]
    pub fn new(
        id: impl Into<QuestionId>,
        prompt: impl Into<String>,
        kind: QuestionKind,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            kind,
            options: None,
            correct_answer: correct_answer.into(),
            explanation: None,
            source_label: None,
        }
    }

    /// Attach candidate answers (multiple-choice questions).
    #[must_use]
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = Some(options);
        self
    }

    /// Attach a rationale shown after grading.
    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Attach free-text provenance (e.g. the originating document name).
    #[must_use]
    pub fn with_source_label(mut self, source_label: impl Into<String>) -> Self {
        self.source_label = Some(source_label.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    /// Candidate answers; empty for anything that is not multiple choice.
    #[must_use]
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or_default()
    }

    /// Reference answer, used for display after grading only.
    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn source_label(&self) -> Option<&str> {
        self.source_label.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_is_preserved() {
        let kind = QuestionKind::from("fill_in_the_blank".to_owned());
        assert_eq!(kind, QuestionKind::Other("fill_in_the_blank".to_owned()));
        assert_eq!(kind.as_str(), "fill_in_the_blank");
        assert!(!kind.is_supported());
        assert_eq!(String::from(kind), "fill_in_the_blank");
    }

    #[test]
    fn deserializes_wire_question() {
        let json = r#"{
            "id": 1,
            "question": "What is ownership?",
            "type": "short_answer",
            "correct_answer": "A set of rules governing memory",
            "explanation": "Core language concept",
            "document_name": "rust-book.pdf"
        }"#;
        let question: Question = serde_json::from_str(json).unwrap();

        assert_eq!(question.id(), &QuestionId::number(1));
        assert_eq!(question.kind(), &QuestionKind::ShortAnswer);
        assert!(question.options().is_empty());
        assert_eq!(question.source_label(), Some("rust-book.pdf"));
    }

    #[test]
    fn serializes_options_for_multiple_choice() {
        let question = Question::new(
            "q-1",
            "Pick one",
            QuestionKind::MultipleChoice,
            "A",
        )
        .with_options(vec!["A".into(), "B".into()]);

        let value = serde_json::to_value(&question).unwrap();
        assert_eq!(value["type"], "multiple_choice");
        assert_eq!(value["options"][1], "B");
        assert_eq!(value["id"], "q-1");
    }
}
