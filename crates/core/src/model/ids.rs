use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a Question within a session.
///
/// Question sets arrive from an external generator that identifies questions
/// either by number or by string; both spellings are preserved verbatim so
/// grading outcomes can be matched back against the original set.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Number(i64),
    Text(String),
}

impl QuestionId {
    /// Creates a numeric `QuestionId`
    #[must_use]
    pub fn number(id: i64) -> Self {
        Self::Number(id)
    }

    /// Creates a string `QuestionId`
    #[must_use]
    pub fn text(id: impl Into<String>) -> Self {
        Self::Text(id.into())
    }
}

impl From<i64> for QuestionId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for QuestionId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}

impl From<String> for QuestionId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "QuestionId({n})"),
            Self::Text(s) => write!(f, "QuestionId({s:?})"),
        }
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}
