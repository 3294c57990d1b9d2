use serde::{Deserialize, Serialize};

use crate::model::ids::OptionId;

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Palette status of a question within a session.
///
/// The four values are the product of two independent axes: whether an
/// answer is recorded, and whether the question is flagged for review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionStatus {
    #[default]
    Unanswered,
    Answered,
    Marked,
    MarkedAnswered,
}

impl QuestionStatus {
    #[must_use]
    pub fn from_axes(answered: bool, marked: bool) -> Self {
        match (answered, marked) {
            (false, false) => Self::Unanswered,
            (true, false) => Self::Answered,
            (false, true) => Self::Marked,
            (true, true) => Self::MarkedAnswered,
        }
    }

    #[must_use]
    pub fn is_answered(self) -> bool {
        matches!(self, Self::Answered | Self::MarkedAnswered)
    }

    #[must_use]
    pub fn is_marked(self) -> bool {
        matches!(self, Self::Marked | Self::MarkedAnswered)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unanswered => "unanswered",
            Self::Answered => "answered",
            Self::Marked => "marked",
            Self::MarkedAnswered => "marked-answered",
        }
    }
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Per-question selection and review flag within one session.
///
/// `status.is_answered()` holds exactly when `selected` is `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionState {
    status: QuestionStatus,
    selected: Option<OptionId>,
}

impl QuestionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> QuestionStatus {
        self.status
    }

    #[must_use]
    pub fn selected(&self) -> Option<&OptionId> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }

    #[must_use]
    pub fn is_marked(&self) -> bool {
        self.status.is_marked()
    }

    /// Record `option` as the answer. Returns `false` if it was already selected.
    ///
    /// The caller is responsible for checking that `option` belongs to the question.
    pub fn select(&mut self, option: OptionId) -> bool {
        if self.selected.as_ref() == Some(&option) {
            return false;
        }
        self.selected = Some(option);
        self.status = QuestionStatus::from_axes(true, self.is_marked());
        true
    }

    /// Flag for review, keeping any recorded answer.
    pub fn mark(&mut self) -> bool {
        if self.is_marked() {
            return false;
        }
        self.status = QuestionStatus::from_axes(self.is_answered(), true);
        true
    }

    /// Remove the review flag, keeping any recorded answer.
    pub fn unmark(&mut self) -> bool {
        if !self.is_marked() {
            return false;
        }
        self.status = QuestionStatus::from_axes(self.is_answered(), false);
        true
    }

    /// Drop the recorded answer, keeping the review flag.
    pub fn clear(&mut self) -> bool {
        if self.selected.take().is_none() {
            return false;
        }
        self.status = QuestionStatus::from_axes(false, self.is_marked());
        true
    }
}
