use serde::Serialize;

use exam_core::model::{LocalizedText, Question, QuestionState, QuestionStatus, SessionPhase};

/// Aggregated view of session progress, useful for the question palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub marked: usize,
    pub marked_answered: usize,
    pub unanswered: usize,
    pub current_index: usize,
    pub remaining_secs: u32,
    pub phase: SessionPhase,
}

impl SessionProgress {
    pub(crate) fn from_states(
        states: &[QuestionState],
        current_index: usize,
        remaining_secs: u32,
        phase: SessionPhase,
    ) -> Self {
        let count = |status| states.iter().filter(|s| s.status() == status).count();
        Self {
            total: states.len(),
            answered: count(QuestionStatus::Answered),
            marked: count(QuestionStatus::Marked),
            marked_answered: count(QuestionStatus::MarkedAnswered),
            unanswered: count(QuestionStatus::Unanswered),
            current_index,
            remaining_secs,
            phase,
        }
    }

    /// Questions with a recorded answer, marked or not.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.answered + self.marked_answered
    }
}

/// Point-in-time copy of everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub current_index: usize,
    pub remaining_secs: u32,
    pub total_secs: u32,
    pub paused: bool,
    pub questions: Vec<QuestionState>,
}

/// The question under the cursor, with everything needed to render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentQuestion {
    pub index: usize,
    pub total: usize,
    pub question: Question,
    pub state: QuestionState,
    pub section_name: Option<LocalizedText>,
}
