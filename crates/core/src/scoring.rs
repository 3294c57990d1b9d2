//! Deterministic scoring of a submitted session.
//!
//! Each question is scored on its own; the tally is a plain sum, so the order
//! in which outcomes are folded does not affect the totals.

use serde::{Deserialize, Serialize};

use crate::model::{Question, QuestionOutcome, QuestionState, SectionId, Verdict};

/// Score one question against its recorded state.
///
/// Unanswered questions score zero whether or not they are marked for review.
/// A selection that does not belong to the question counts as wrong.
#[must_use]
pub fn score_question(
    question: &Question,
    state: &QuestionState,
    section_id: Option<&SectionId>,
) -> QuestionOutcome {
    let marks = question.marks();
    let (verdict, marks_awarded) = match state.selected() {
        None => (Verdict::Unanswered, 0),
        Some(selected) => match question.is_correct(selected) {
            Some(true) => (Verdict::Correct, i64::from(marks.positive)),
            _ => (Verdict::Wrong, -i64::from(marks.negative)),
        },
    };

    QuestionOutcome {
        question_id: question.id().clone(),
        section_id: section_id.cloned(),
        selected: state.selected().cloned(),
        correct_option: question.correct_option().map(|o| o.id.clone()),
        verdict,
        max_marks: marks.positive,
        marks_awarded,
        was_marked: state.is_marked(),
    }
}

/// Running totals over a set of question outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTally {
    pub total_marks: u32,
    pub obtained_marks: i64,
    pub correct: u32,
    pub wrong: u32,
    pub unanswered: u32,
}

impl ScoreTally {
    pub fn add(&mut self, outcome: &QuestionOutcome) {
        self.total_marks = self.total_marks.saturating_add(outcome.max_marks);
        self.obtained_marks += outcome.marks_awarded;
        match outcome.verdict {
            Verdict::Correct => self.correct = self.correct.saturating_add(1),
            Verdict::Wrong => self.wrong = self.wrong.saturating_add(1),
            Verdict::Unanswered => self.unanswered = self.unanswered.saturating_add(1),
        }
    }

    #[must_use]
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a QuestionOutcome>) -> Self {
        let mut tally = Self::default();
        for outcome in outcomes {
            tally.add(outcome);
        }
        tally
    }

    #[must_use]
    pub fn attempted(&self) -> u32 {
        self.correct + self.wrong
    }
}
