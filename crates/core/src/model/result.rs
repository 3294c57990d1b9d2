use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{MockTestId, OptionId, QuestionId, SectionId};
use crate::model::question::LocalizedText;
use crate::model::session::SubmissionKind;
use crate::scoring::ScoreTally;

/// How a single question was scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Wrong,
    Unanswered,
}

/// Per-question line of a session result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    pub section_id: Option<SectionId>,
    pub selected: Option<OptionId>,
    pub correct_option: Option<OptionId>,
    pub verdict: Verdict,
    pub max_marks: u32,
    pub marks_awarded: i64,
    pub was_marked: bool,
}

/// Section-wise breakdown of a session result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionResult {
    pub section_id: SectionId,
    pub section_name: LocalizedText,
    pub total_marks: u32,
    pub obtained_marks: i64,
    pub correct: u32,
    pub wrong: u32,
    pub unanswered: u32,
}

/// Session-level facts recorded alongside the score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultHeader {
    pub test_id: Option<MockTestId>,
    pub test_name: Option<LocalizedText>,
    pub started_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
    pub submission: SubmissionKind,
    pub allotted_secs: u32,
    pub remaining_secs: u32,
}

/// Scored summary of one finished attempt. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    test_id: Option<MockTestId>,
    test_name: Option<LocalizedText>,
    started_at: DateTime<Utc>,
    submitted_at: DateTime<Utc>,
    submission: SubmissionKind,
    total_marks: u32,
    obtained_marks: i64,
    total_questions: u32,
    correct: u32,
    wrong: u32,
    unanswered: u32,
    allotted_secs: u32,
    time_taken_secs: u32,
    outcomes: Vec<QuestionOutcome>,
    sections: Vec<SectionResult>,
}

impl SessionResult {
    /// Build a result from scored outcomes.
    ///
    /// `sections` lists the sections in display order; outcomes without a
    /// matching section only contribute to the overall totals.
    #[must_use]
    pub fn build(
        header: ResultHeader,
        outcomes: Vec<QuestionOutcome>,
        sections: &[(SectionId, LocalizedText)],
    ) -> Self {
        let tally = ScoreTally::from_outcomes(&outcomes);

        let sections = sections
            .iter()
            .map(|(id, name)| {
                let section = ScoreTally::from_outcomes(
                    outcomes.iter().filter(|o| o.section_id.as_ref() == Some(id)),
                );
                SectionResult {
                    section_id: id.clone(),
                    section_name: name.clone(),
                    total_marks: section.total_marks,
                    obtained_marks: section.obtained_marks,
                    correct: section.correct,
                    wrong: section.wrong,
                    unanswered: section.unanswered,
                }
            })
            .collect();

        Self {
            test_id: header.test_id,
            test_name: header.test_name,
            started_at: header.started_at,
            submitted_at: header.submitted_at,
            submission: header.submission,
            total_marks: tally.total_marks,
            obtained_marks: tally.obtained_marks,
            total_questions: tally.correct + tally.wrong + tally.unanswered,
            correct: tally.correct,
            wrong: tally.wrong,
            unanswered: tally.unanswered,
            allotted_secs: header.allotted_secs,
            time_taken_secs: header.allotted_secs.saturating_sub(header.remaining_secs),
            outcomes,
            sections,
        }
    }

    #[must_use]
    pub fn test_id(&self) -> Option<&MockTestId> {
        self.test_id.as_ref()
    }

    #[must_use]
    pub fn test_name(&self) -> Option<&LocalizedText> {
        self.test_name.as_ref()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    #[must_use]
    pub fn submission(&self) -> SubmissionKind {
        self.submission
    }

    #[must_use]
    pub fn total_marks(&self) -> u32 {
        self.total_marks
    }

    #[must_use]
    pub fn obtained_marks(&self) -> i64 {
        self.obtained_marks
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn wrong(&self) -> u32 {
        self.wrong
    }

    #[must_use]
    pub fn unanswered(&self) -> u32 {
        self.unanswered
    }

    #[must_use]
    pub fn allotted_secs(&self) -> u32 {
        self.allotted_secs
    }

    #[must_use]
    pub fn time_taken_secs(&self) -> u32 {
        self.time_taken_secs
    }

    #[must_use]
    pub fn outcomes(&self) -> &[QuestionOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn sections(&self) -> &[SectionResult] {
        &self.sections
    }

    /// Obtained marks as a percentage of the total; negative scores stay negative.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.total_marks == 0 {
            return 0.0;
        }
        self.obtained_marks as f64 / f64::from(self.total_marks) * 100.0
    }
}
