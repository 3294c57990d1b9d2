use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{MockTestId, SectionId};
use crate::model::question::{Difficulty, Language, LocalizedText, Question};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MockTestError {
    #[error("mock test name cannot be empty")]
    EmptyName,

    #[error("mock test has no sections")]
    NoSections,

    #[error("section {0} has no questions")]
    EmptySection(SectionId),

    #[error("duration must be > 0 seconds")]
    ZeroDuration,
}

/// A named group of questions inside a mock test (e.g. "Mathematics").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub name: LocalizedText,
    pub questions: Vec<Question>,
}

impl Section {
    #[must_use]
    pub fn new(
        id: impl Into<SectionId>,
        name: impl Into<LocalizedText>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            questions,
        }
    }

    #[must_use]
    pub fn total_marks(&self) -> u32 {
        self.questions.iter().map(|q| q.marks().positive).sum()
    }
}

/// A full-length timed test as offered by the question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockTest {
    id: MockTestId,
    name: LocalizedText,
    sections: Vec<Section>,
    duration_secs: u32,
    difficulty: Difficulty,
}

impl MockTest {
    /// Creates a validated mock test.
    ///
    /// # Errors
    ///
    /// Returns `MockTestError` if the name is blank, there are no sections,
    /// any section is empty, or the duration is zero.
    pub fn new(
        id: impl Into<MockTestId>,
        name: impl Into<LocalizedText>,
        sections: Vec<Section>,
        duration_secs: u32,
        difficulty: Difficulty,
    ) -> Result<Self, MockTestError> {
        let name = name.into();
        if name.get(Language::English).trim().is_empty() {
            return Err(MockTestError::EmptyName);
        }
        if sections.is_empty() {
            return Err(MockTestError::NoSections);
        }
        if let Some(empty) = sections.iter().find(|s| s.questions.is_empty()) {
            return Err(MockTestError::EmptySection(empty.id.clone()));
        }
        if duration_secs == 0 {
            return Err(MockTestError::ZeroDuration);
        }

        Ok(Self {
            id: id.into(),
            name,
            sections,
            duration_secs,
            difficulty,
        })
    }

    #[must_use]
    pub fn id(&self) -> &MockTestId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &LocalizedText {
        &self.name
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    #[must_use]
    pub fn total_marks(&self) -> u32 {
        self.sections.iter().map(Section::total_marks).sum()
    }

    /// Iterates all questions in display order, across sections.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|s| s.questions.iter())
    }

    /// Returns a copy with every section's questions reordered by `reorder`.
    #[must_use]
    pub fn with_reordered_sections(mut self, mut reorder: impl FnMut(&mut [Question])) -> Self {
        for section in &mut self.sections {
            reorder(&mut section.questions);
        }
        self
    }

    #[must_use]
    pub fn summary(&self) -> MockTestSummary {
        MockTestSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            total_questions: self.question_count(),
            total_marks: self.total_marks(),
            duration_minutes: self.duration_secs.div_ceil(60),
            difficulty: self.difficulty,
        }
    }
}

/// Catalog entry describing a mock test without its questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockTestSummary {
    pub id: MockTestId,
    pub name: LocalizedText,
    pub total_questions: usize,
    pub total_marks: u32,
    pub duration_minutes: u32,
    pub difficulty: Difficulty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::QuestionDraft;

    fn question(id: &str, positive: u32) -> Question {
        QuestionDraft::new(id, "?")
            .option("a", "yes", true)
            .option("b", "no", false)
            .marks(positive, 1)
            .validate()
            .unwrap()
    }

    #[test]
    fn summary_totals_span_sections() {
        let test = MockTest::new(
            "mock-1",
            "JEE Main Mock Test 1",
            vec![
                Section::new("maths", "Mathematics", vec![question("q1", 4), question("q2", 4)]),
                Section::new("physics", "Physics", vec![question("q3", 3)]),
            ],
            90 * 60,
            Difficulty::Medium,
        )
        .unwrap();

        let summary = test.summary();
        assert_eq!(summary.total_questions, 3);
        assert_eq!(summary.total_marks, 11);
        assert_eq!(summary.duration_minutes, 90);
        let ids: Vec<_> = test.questions().map(|q| q.id().as_str().to_owned()).collect();
        assert_eq!(ids, ["q1", "q2", "q3"]);
    }

    #[test]
    fn rejects_empty_sections_and_zero_duration() {
        let err = MockTest::new(
            "mock-1",
            "Test",
            vec![Section::new("maths", "Mathematics", Vec::new())],
            60,
            Difficulty::Easy,
        )
        .unwrap_err();
        assert_eq!(err, MockTestError::EmptySection(SectionId::new("maths")));

        let err = MockTest::new(
            "mock-1",
            "Test",
            vec![Section::new("maths", "Mathematics", vec![question("q1", 4)])],
            0,
            Difficulty::Easy,
        )
        .unwrap_err();
        assert_eq!(err, MockTestError::ZeroDuration);

        let err = MockTest::new("mock-1", "Test", Vec::new(), 60, Difficulty::Easy).unwrap_err();
        assert_eq!(err, MockTestError::NoSections);
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = MockTest::new(
            "mock-1",
            "  ",
            vec![Section::new("maths", "Mathematics", vec![question("q1", 4)])],
            60,
            Difficulty::Easy,
        )
        .unwrap_err();
        assert_eq!(err, MockTestError::EmptyName);
    }
}
