use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{OptionId, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question has no options")]
    NoOptions,

    #[error("duplicate option id: {0}")]
    DuplicateOption(OptionId),

    #[error("exactly one option must be correct, found {0}")]
    CorrectOptionCount(usize),

    #[error("positive marks must be > 0")]
    ZeroMarks,

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DIFFICULTY / LANGUAGE ─────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(QuestionError::UnknownDifficulty(other.to_string())),
        }
    }
}

/// Display language for localized question content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "hi" | "hindi" => Ok(Self::Hindi),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

/// Text with an English original and an optional Hindi translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hi: Option<String>,
}

impl LocalizedText {
    #[must_use]
    pub fn new(en: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            hi: None,
        }
    }

    #[must_use]
    pub fn with_hindi(mut self, hi: impl Into<String>) -> Self {
        self.hi = Some(hi.into());
        self
    }

    /// Returns the text for `language`, falling back to English.
    #[must_use]
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Hindi => self.hi.as_deref().unwrap_or(&self.en),
            Language::English => &self.en,
        }
    }
}

impl From<&str> for LocalizedText {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LocalizedText {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: OptionId,
    pub text: LocalizedText,
    pub is_correct: bool,
}

impl QuestionOption {
    #[must_use]
    pub fn new(id: impl Into<OptionId>, text: impl Into<LocalizedText>, is_correct: bool) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_correct,
        }
    }
}

/// Marks awarded for a correct answer and deducted for a wrong one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marks {
    pub positive: u32,
    pub negative: u32,
}

impl Marks {
    #[must_use]
    pub fn new(positive: u32, negative: u32) -> Self {
        Self { positive, negative }
    }
}

impl Default for Marks {
    /// JEE pattern: +4 / -1.
    fn default() -> Self {
        Self::new(4, 1)
    }
}

/// A single multiple-choice question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    prompt: LocalizedText,
    options: Vec<QuestionOption>,
    explanation: Option<LocalizedText>,
    marks: Marks,
    difficulty: Difficulty,
    topic_id: String,
    subtopic_id: String,
}

/// Unvalidated question input, as supplied by a question bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub prompt: LocalizedText,
    pub options: Vec<QuestionOption>,
    pub explanation: Option<LocalizedText>,
    pub marks: Marks,
    pub difficulty: Difficulty,
    pub topic_id: String,
    pub subtopic_id: String,
}

impl QuestionDraft {
    #[must_use]
    pub fn new(id: impl Into<QuestionId>, prompt: impl Into<LocalizedText>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            options: Vec::new(),
            explanation: None,
            marks: Marks::default(),
            difficulty: Difficulty::Medium,
            topic_id: String::new(),
            subtopic_id: String::new(),
        }
    }

    #[must_use]
    pub fn option(mut self, id: &str, text: impl Into<LocalizedText>, is_correct: bool) -> Self {
        self.options.push(QuestionOption::new(id, text, is_correct));
        self
    }

    #[must_use]
    pub fn marks(mut self, positive: u32, negative: u32) -> Self {
        self.marks = Marks::new(positive, negative);
        self
    }

    #[must_use]
    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    #[must_use]
    pub fn topic(mut self, topic_id: impl Into<String>, subtopic_id: impl Into<String>) -> Self {
        self.topic_id = topic_id.into();
        self.subtopic_id = subtopic_id.into();
        self
    }

    #[must_use]
    pub fn explanation(mut self, explanation: impl Into<LocalizedText>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when options are missing or duplicated, when the
    /// number of correct options is not exactly one, or when positive marks are zero.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.options.is_empty() {
            return Err(QuestionError::NoOptions);
        }

        let mut seen = HashSet::with_capacity(self.options.len());
        for option in &self.options {
            if !seen.insert(&option.id) {
                return Err(QuestionError::DuplicateOption(option.id.clone()));
            }
        }

        let correct = self.options.iter().filter(|o| o.is_correct).count();
        if correct != 1 {
            return Err(QuestionError::CorrectOptionCount(correct));
        }

        if self.marks.positive == 0 {
            return Err(QuestionError::ZeroMarks);
        }

        Ok(Question {
            id: self.id,
            prompt: self.prompt,
            options: self.options,
            explanation: self.explanation,
            marks: self.marks,
            difficulty: self.difficulty,
            topic_id: self.topic_id,
            subtopic_id: self.subtopic_id,
        })
    }
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &LocalizedText {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[QuestionOption] {
        &self.options
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&LocalizedText> {
        self.explanation.as_ref()
    }

    #[must_use]
    pub fn marks(&self) -> Marks {
        self.marks
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    #[must_use]
    pub fn subtopic_id(&self) -> &str {
        &self.subtopic_id
    }

    #[must_use]
    pub fn option(&self, id: &OptionId) -> Option<&QuestionOption> {
        self.options.iter().find(|o| &o.id == id)
    }

    #[must_use]
    pub fn has_option(&self, id: &OptionId) -> bool {
        self.option(id).is_some()
    }

    /// The single correct option. Always present for a validated question.
    #[must_use]
    pub fn correct_option(&self) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.is_correct)
    }

    /// Returns `None` if the option does not belong to this question.
    #[must_use]
    pub fn is_correct(&self, id: &OptionId) -> Option<bool> {
        self.option(id).map(|o| o.is_correct)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft::new("q1", "What is f'(1) for f(x) = x^2?")
            .option("a", "2", true)
            .option("b", "1", false)
            .option("c", "0", false)
    }

    #[test]
    fn valid_question_exposes_options() {
        let question = draft().topic("calculus", "differentiation").validate().unwrap();

        assert_eq!(question.options().len(), 3);
        assert_eq!(question.marks(), Marks::new(4, 1));
        assert_eq!(question.correct_option().unwrap().id, OptionId::new("a"));
        assert_eq!(question.is_correct(&OptionId::new("b")), Some(false));
        assert_eq!(question.is_correct(&OptionId::new("z")), None);
        assert_eq!(question.topic_id(), "calculus");
    }

    #[test]
    fn question_without_options_is_rejected() {
        let err = QuestionDraft::new("q1", "empty").validate().unwrap_err();
        assert_eq!(err, QuestionError::NoOptions);
    }

    #[test]
    fn question_requires_exactly_one_correct_option() {
        let none = QuestionDraft::new("q1", "?")
            .option("a", "1", false)
            .option("b", "2", false)
            .validate()
            .unwrap_err();
        assert_eq!(none, QuestionError::CorrectOptionCount(0));

        let two = draft().option("d", "2", true).validate().unwrap_err();
        assert_eq!(two, QuestionError::CorrectOptionCount(2));
    }

    #[test]
    fn duplicate_option_ids_are_rejected() {
        let err = draft().option("a", "again", false).validate().unwrap_err();
        assert_eq!(err, QuestionError::DuplicateOption(OptionId::new("a")));
    }

    #[test]
    fn zero_positive_marks_are_rejected() {
        let err = draft().marks(0, 1).validate().unwrap_err();
        assert_eq!(err, QuestionError::ZeroMarks);
    }

    #[test]
    fn localized_text_falls_back_to_english() {
        let text = LocalizedText::new("Mathematics");
        assert_eq!(text.get(Language::Hindi), "Mathematics");

        let text = text.with_hindi("गणित");
        assert_eq!(text.get(Language::Hindi), "गणित");
        assert_eq!(text.get(Language::English), "Mathematics");
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
    }
}
