use chrono::{DateTime, Utc};
use std::fmt;

use exam_core::model::{
    AttemptId, LocalizedText, MockTest, MockTestId, OptionId, Question, QuestionState,
    QuestionStatus, ResultHeader, SectionId, SessionPhase, SessionResult, SubmissionKind,
};
use exam_core::scoring::score_question;

use super::progress::{CurrentQuestion, SessionProgress, SessionSnapshot};
use crate::error::{ConfigurationError, SessionError};

//
// ─── TICK OUTCOME ──────────────────────────────────────────────────────────────
//

/// What a call to `MockTestSession::tick` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown moved and time is left.
    Counting { remaining_secs: u32 },
    /// The session is paused; the countdown did not move.
    Paused { remaining_secs: u32 },
    /// This tick exhausted the time and submitted the session.
    AutoSubmitted,
    /// The session was already submitted; nothing happened.
    AlreadySubmitted,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One timed attempt at a mock test.
///
/// Owns every `QuestionState` of the attempt and drives it from `NotStarted`
/// through `Running` to the terminal `Submitted` phase. All operations are
/// all-or-nothing: an `Err` leaves the session exactly as it was.
pub struct MockTestSession {
    phase: SessionPhase,
    test_id: Option<MockTestId>,
    test_name: Option<LocalizedText>,
    questions: Vec<Question>,
    states: Vec<QuestionState>,
    question_sections: Vec<Option<SectionId>>,
    sections: Vec<(SectionId, LocalizedText)>,
    current: usize,
    total_secs: u32,
    remaining_secs: u32,
    paused: bool,
    started_at: Option<DateTime<Utc>>,
    result: Option<SessionResult>,
    attempt_id: Option<AttemptId>,
}

impl MockTestSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::NotStarted,
            test_id: None,
            test_name: None,
            questions: Vec::new(),
            states: Vec::new(),
            question_sections: Vec::new(),
            sections: Vec::new(),
            current: 0,
            total_secs: 0,
            remaining_secs: 0,
            paused: false,
            started_at: None,
            result: None,
            attempt_id: None,
        }
    }

    /// Start the session over a bare list of questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` if the session was already started.
    /// Returns `SessionError::InvalidConfiguration` if `questions` is empty or
    /// `total_duration_secs` is zero.
    pub fn start(
        &mut self,
        questions: Vec<Question>,
        total_duration_secs: u32,
        started_at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        self.ensure_phase(SessionPhase::NotStarted)?;
        let question_sections = vec![None; questions.len()];
        self.begin(questions, question_sections, Vec::new(), total_duration_secs, started_at)?;
        tracing::info!(
            questions = self.questions.len(),
            duration_secs = total_duration_secs,
            "ad-hoc session started"
        );
        Ok(())
    }

    /// Start the session over a mock test, keeping its sections for the
    /// section-wise breakdown.
    ///
    /// `duration_secs` is usually `test.duration_secs()`; callers may override it.
    ///
    /// # Errors
    ///
    /// Same as [`MockTestSession::start`].
    pub fn start_test(
        &mut self,
        test: &MockTest,
        duration_secs: u32,
        started_at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        self.ensure_phase(SessionPhase::NotStarted)?;

        let mut questions = Vec::with_capacity(test.question_count());
        let mut question_sections = Vec::with_capacity(test.question_count());
        let mut sections = Vec::with_capacity(test.sections().len());
        for section in test.sections() {
            sections.push((section.id.clone(), section.name.clone()));
            for question in &section.questions {
                questions.push(question.clone());
                question_sections.push(Some(section.id.clone()));
            }
        }

        self.begin(questions, question_sections, sections, duration_secs, started_at)?;
        self.test_id = Some(test.id().clone());
        self.test_name = Some(test.name().clone());
        tracing::info!(
            test_id = %test.id(),
            questions = self.questions.len(),
            duration_secs,
            "mock test session started"
        );
        Ok(())
    }

    fn begin(
        &mut self,
        questions: Vec<Question>,
        question_sections: Vec<Option<SectionId>>,
        sections: Vec<(SectionId, LocalizedText)>,
        total_duration_secs: u32,
        started_at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if questions.is_empty() {
            return Err(ConfigurationError::NoQuestions.into());
        }
        if total_duration_secs == 0 {
            return Err(ConfigurationError::ZeroDuration.into());
        }

        self.states = vec![QuestionState::new(); questions.len()];
        self.questions = questions;
        self.question_sections = question_sections;
        self.sections = sections;
        self.current = 0;
        self.total_secs = total_duration_secs;
        self.remaining_secs = total_duration_secs;
        self.paused = false;
        self.started_at = Some(started_at);
        self.phase = SessionPhase::Running;
        Ok(())
    }

    fn ensure_phase(&self, expected: SessionPhase) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState { phase: self.phase })
        }
    }

    fn ensure_running(&self) -> Result<(), SessionError> {
        self.ensure_phase(SessionPhase::Running)
    }

    //
    // ─── ANSWERING ──────────────────────────────────────────────────────────
    //

    /// Record `option_id` as the answer to the current question.
    ///
    /// Reselecting the current selection changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running, and
    /// `SessionError::UnknownOption` if the option is not part of the current question.
    pub fn select_option(&mut self, option_id: OptionId) -> Result<QuestionStatus, SessionError> {
        self.ensure_running()?;
        if !self.questions[self.current].has_option(&option_id) {
            return Err(SessionError::UnknownOption { option_id });
        }
        let state = &mut self.states[self.current];
        state.select(option_id);
        Ok(state.status())
    }

    /// Flag the current question for review.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running.
    pub fn mark_for_review(&mut self) -> Result<QuestionStatus, SessionError> {
        self.ensure_running()?;
        let state = &mut self.states[self.current];
        state.mark();
        Ok(state.status())
    }

    /// Remove the review flag from the current question, keeping its answer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running.
    pub fn clear_mark(&mut self) -> Result<QuestionStatus, SessionError> {
        self.ensure_running()?;
        let state = &mut self.states[self.current];
        state.unmark();
        Ok(state.status())
    }

    /// Flip the review flag of the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running.
    pub fn toggle_mark(&mut self) -> Result<QuestionStatus, SessionError> {
        self.ensure_running()?;
        let state = &mut self.states[self.current];
        if state.is_marked() {
            state.unmark();
        } else {
            state.mark();
        }
        Ok(state.status())
    }

    /// Drop the current question's answer, keeping its review flag.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running.
    pub fn clear_response(&mut self) -> Result<QuestionStatus, SessionError> {
        self.ensure_running()?;
        let state = &mut self.states[self.current];
        state.clear();
        Ok(state.status())
    }

    //
    // ─── NAVIGATION ─────────────────────────────────────────────────────────
    //

    /// Move the cursor. Never changes any question state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running, and
    /// `SessionError::IndexOutOfRange` if `index` is outside `0..len`.
    pub fn navigate(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_running()?;
        if index >= self.states.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.states.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    /// Move to the next question; returns `false` on the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running.
    pub fn next(&mut self) -> Result<bool, SessionError> {
        self.ensure_running()?;
        if self.current + 1 >= self.states.len() {
            return Ok(false);
        }
        self.current += 1;
        Ok(true)
    }

    /// Move to the previous question; returns `false` on the first one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running.
    pub fn previous(&mut self) -> Result<bool, SessionError> {
        self.ensure_running()?;
        let Some(prev) = self.current.checked_sub(1) else {
            return Ok(false);
        };
        self.current = prev;
        Ok(true)
    }

    //
    // ─── TIME ───────────────────────────────────────────────────────────────
    //

    /// Freeze the countdown. Returns `false` if already paused.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running.
    pub fn pause(&mut self) -> Result<bool, SessionError> {
        self.ensure_running()?;
        let changed = !self.paused;
        self.paused = true;
        Ok(changed)
    }

    /// Resume the countdown. Returns `false` if not paused.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running.
    pub fn resume(&mut self) -> Result<bool, SessionError> {
        self.ensure_running()?;
        let changed = self.paused;
        self.paused = false;
        Ok(changed)
    }

    /// Advance the countdown by `elapsed_secs`, clamped at zero.
    ///
    /// Reaching zero submits the session with `SubmissionKind::TimeExpired`.
    /// Ticks after submission are accepted and ignored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` if the session was never started.
    pub fn tick(
        &mut self,
        elapsed_secs: u32,
        now: DateTime<Utc>,
    ) -> Result<TickOutcome, SessionError> {
        match self.phase {
            SessionPhase::NotStarted => Err(SessionError::InvalidState { phase: self.phase }),
            SessionPhase::Submitted => Ok(TickOutcome::AlreadySubmitted),
            SessionPhase::Running if self.paused => Ok(TickOutcome::Paused {
                remaining_secs: self.remaining_secs,
            }),
            SessionPhase::Running => {
                self.remaining_secs = self.remaining_secs.saturating_sub(elapsed_secs);
                if self.remaining_secs > 0 {
                    return Ok(TickOutcome::Counting {
                        remaining_secs: self.remaining_secs,
                    });
                }
                self.finish(SubmissionKind::TimeExpired, now);
                Ok(TickOutcome::AutoSubmitted)
            }
        }
    }

    //
    // ─── SUBMISSION ─────────────────────────────────────────────────────────
    //

    /// Score the attempt and move to `Submitted`.
    ///
    /// Unanswered questions do not block submission.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running, including on a second submit.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<&SessionResult, SessionError> {
        self.ensure_running()?;
        Ok(self.finish(SubmissionKind::Manual, now))
    }

    fn finish(&mut self, kind: SubmissionKind, submitted_at: DateTime<Utc>) -> &SessionResult {
        let outcomes = self
            .questions
            .iter()
            .zip(&self.states)
            .zip(&self.question_sections)
            .map(|((question, state), section)| score_question(question, state, section.as_ref()))
            .collect();

        let header = ResultHeader {
            test_id: self.test_id.clone(),
            test_name: self.test_name.clone(),
            started_at: self.started_at.unwrap_or(submitted_at),
            submitted_at,
            submission: kind,
            allotted_secs: self.total_secs,
            remaining_secs: self.remaining_secs,
        };

        self.phase = SessionPhase::Submitted;
        self.paused = false;
        let result = self
            .result
            .insert(SessionResult::build(header, outcomes, &self.sections));

        tracing::info!(
            test_id = ?self.test_id,
            submission = ?kind,
            obtained = result.obtained_marks(),
            total = result.total_marks(),
            "session submitted"
        );
        result
    }

    //
    // ─── READ SIDE ──────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.phase == SessionPhase::Submitted
    }

    #[must_use]
    pub fn test_id(&self) -> Option<&MockTestId> {
        self.test_id.as_ref()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn current_state(&self) -> Option<&QuestionState> {
        self.states.get(self.current)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_states(&self) -> &[QuestionState] {
        &self.states
    }

    /// Section of the current question, if the session came from a mock test.
    #[must_use]
    pub fn current_section(&self) -> Option<&(SectionId, LocalizedText)> {
        let id = self.question_sections.get(self.current)?.as_ref()?;
        self.sections.iter().find(|(sid, _)| sid == id)
    }

    /// Everything needed to render the question under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<CurrentQuestion> {
        let question = self.current_question()?;
        let state = self.current_state()?;
        Some(CurrentQuestion {
            index: self.current,
            total: self.questions.len(),
            question: question.clone(),
            state: state.clone(),
            section_name: self.current_section().map(|(_, name)| name.clone()),
        })
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn total_duration(&self) -> u32 {
        self.total_secs
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn attempt_id(&self) -> Option<AttemptId> {
        self.attempt_id
    }

    pub(crate) fn set_attempt_id(&mut self, id: AttemptId) {
        self.attempt_id = Some(id);
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::from_states(&self.states, self.current, self.remaining_secs, self.phase)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            current_index: self.current,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            paused: self.paused,
            questions: self.states.clone(),
        }
    }
}

impl Default for MockTestSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockTestSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTestSession")
            .field("phase", &self.phase)
            .field("test_id", &self.test_id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("remaining_secs", &self.remaining_secs)
            .field("paused", &self.paused)
            .field("attempt_id", &self.attempt_id)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
