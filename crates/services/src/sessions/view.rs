use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use exam_core::model::{
    AttemptId, LocalizedText, MockTestId, MockTestSummary, SessionResult, SessionSettings,
    SubmissionKind,
};
use storage::repository::{InMemoryRepository, QuestionBank, ResultsRepository, StoredResult};

use super::queries::{AttemptStats, ResultQueries};
use crate::error::SessionError;

/// Presentation-agnostic history row for one stored attempt.
///
/// Carries raw numbers only; formatting is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptListItem {
    pub id: AttemptId,
    pub test_id: Option<MockTestId>,
    pub test_name: Option<LocalizedText>,
    pub submitted_at: DateTime<Utc>,
    pub submission: SubmissionKind,
    pub obtained_marks: i64,
    pub total_marks: u32,
    pub percentage: f64,
    pub correct: u32,
    pub wrong: u32,
    pub unanswered: u32,
    pub time_taken_secs: u32,
}

impl AttemptListItem {
    #[must_use]
    pub fn from_result(id: AttemptId, result: &SessionResult) -> Self {
        Self {
            id,
            test_id: result.test_id().cloned(),
            test_name: result.test_name().cloned(),
            submitted_at: result.submitted_at(),
            submission: result.submission(),
            obtained_marks: result.obtained_marks(),
            total_marks: result.total_marks(),
            percentage: result.percentage(),
            correct: result.correct(),
            wrong: result.wrong(),
            unanswered: result.unanswered(),
            time_taken_secs: result.time_taken_secs(),
        }
    }

    fn from_row(row: &StoredResult) -> Self {
        Self::from_result(row.id, &row.result)
    }
}

/// One test on the list screen, with the candidate's history against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub summary: MockTestSummary,
    pub attempted: bool,
    pub best_obtained_marks: Option<i64>,
}

/// Read side over the question bank and the results store.
#[derive(Clone)]
pub struct ResultsService {
    settings: SessionSettings,
    bank: Arc<dyn QuestionBank>,
    results: Arc<dyn ResultsRepository>,
}

impl ResultsService {
    #[must_use]
    pub fn new(
        settings: SessionSettings,
        bank: Arc<dyn QuestionBank>,
        results: Arc<dyn ResultsRepository>,
    ) -> Self {
        Self {
            settings,
            bank,
            results,
        }
    }

    #[must_use]
    pub fn in_memory(settings: SessionSettings) -> Self {
        let repo = InMemoryRepository::new();
        Self::new(settings, Arc::new(repo.clone()), Arc::new(repo))
    }

    /// Most recent attempts, newest first, capped by the configured history limit.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<AttemptListItem>, SessionError> {
        let rows =
            ResultQueries::recent_rows(self.results.as_ref(), limit, self.settings.history_limit())
                .await?;
        Ok(rows.iter().map(AttemptListItem::from_row).collect())
    }

    /// Attempts against one test, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn list_for_test(
        &self,
        test_id: &MockTestId,
    ) -> Result<Vec<AttemptListItem>, SessionError> {
        let rows = self.results.list_for_test(test_id).await?;
        Ok(rows.iter().map(AttemptListItem::from_row).collect())
    }

    /// # Errors
    ///
    /// Returns `SessionError::Storage` (`NotFound` for unknown ids).
    pub async fn get_result(&self, id: AttemptId) -> Result<SessionResult, SessionError> {
        Ok(self.results.get_result(id).await?)
    }

    /// Aggregate numbers over every stored attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn stats(&self) -> Result<AttemptStats, SessionError> {
        let rows = ResultQueries::all_rows(self.results.as_ref()).await?;
        Ok(ResultQueries::stats(&rows))
    }

    /// Aggregate numbers over the attempts at one test.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn stats_for_test(&self, test_id: &MockTestId) -> Result<AttemptStats, SessionError> {
        let rows = self.results.list_for_test(test_id).await?;
        Ok(ResultQueries::stats(&rows))
    }

    /// Every available test with the best score obtained so far.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn catalog(&self) -> Result<Vec<CatalogEntry>, SessionError> {
        let tests = self.bank.list_tests().await?;
        let rows = ResultQueries::all_rows(self.results.as_ref()).await?;
        let best = ResultQueries::best_marks_by_test(&rows);

        Ok(tests
            .into_iter()
            .map(|summary| {
                let best_obtained_marks = best.get(&summary.id).copied();
                CatalogEntry {
                    summary,
                    attempted: best_obtained_marks.is_some(),
                    best_obtained_marks,
                }
            })
            .collect())
    }
}
