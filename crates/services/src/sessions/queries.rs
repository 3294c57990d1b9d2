use std::collections::HashMap;

use exam_core::model::MockTestId;
use storage::repository::{ResultsRepository, StoredResult};

use crate::error::SessionError;

/// Aggregate numbers over a set of stored attempts.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct AttemptStats {
    pub attempts: u32,
    pub average_percentage: Option<f64>,
    pub best_percentage: Option<f64>,
}

/// Storage-backed result queries.
pub(crate) struct ResultQueries;

impl ResultQueries {
    /// Newest-first attempts, never more than `cap`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when repository access fails.
    pub async fn recent_rows(
        results: &dyn ResultsRepository,
        limit: u32,
        cap: u32,
    ) -> Result<Vec<StoredResult>, SessionError> {
        Ok(results.list_recent(limit.min(cap)).await?)
    }

    /// Every stored attempt, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when repository access fails.
    pub async fn all_rows(results: &dyn ResultsRepository) -> Result<Vec<StoredResult>, SessionError> {
        Ok(results.list_recent(u32::MAX).await?)
    }

    pub fn stats(rows: &[StoredResult]) -> AttemptStats {
        if rows.is_empty() {
            return AttemptStats::default();
        }

        let percentages: Vec<f64> = rows.iter().map(|row| row.result.percentage()).collect();
        let sum: f64 = percentages.iter().sum();
        let best = percentages.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let attempts = u32::try_from(rows.len()).unwrap_or(u32::MAX);

        AttemptStats {
            attempts,
            average_percentage: Some(sum / f64::from(attempts)),
            best_percentage: Some(best),
        }
    }

    /// Highest obtained marks per test, for attempts that came from a catalog test.
    pub fn best_marks_by_test(rows: &[StoredResult]) -> HashMap<MockTestId, i64> {
        let mut best: HashMap<MockTestId, i64> = HashMap::new();
        for row in rows {
            let Some(test_id) = row.result.test_id() else {
                continue;
            };
            let marks = row.result.obtained_marks();
            best.entry(test_id.clone())
                .and_modify(|current| *current = (*current).max(marks))
                .or_insert(marks);
        }
        best
    }
}
