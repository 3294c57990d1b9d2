use async_trait::async_trait;
use exam_core::model::{AttemptId, MockTest, MockTestId, MockTestSummary, SessionResult};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted attempt together with its store-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResult {
    pub id: AttemptId,
    pub result: SessionResult,
}

/// Source of mock tests and their questions.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Persist or replace a mock test.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the test cannot be stored.
    async fn upsert_test(&self, test: &MockTest) -> Result<(), StorageError>;

    /// Fetch a mock test by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_test(&self, id: &MockTestId) -> Result<MockTest, StorageError>;

    /// List catalog entries ordered by test id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_tests(&self) -> Result<Vec<MockTestSummary>, StorageError>;
}

/// Append-only store of finished attempts.
#[async_trait]
pub trait ResultsRepository: Send + Sync {
    /// Append a result and return its new id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn append_result(&self, result: &SessionResult) -> Result<AttemptId, StorageError>;

    /// Fetch a stored result by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_result(&self, id: AttemptId) -> Result<SessionResult, StorageError>;

    /// List the most recent results, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_recent(&self, limit: u32) -> Result<Vec<StoredResult>, StorageError>;

    /// List every result recorded for a test, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_for_test(&self, test_id: &MockTestId) -> Result<Vec<StoredResult>, StorageError>;
}

/// Simple in-memory repository implementation for the driver and tests.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tests: Arc<Mutex<BTreeMap<MockTestId, MockTest>>>,
    results: Arc<Mutex<Vec<StoredResult>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_err<T>(e: std::sync::PoisonError<T>) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl QuestionBank for InMemoryRepository {
    async fn upsert_test(&self, test: &MockTest) -> Result<(), StorageError> {
        let mut guard = self.tests.lock().map_err(lock_err)?;
        guard.insert(test.id().clone(), test.clone());
        Ok(())
    }

    async fn get_test(&self, id: &MockTestId) -> Result<MockTest, StorageError> {
        let guard = self.tests.lock().map_err(lock_err)?;
        guard.get(id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_tests(&self) -> Result<Vec<MockTestSummary>, StorageError> {
        let guard = self.tests.lock().map_err(lock_err)?;
        Ok(guard.values().map(MockTest::summary).collect())
    }
}

#[async_trait]
impl ResultsRepository for InMemoryRepository {
    async fn append_result(&self, result: &SessionResult) -> Result<AttemptId, StorageError> {
        let mut guard = self.results.lock().map_err(lock_err)?;
        let next = guard.last().map_or(1, |row| row.id.value() + 1);
        let id = AttemptId::new(next);
        guard.push(StoredResult {
            id,
            result: result.clone(),
        });
        Ok(id)
    }

    async fn get_result(&self, id: AttemptId) -> Result<SessionResult, StorageError> {
        let guard = self.results.lock().map_err(lock_err)?;
        guard
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.result.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<StoredResult>, StorageError> {
        let guard = self.results.lock().map_err(lock_err)?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }

    async fn list_for_test(&self, test_id: &MockTestId) -> Result<Vec<StoredResult>, StorageError> {
        let guard = self.results.lock().map_err(lock_err)?;
        Ok(guard
            .iter()
            .rev()
            .filter(|row| row.result.test_id() == Some(test_id))
            .cloned()
            .collect())
    }
}

/// Aggregates the question bank and results store behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub question_bank: Arc<dyn QuestionBank>,
    pub results: Arc<dyn ResultsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let question_bank: Arc<dyn QuestionBank> = Arc::new(repo.clone());
        let results: Arc<dyn ResultsRepository> = Arc::new(repo);
        Self {
            question_bank,
            results,
        }
    }

    /// In-memory storage pre-loaded with the sample catalog.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be built or stored.
    pub async fn in_memory_seeded() -> Result<Self, StorageError> {
        let storage = Self::in_memory();
        let catalog =
            crate::seed::sample_catalog().map_err(|e| StorageError::Serialization(e.to_string()))?;
        for test in &catalog {
            storage.question_bank.upsert_test(test).await?;
        }
        Ok(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{
        Difficulty, LocalizedText, QuestionDraft, ResultHeader, Section, SubmissionKind,
    };
    use exam_core::time::fixed_now;

    fn build_test(id: &str) -> MockTest {
        let question = QuestionDraft::new("q1", "?")
            .option("a", "yes", true)
            .option("b", "no", false)
            .validate()
            .unwrap();
        MockTest::new(
            id,
            "Test",
            vec![Section::new("maths", "Mathematics", vec![question])],
            600,
            Difficulty::Easy,
        )
        .unwrap()
    }

    fn build_result(test_id: &str) -> SessionResult {
        SessionResult::build(
            ResultHeader {
                test_id: Some(MockTestId::new(test_id)),
                test_name: Some(LocalizedText::new("Test")),
                started_at: fixed_now(),
                submitted_at: fixed_now(),
                submission: SubmissionKind::Manual,
                allotted_secs: 600,
                remaining_secs: 100,
            },
            Vec::new(),
            &[],
        )
    }

    #[tokio::test]
    async fn question_bank_round_trips_tests() {
        let repo = InMemoryRepository::new();
        repo.upsert_test(&build_test("mock-2")).await.unwrap();
        repo.upsert_test(&build_test("mock-1")).await.unwrap();

        let fetched = repo.get_test(&MockTestId::new("mock-1")).await.unwrap();
        assert_eq!(fetched.question_count(), 1);

        let listed = repo.list_tests().await.unwrap();
        let ids: Vec<_> = listed.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["mock-1", "mock-2"]);

        let missing = repo.get_test(&MockTestId::new("nope")).await.unwrap_err();
        assert!(matches!(missing, StorageError::NotFound));
    }

    #[tokio::test]
    async fn results_are_listed_newest_first() {
        let repo = InMemoryRepository::new();
        let first = repo.append_result(&build_result("mock-1")).await.unwrap();
        let second = repo.append_result(&build_result("mock-2")).await.unwrap();
        let third = repo.append_result(&build_result("mock-1")).await.unwrap();
        assert_eq!(first, AttemptId::new(1));

        let recent = repo.list_recent(2).await.unwrap();
        let ids: Vec<_> = recent.iter().map(|r| r.id).collect();
        assert_eq!(ids, [third, second]);

        let for_test = repo.list_for_test(&MockTestId::new("mock-1")).await.unwrap();
        let ids: Vec<_> = for_test.iter().map(|r| r.id).collect();
        assert_eq!(ids, [third, first]);

        assert!(matches!(
            repo.get_result(AttemptId::new(99)).await.unwrap_err(),
            StorageError::NotFound
        ));
    }

    #[test]
    fn storage_errors_describe_themselves() {
        assert_eq!(StorageError::NotFound.to_string(), "not found");
        assert_eq!(
            StorageError::Connection("lock poisoned".into()).to_string(),
            "connection error: lock poisoned"
        );
        assert_eq!(
            StorageError::Serialization("bad".into()).to_string(),
            "serialization error: bad"
        );
    }
}
