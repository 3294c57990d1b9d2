use rand::rng;
use rand::seq::SliceRandom;
use std::sync::Arc;

use exam_core::model::{AttemptId, MockTestId, Question, SessionSettings};
use storage::repository::{QuestionBank, ResultsRepository};

use super::active::ActiveSession;
use super::service::MockTestSession;
use crate::error::SessionError;
use crate::Clock;

/// Orchestrates session start and result persistence.
#[derive(Clone)]
pub struct MockTestService {
    clock: Clock,
    settings: SessionSettings,
    bank: Arc<dyn QuestionBank>,
    results: Arc<dyn ResultsRepository>,
}

impl MockTestService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: SessionSettings,
        bank: Arc<dyn QuestionBank>,
        results: Arc<dyn ResultsRepository>,
    ) -> Self {
        Self {
            clock,
            settings,
            bank,
            results,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Load a test from the question bank and return it as a started session,
    /// without spawning a timer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the test cannot be loaded, or the
    /// engine's start errors.
    pub async fn prepare(&self, test_id: &MockTestId) -> Result<MockTestSession, SessionError> {
        let mut test = self.bank.get_test(test_id).await?;
        if self.settings.shuffle_questions() {
            let mut rng = rng();
            test = test.with_reordered_sections(|questions| questions.shuffle(&mut rng));
        }

        let duration = self
            .settings
            .duration_override_secs()
            .unwrap_or(test.duration_secs());

        let mut session = MockTestSession::new();
        session.start_test(&test, duration, self.clock.now())?;
        Ok(session)
    }

    /// Start a catalog test and its countdown. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Same as [`MockTestService::prepare`].
    pub async fn start_test(&self, test_id: &MockTestId) -> Result<ActiveSession, SessionError> {
        let session = self.prepare(test_id).await?;
        Ok(ActiveSession::launch(session, &self.settings, self.clock))
    }

    /// Start a session over a bare question list. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidConfiguration` for an empty list or zero duration.
    pub fn start_adhoc(
        &self,
        questions: Vec<Question>,
        duration_secs: u32,
    ) -> Result<ActiveSession, SessionError> {
        let mut session = MockTestSession::new();
        session.start(questions, duration_secs, self.clock.now())?;
        Ok(ActiveSession::launch(session, &self.settings, self.clock))
    }

    /// Persist the submitted result once and remember its attempt id.
    ///
    /// Calling again after success returns the same id without writing;
    /// calling again after a storage failure retries the write.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` if the session is not submitted yet.
    /// Returns `SessionError::Storage` if persistence fails.
    pub async fn persist_result(&self, active: &ActiveSession) -> Result<AttemptId, SessionError> {
        let shared = active.shared();
        let result = {
            let session = shared.lock().await;
            if let Some(id) = session.attempt_id() {
                return Ok(id);
            }
            match session.result() {
                Some(result) => result.clone(),
                None => {
                    return Err(SessionError::InvalidState {
                        phase: session.phase(),
                    });
                }
            }
        };

        // The session lock is not held across the write.
        let id = self.results.append_result(&result).await?;

        let mut session = shared.lock().await;
        if let Some(existing) = session.attempt_id() {
            tracing::warn!(
                attempt_id = %existing,
                duplicate = %id,
                "result persisted concurrently; keeping the first attempt id"
            );
            return Ok(existing);
        }
        session.set_attempt_id(id);
        tracing::info!(attempt_id = %id, "session result persisted");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{OptionId, SessionPhase, SessionResult, SessionSettingsDraft};
    use exam_core::time::fixed_clock;
    use std::time::Duration;
    use storage::repository::{InMemoryRepository, Storage, StorageError, StoredResult};

    async fn service(draft: SessionSettingsDraft) -> (MockTestService, Storage) {
        let storage = Storage::in_memory_seeded().await.unwrap();
        let service = MockTestService::new(
            fixed_clock(),
            draft.validate().unwrap(),
            Arc::clone(&storage.question_bank),
            Arc::clone(&storage.results),
        );
        (service, storage)
    }

    #[tokio::test]
    async fn prepare_uses_test_duration_unless_overridden() {
        let (plain, _) = service(SessionSettingsDraft::default()).await;
        let session = plain.prepare(&MockTestId::new("mock-4")).await.unwrap();
        assert_eq!(session.total_duration(), 30 * 60);
        assert_eq!(session.questions().len(), 15);

        let (overridden, _) = service(SessionSettingsDraft {
            duration_override_secs: Some(90),
            ..SessionSettingsDraft::default()
        })
        .await;
        let session = overridden.prepare(&MockTestId::new("mock-4")).await.unwrap();
        assert_eq!(session.total_duration(), 90);
    }

    #[tokio::test]
    async fn shuffle_keeps_questions_within_their_sections() {
        let (service, _) = service(SessionSettingsDraft {
            shuffle_questions: Some(true),
            ..SessionSettingsDraft::default()
        })
        .await;
        let session = service.prepare(&MockTestId::new("mock-2")).await.unwrap();

        let ids: Vec<&str> = session.questions().iter().map(|q| q.id().as_str()).collect();
        assert_eq!(ids.len(), 25);
        assert!(ids[..13].iter().all(|id| id.starts_with("mock-2-calculus-q")));
        assert!(ids[13..].iter().all(|id| id.starts_with("mock-2-algebra-q")));
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 25);
    }

    #[tokio::test]
    async fn unknown_test_is_not_found() {
        let (service, _) = service(SessionSettingsDraft::default()).await;
        let err = service.start_test(&MockTestId::new("nope")).await.unwrap_err();
        assert!(matches!(err, SessionError::Storage(StorageError::NotFound)));
    }

    #[tokio::test]
    async fn persist_result_is_idempotent() {
        let (service, storage) = service(SessionSettingsDraft::default()).await;
        let active = service.start_test(&MockTestId::new("mock-1")).await.unwrap();

        let err = service.persist_result(&active).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidState {
                phase: SessionPhase::Running
            }
        ));

        active.select_option(OptionId::new("a")).await.unwrap();
        active.submit().await.unwrap();

        let first = service.persist_result(&active).await.unwrap();
        let second = service.persist_result(&active).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(storage.results.list_recent(10).await.unwrap().len(), 1);

        let stored = storage.results.get_result(first).await.unwrap();
        assert_eq!(stored.obtained_marks(), 4);
    }

    /// Results store whose writes wait until the test lets them through.
    struct GatedResults {
        inner: InMemoryRepository,
        gate: Arc<tokio::sync::Notify>,
    }

    #[async_trait::async_trait]
    impl ResultsRepository for GatedResults {
        async fn append_result(&self, result: &SessionResult) -> Result<AttemptId, StorageError> {
            self.gate.notified().await;
            self.inner.append_result(result).await
        }

        async fn get_result(&self, id: AttemptId) -> Result<SessionResult, StorageError> {
            self.inner.get_result(id).await
        }

        async fn list_recent(&self, limit: u32) -> Result<Vec<StoredResult>, StorageError> {
            self.inner.list_recent(limit).await
        }

        async fn list_for_test(
            &self,
            test_id: &MockTestId,
        ) -> Result<Vec<StoredResult>, StorageError> {
            self.inner.list_for_test(test_id).await
        }
    }

    #[tokio::test]
    async fn session_stays_readable_while_result_is_written() {
        let storage = Storage::in_memory_seeded().await.unwrap();
        let gate = Arc::new(tokio::sync::Notify::new());
        let results = Arc::new(GatedResults {
            inner: InMemoryRepository::new(),
            gate: Arc::clone(&gate),
        });
        let service = Arc::new(MockTestService::new(
            fixed_clock(),
            SessionSettings::default(),
            Arc::clone(&storage.question_bank),
            Arc::clone(&results) as Arc<dyn ResultsRepository>,
        ));
        let active = Arc::new(service.start_test(&MockTestId::new("mock-4")).await.unwrap());
        active.submit().await.unwrap();

        let writer = {
            let service = Arc::clone(&service);
            let active = Arc::clone(&active);
            tokio::spawn(async move { service.persist_result(&active).await })
        };
        tokio::task::yield_now().await;

        let snapshot = tokio::time::timeout(Duration::from_secs(1), active.snapshot())
            .await
            .unwrap();
        assert_eq!(snapshot.phase, SessionPhase::Submitted);

        gate.notify_one();
        let id = writer.await.unwrap().unwrap();
        assert_eq!(service.persist_result(&active).await.unwrap(), id);
        assert_eq!(results.inner.list_recent(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn adhoc_rejects_empty_question_list() {
        let (service, _) = service(SessionSettingsDraft::default()).await;
        assert!(matches!(
            service.start_adhoc(Vec::new(), 60),
            Err(SessionError::InvalidConfiguration(_))
        ));
    }
}
