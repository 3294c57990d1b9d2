use std::sync::Arc;

use exam_core::model::SessionSettings;
use storage::repository::Storage;

use crate::error::SessionError;
use crate::sessions::{MockTestService, ResultsService};
use crate::Clock;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    settings: SessionSettings,
    mock_tests: Arc<MockTestService>,
    results: Arc<ResultsService>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock, settings: SessionSettings) -> Self {
        let mock_tests = Arc::new(MockTestService::new(
            clock,
            settings.clone(),
            Arc::clone(&storage.question_bank),
            Arc::clone(&storage.results),
        ));
        let results = Arc::new(ResultsService::new(
            settings.clone(),
            Arc::clone(&storage.question_bank),
            Arc::clone(&storage.results),
        ));

        Self {
            settings,
            mock_tests,
            results,
        }
    }

    /// Build services over in-memory storage holding the sample catalog.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the catalog cannot be loaded.
    pub async fn in_memory_seeded(
        clock: Clock,
        settings: SessionSettings,
    ) -> Result<Self, SessionError> {
        let storage = Storage::in_memory_seeded().await?;
        tracing::debug!("in-memory storage seeded with sample catalog");
        Ok(Self::new(&storage, clock, settings))
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub fn mock_tests(&self) -> Arc<MockTestService> {
        Arc::clone(&self.mock_tests)
    }

    #[must_use]
    pub fn results(&self) -> Arc<ResultsService> {
        Arc::clone(&self.results)
    }
}
