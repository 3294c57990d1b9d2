//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::{OptionId, SessionPhase};
use storage::repository::StorageError;

/// Why `start` rejected its arguments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigurationError {
    #[error("no questions supplied")]
    NoQuestions,
    #[error("total duration must be > 0 seconds")]
    ZeroDuration,
}

/// Errors emitted by session services.
///
/// Everything except `Storage` comes from the engine, which never leaves a
/// session partially mutated.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("invalid session configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),
    #[error("operation not allowed while session is {phase}")]
    InvalidState { phase: SessionPhase },
    #[error("option {option_id} does not belong to the current question")]
    UnknownOption { option_id: OptionId },
    #[error("question index {index} out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// True when the error reports that the session has already been submitted.
    #[must_use]
    pub fn is_already_submitted(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidState {
                phase: SessionPhase::Submitted
            }
        )
    }
}
