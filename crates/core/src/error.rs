use thiserror::Error;

use crate::model::{MockTestError, QuestionError, SettingsError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    MockTest(#[from] MockTestError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
