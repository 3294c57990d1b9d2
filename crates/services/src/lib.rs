#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod sessions;

pub use exam_core::Clock;

pub use app_services::AppServices;
pub use error::{ConfigurationError, SessionError};
pub use sessions::{
    ActiveSession, AttemptListItem, AttemptStats, CatalogEntry, CurrentQuestion, MockTestService,
    MockTestSession, ResultsService, SessionEvent, SessionProgress, SessionSnapshot, TickOutcome,
};
