mod active;
mod progress;
mod queries;
mod service;
mod timer;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::{ConfigurationError, SessionError};
pub use active::ActiveSession;
pub use progress::{CurrentQuestion, SessionProgress, SessionSnapshot};
pub use queries::AttemptStats;
pub use service::{MockTestSession, TickOutcome};
pub use timer::{SessionEvent, SessionTimer, SharedSession, TimerHandle};
pub use view::{AttemptListItem, CatalogEntry, ResultsService};
pub use workflow::MockTestService;
