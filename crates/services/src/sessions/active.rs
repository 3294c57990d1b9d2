use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use exam_core::model::{
    OptionId, QuestionStatus, SessionResult, SessionSettings, SubmissionKind,
};

use super::progress::{CurrentQuestion, SessionProgress, SessionSnapshot};
use super::service::MockTestSession;
use super::timer::{SessionEvent, SessionTimer, SharedSession, TimerHandle};
use crate::error::SessionError;
use crate::Clock;

const EVENT_CAPACITY: usize = 64;

/// Presentation-facing handle to a running session.
///
/// Every call takes the session lock, so user actions and timer ticks are
/// applied one at a time. Dropping the handle stops the timer.
pub struct ActiveSession {
    session: SharedSession,
    events: broadcast::Sender<SessionEvent>,
    timer: TimerHandle,
    clock: Clock,
}

impl std::fmt::Debug for ActiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSession").finish_non_exhaustive()
    }
}

impl ActiveSession {
    /// Wrap an already started session and spawn its timer.
    pub(crate) fn launch(session: MockTestSession, settings: &SessionSettings, clock: Clock) -> Self {
        let session = Arc::new(Mutex::new(session));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let timer = SessionTimer::spawn(Arc::clone(&session), settings, clock, events.clone());
        Self {
            session,
            events,
            timer,
            clock,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// The shared session, for callers that need to hold the lock across several reads.
    #[must_use]
    pub fn shared(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    /// # Errors
    ///
    /// See [`MockTestSession::select_option`].
    pub async fn select_option(&self, option_id: OptionId) -> Result<QuestionStatus, SessionError> {
        self.session.lock().await.select_option(option_id)
    }

    /// # Errors
    ///
    /// See [`MockTestSession::mark_for_review`].
    pub async fn mark_for_review(&self) -> Result<QuestionStatus, SessionError> {
        self.session.lock().await.mark_for_review()
    }

    /// # Errors
    ///
    /// See [`MockTestSession::clear_mark`].
    pub async fn clear_mark(&self) -> Result<QuestionStatus, SessionError> {
        self.session.lock().await.clear_mark()
    }

    /// # Errors
    ///
    /// See [`MockTestSession::toggle_mark`].
    pub async fn toggle_mark(&self) -> Result<QuestionStatus, SessionError> {
        self.session.lock().await.toggle_mark()
    }

    /// # Errors
    ///
    /// See [`MockTestSession::clear_response`].
    pub async fn clear_response(&self) -> Result<QuestionStatus, SessionError> {
        self.session.lock().await.clear_response()
    }

    /// # Errors
    ///
    /// See [`MockTestSession::navigate`].
    pub async fn navigate(&self, index: usize) -> Result<(), SessionError> {
        self.session.lock().await.navigate(index)
    }

    /// # Errors
    ///
    /// See [`MockTestSession::next`].
    pub async fn next(&self) -> Result<bool, SessionError> {
        self.session.lock().await.next()
    }

    /// # Errors
    ///
    /// See [`MockTestSession::previous`].
    pub async fn previous(&self) -> Result<bool, SessionError> {
        self.session.lock().await.previous()
    }

    /// # Errors
    ///
    /// See [`MockTestSession::pause`].
    pub async fn pause(&self) -> Result<bool, SessionError> {
        self.session.lock().await.pause()
    }

    /// # Errors
    ///
    /// See [`MockTestSession::resume`].
    pub async fn resume(&self) -> Result<bool, SessionError> {
        self.session.lock().await.resume()
    }

    /// Submit manually, stop the timer and broadcast the result.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` if the timer already submitted the session.
    pub async fn submit(&self) -> Result<SessionResult, SessionError> {
        let mut session = self.session.lock().await;
        let result = match session.submit(self.clock.now()) {
            Ok(result) => result.clone(),
            Err(err) => {
                if err.is_already_submitted() {
                    tracing::debug!("manual submit lost to an earlier submission");
                }
                return Err(err);
            }
        };
        self.timer.cancel();
        let _ = self
            .events
            .send(SessionEvent::submitted(SubmissionKind::Manual, &result));
        Ok(result)
    }

    pub async fn current(&self) -> Option<CurrentQuestion> {
        self.session.lock().await.current()
    }

    pub async fn progress(&self) -> SessionProgress {
        self.session.lock().await.progress()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn result(&self) -> Option<SessionResult> {
        self.session.lock().await.result().cloned()
    }

    pub async fn is_submitted(&self) -> bool {
        self.session.lock().await.is_submitted()
    }

    /// Stop the timer without submitting.
    pub fn close(self) {
        self.timer.cancel();
    }
}
