use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use exam_core::model::{SessionResult, SessionSettings, SubmissionKind};

use super::service::{MockTestSession, TickOutcome};
use crate::Clock;

/// The single lock every session mutation goes through.
pub type SharedSession = Arc<Mutex<MockTestSession>>;

/// Events broadcast to whoever renders a running session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SessionEvent {
    Tick {
        remaining_secs: u32,
        elapsed_secs: u32,
        total_secs: u32,
    },
    LowTime {
        remaining_secs: u32,
    },
    Submitted {
        kind: SubmissionKind,
        result: Box<SessionResult>,
    },
}

impl SessionEvent {
    /// # Errors
    ///
    /// Returns the `serde_json` error if the event cannot be serialized.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    #[must_use]
    pub fn event_name(&self) -> &'static str {
        match self {
            SessionEvent::Tick { .. } => "tick",
            SessionEvent::LowTime { .. } => "low-time",
            SessionEvent::Submitted { .. } => "submitted",
        }
    }

    pub(crate) fn submitted(kind: SubmissionKind, result: &SessionResult) -> Self {
        SessionEvent::Submitted {
            kind,
            result: Box::new(result.clone()),
        }
    }
}

//
// ─── TIMER ─────────────────────────────────────────────────────────────────────
//

/// Background countdown for one session.
///
/// Wakes every `tick_interval`, converts the monotonic time since the last
/// wake-up into whole seconds (carrying the remainder) and feeds them to
/// `MockTestSession::tick` under the session lock.
pub struct SessionTimer {
    session: SharedSession,
    events: broadcast::Sender<SessionEvent>,
    clock: Clock,
    tick_interval: Duration,
    low_time_warning_secs: u32,
}

impl SessionTimer {
    /// Spawn the countdown task. Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(
        session: SharedSession,
        settings: &SessionSettings,
        clock: Clock,
        events: broadcast::Sender<SessionEvent>,
    ) -> TimerHandle {
        let timer = Self {
            session,
            events,
            clock,
            tick_interval: settings.tick_interval(),
            low_time_warning_secs: settings.low_time_warning_secs(),
        };
        TimerHandle {
            task: tokio::spawn(timer.run()),
        }
    }

    async fn run(self) {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        tracing::debug!(interval = ?self.tick_interval, "session timer started");

        let mut last = Instant::now();
        let mut carry = Duration::ZERO;
        let mut warned = false;

        loop {
            interval.tick().await;
            let now = Instant::now();
            carry += now.duration_since(last);
            last = now;

            let whole_secs = carry.as_secs();
            if whole_secs == 0 {
                continue;
            }
            carry -= Duration::from_secs(whole_secs);
            let elapsed = u32::try_from(whole_secs).unwrap_or(u32::MAX);

            let mut session = self.session.lock().await;
            match session.tick(elapsed, self.clock.now()) {
                Ok(TickOutcome::Counting { remaining_secs }) => {
                    self.emit_tick(remaining_secs, session.total_duration());
                    if !warned && remaining_secs <= self.low_time_warning_secs {
                        warned = true;
                        self.emit(SessionEvent::LowTime { remaining_secs });
                    }
                }
                Ok(TickOutcome::Paused { .. }) => {}
                Ok(TickOutcome::AutoSubmitted) => {
                    self.emit_tick(0, session.total_duration());
                    if let Some(result) = session.result() {
                        self.emit(SessionEvent::submitted(SubmissionKind::TimeExpired, result));
                    }
                    tracing::info!("time expired, session auto-submitted");
                    break;
                }
                Ok(TickOutcome::AlreadySubmitted) => {
                    tracing::debug!("session already submitted, timer stopping");
                    break;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "session timer stopped");
                    break;
                }
            }
        }
    }

    fn emit_tick(&self, remaining_secs: u32, total_secs: u32) {
        self.emit(SessionEvent::Tick {
            remaining_secs,
            elapsed_secs: total_secs.saturating_sub(remaining_secs),
            total_secs,
        });
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Owner of a running timer task. Dropping it stops the timer.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Stop the timer. Safe to call more than once.
    pub fn cancel(&self) {
        if !self.task.is_finished() {
            tracing::debug!("session timer cancelled");
        }
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
