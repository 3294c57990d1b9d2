use std::time::Duration;
use thiserror::Error;

use crate::model::question::Language;

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_LOW_TIME_WARNING_SECS: u32 = 300;
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("tick interval must be between 100 and 60000 ms, got {0}")]
    InvalidTickInterval(u64),

    #[error("history limit must be > 0")]
    InvalidHistoryLimit,

    #[error("duration override must be > 0 seconds")]
    InvalidDurationOverride,
}

/// Runtime knobs for mock-test sessions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    tick_interval: Duration,
    low_time_warning_secs: u32,
    history_limit: u32,
    language: Language,
    shuffle_questions: bool,
    duration_override_secs: Option<u32>,
}

#[derive(Clone, Debug, Default)]
pub struct SessionSettingsDraft {
    pub tick_interval_ms: Option<u64>,
    pub low_time_warning_secs: Option<u32>,
    pub history_limit: Option<u32>,
    pub language: Option<Language>,
    pub shuffle_questions: Option<bool>,
    pub duration_override_secs: Option<u32>,
}

impl SessionSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft, filling unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the tick interval is out of range, the
    /// history limit is zero, or a duration override of zero is given.
    pub fn validate(self) -> Result<SessionSettings, SettingsError> {
        let tick_ms = self.tick_interval_ms.unwrap_or(DEFAULT_TICK_INTERVAL_MS);
        if !(100..=60_000).contains(&tick_ms) {
            return Err(SettingsError::InvalidTickInterval(tick_ms));
        }

        let history_limit = self.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        if history_limit == 0 {
            return Err(SettingsError::InvalidHistoryLimit);
        }

        if self.duration_override_secs == Some(0) {
            return Err(SettingsError::InvalidDurationOverride);
        }

        Ok(SessionSettings {
            tick_interval: Duration::from_millis(tick_ms),
            low_time_warning_secs: self
                .low_time_warning_secs
                .unwrap_or(DEFAULT_LOW_TIME_WARNING_SECS),
            history_limit,
            language: self.language.unwrap_or_default(),
            shuffle_questions: self.shuffle_questions.unwrap_or(false),
            duration_override_secs: self.duration_override_secs,
        })
    }
}

impl SessionSettings {
    /// How often the session timer wakes up to tick the countdown.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Remaining time at or below which a low-time warning is raised.
    #[must_use]
    pub fn low_time_warning_secs(&self) -> u32 {
        self.low_time_warning_secs
    }

    #[must_use]
    pub fn history_limit(&self) -> u32 {
        self.history_limit
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn shuffle_questions(&self) -> bool {
        self.shuffle_questions
    }

    /// Replaces the test's own duration when set.
    #[must_use]
    pub fn duration_override_secs(&self) -> Option<u32> {
        self.duration_override_secs
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            low_time_warning_secs: DEFAULT_LOW_TIME_WARNING_SECS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            language: Language::English,
            shuffle_questions: false,
            duration_override_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_draft_yields_defaults() {
        let settings = SessionSettingsDraft::new().validate().unwrap();
        assert_eq!(settings, SessionSettings::default());
        assert_eq!(settings.tick_interval(), Duration::from_secs(1));
        assert_eq!(settings.history_limit(), 50);
    }

    #[test]
    fn rejects_out_of_range_tick_interval() {
        let draft = SessionSettingsDraft {
            tick_interval_ms: Some(50),
            ..SessionSettingsDraft::default()
        };
        assert_eq!(
            draft.validate().unwrap_err(),
            SettingsError::InvalidTickInterval(50)
        );
    }

    #[test]
    fn rejects_zero_history_limit_and_duration() {
        let draft = SessionSettingsDraft {
            history_limit: Some(0),
            ..SessionSettingsDraft::default()
        };
        assert_eq!(draft.validate().unwrap_err(), SettingsError::InvalidHistoryLimit);

        let draft = SessionSettingsDraft {
            duration_override_secs: Some(0),
            ..SessionSettingsDraft::default()
        };
        assert_eq!(
            draft.validate().unwrap_err(),
            SettingsError::InvalidDurationOverride
        );
    }
}
