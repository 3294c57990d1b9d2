use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle stage of a mock-test session. `Submitted` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionPhase {
    #[default]
    NotStarted,
    Running,
    Submitted,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::NotStarted => "not-started",
            SessionPhase::Running => "running",
            SessionPhase::Submitted => "submitted",
        };
        f.write_str(name)
    }
}

/// How a session reached `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionKind {
    /// The candidate submitted explicitly.
    Manual,
    /// The countdown reached zero.
    TimeExpired,
}
