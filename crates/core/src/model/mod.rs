mod ids;
mod mock_test;
mod question;
mod question_state;
mod result;
mod session;
mod settings;

pub use ids::{AttemptId, MockTestId, OptionId, ParseIdError, QuestionId, SectionId};
pub use mock_test::{MockTest, MockTestError, MockTestSummary, Section};
pub use question::{
    Difficulty, Language, LocalizedText, Marks, Question, QuestionDraft, QuestionError,
    QuestionOption,
};
pub use question_state::{QuestionState, QuestionStatus};
pub use result::{QuestionOutcome, ResultHeader, SectionResult, SessionResult, Verdict};
pub use session::{SessionPhase, SubmissionKind};
pub use settings::{SessionSettings, SessionSettingsDraft, SettingsError};
