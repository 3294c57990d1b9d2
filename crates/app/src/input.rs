use std::fmt;
use std::str::FromStr;

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    List,
    Start(String),
    /// Optionally limited to one test.
    History(Option<String>),
    Stats(Option<String>),
    Show,
    Next,
    Previous,
    /// Zero-based target; typed one-based.
    Goto(usize),
    Select(String),
    Mark,
    Unmark,
    ToggleMark,
    Clear,
    Pause,
    Resume,
    Submit,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    Empty,
    Unknown(String),
    MissingArgument { command: &'static str },
    InvalidQuestionNumber(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Empty => write!(f, "empty command"),
            InputError::Unknown(raw) => write!(f, "unknown command: {raw} (try `help`)"),
            InputError::MissingArgument { command } => write!(f, "`{command}` needs an argument"),
            InputError::InvalidQuestionNumber(raw) => {
                write!(f, "question numbers start at 1, got {raw}")
            }
        }
    }
}

impl std::error::Error for InputError {}

fn argument<'a>(
    rest: Option<&'a str>,
    command: &'static str,
) -> Result<&'a str, InputError> {
    rest.map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(InputError::MissingArgument { command })
}

fn optional_argument(rest: Option<&str>) -> Option<String> {
    rest.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl FromStr for Input {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(InputError::Empty);
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, Some(rest)),
            None => (line, None),
        };

        match head.to_ascii_lowercase().as_str() {
            "list" | "l" => Ok(Input::List),
            "start" => Ok(Input::Start(argument(rest, "start")?.to_string())),
            "history" | "h" => Ok(Input::History(optional_argument(rest))),
            "stats" => Ok(Input::Stats(optional_argument(rest))),
            "show" | "." => Ok(Input::Show),
            "n" | "next" => Ok(Input::Next),
            "p" | "prev" => Ok(Input::Previous),
            "g" | "goto" => {
                let raw = argument(rest, "g")?;
                raw.parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .map(Input::Goto)
                    .ok_or_else(|| InputError::InvalidQuestionNumber(raw.to_string()))
            }
            "s" | "select" => Ok(Input::Select(argument(rest, "s")?.to_ascii_lowercase())),
            "m" | "mark" => Ok(Input::Mark),
            "u" | "unmark" => Ok(Input::Unmark),
            "t" | "toggle" => Ok(Input::ToggleMark),
            "c" | "clear" => Ok(Input::Clear),
            "pause" => Ok(Input::Pause),
            "resume" => Ok(Input::Resume),
            "submit" => Ok(Input::Submit),
            "help" | "?" => Ok(Input::Help),
            "quit" | "q" | "exit" => Ok(Input::Quit),
            _ => Err(InputError::Unknown(head.to_string())),
        }
    }
}

pub const HELP: &str = "\
commands:
  list                 show available tests
  start <test-id>      begin a test
  history [test-id]    past attempts in this run
  stats [test-id]      average and best percentage
while a test is running:
  n / p                next / previous question
  g <n>                go to question n
  s <option>           select an option (e.g. `s b`)
  m / u / t            mark, unmark, toggle review flag
  c                    clear the response
  show                 reprint the current question
  pause / resume       stop or restart the countdown
  submit               submit the test
  quit                 leave (a running test is abandoned)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_commands() {
        assert_eq!("n".parse::<Input>().unwrap(), Input::Next);
        assert_eq!(" P ".parse::<Input>().unwrap(), Input::Previous);
        assert_eq!("g 3".parse::<Input>().unwrap(), Input::Goto(2));
        assert_eq!("s B".parse::<Input>().unwrap(), Input::Select("b".into()));
        assert_eq!("submit".parse::<Input>().unwrap(), Input::Submit);
        assert_eq!("start mock-4".parse::<Input>().unwrap(), Input::Start("mock-4".into()));
    }

    #[test]
    fn history_and_stats_take_an_optional_test() {
        assert_eq!("history".parse::<Input>().unwrap(), Input::History(None));
        assert_eq!(
            "h mock-2".parse::<Input>().unwrap(),
            Input::History(Some("mock-2".into()))
        );
        assert_eq!("stats  ".parse::<Input>().unwrap(), Input::Stats(None));
        assert_eq!(
            "stats mock-1".parse::<Input>().unwrap(),
            Input::Stats(Some("mock-1".into()))
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        assert_eq!("".parse::<Input>().unwrap_err(), InputError::Empty);
        assert_eq!(
            "g".parse::<Input>().unwrap_err(),
            InputError::MissingArgument { command: "g" }
        );
        assert_eq!(
            "g 0".parse::<Input>().unwrap_err(),
            InputError::InvalidQuestionNumber("0".into())
        );
        assert_eq!(
            "g x".parse::<Input>().unwrap_err(),
            InputError::InvalidQuestionNumber("x".into())
        );
        assert_eq!(
            "jump".parse::<Input>().unwrap_err(),
            InputError::Unknown("jump".into())
        );
    }
}
