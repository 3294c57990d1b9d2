mod input;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing_subscriber::EnvFilter;

use exam_core::model::{
    AttemptId, Language, MockTestId, OptionId, Question, SessionResult, SessionSettings,
    SessionSettingsDraft, SettingsError, SubmissionKind, Verdict,
};
use exam_core::time::format_countdown;
use services::{ActiveSession, AppServices, Clock, SessionError, SessionEvent};
use storage::repository::StorageError;

use crate::input::{HELP, Input, InputError};

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "exam", version, about = "Timed JEE-style mock tests in the terminal")]
struct Cli {
    /// Timer wake-up interval in milliseconds (100..=60000)
    #[arg(long, env = "EXAM_TICK_MS", value_name = "MS", global = true)]
    tick_ms: Option<u64>,

    /// Replace every test's own duration (seconds)
    #[arg(long, env = "EXAM_DURATION_SECS", value_name = "SECS", global = true)]
    duration_secs: Option<u32>,

    /// Display language: en or hi
    #[arg(long, env = "EXAM_LANGUAGE", default_value = "en", global = true)]
    language: Language,

    /// Maximum number of attempts shown by `history`
    #[arg(long, env = "EXAM_HISTORY_LIMIT", value_name = "N", global = true)]
    history_limit: Option<u32>,

    /// Shuffle questions within each section
    #[arg(long, global = true)]
    shuffle: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available mock tests
    List,
    /// Open the interactive prompt (the default)
    Run {
        /// Start this test right away
        #[arg(long, env = "EXAM_TEST_ID", value_name = "ID")]
        test: Option<String>,
    },
}

impl Cli {
    fn settings(&self) -> Result<SessionSettings, SettingsError> {
        SessionSettingsDraft {
            tick_interval_ms: self.tick_ms,
            low_time_warning_secs: None,
            history_limit: self.history_limit,
            language: Some(self.language),
            shuffle_questions: Some(self.shuffle),
            duration_override_secs: self.duration_secs,
        }
        .validate()
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let settings = cli.settings()?;
    let services = AppServices::in_memory_seeded(Clock::default_clock(), settings).await?;

    match cli.command.unwrap_or(Command::Run { test: None }) {
        Command::List => print_catalog(&services, cli.json).await,
        Command::Run { test } => Shell::new(services, cli.json).run(test).await,
    }
}

async fn print_catalog(services: &AppServices, json: bool) -> AppResult<()> {
    let language = services.settings().language();
    let catalog = services.results().catalog().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    for entry in &catalog {
        let test = &entry.summary;
        let best = entry
            .best_obtained_marks
            .map_or_else(|| "-".to_string(), |marks| marks.to_string());
        println!(
            "{:<8} {:<28} {:>3} questions {:>4} marks {:>3} min  {:<6} best {best}",
            test.id.as_str(),
            test.name.get(language),
            test.total_questions,
            test.total_marks,
            test.duration_minutes,
            test.difficulty.as_str(),
        );
    }
    Ok(())
}

fn submission_label(kind: SubmissionKind) -> &'static str {
    match kind {
        SubmissionKind::Manual => "submitted",
        SubmissionKind::TimeExpired => "time expired",
    }
}

//
// ─── INTERACTIVE SHELL ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Shell {
    services: AppServices,
    language: Language,
    json: bool,
    active: Option<ActiveSession>,
    events: Option<broadcast::Receiver<SessionEvent>>,
}

async fn next_event(
    events: &mut Option<broadcast::Receiver<SessionEvent>>,
) -> Option<SessionEvent> {
    let Some(rx) = events.as_mut() else {
        return std::future::pending().await;
    };
    loop {
        match rx.recv().await {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "display fell behind the session timer");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

impl Shell {
    fn new(services: AppServices, json: bool) -> Self {
        Self {
            language: services.settings().language(),
            services,
            json,
            active: None,
            events: None,
        }
    }

    async fn run(mut self, test: Option<String>) -> AppResult<()> {
        if !self.json {
            println!("type `help` for commands, `list` for tests");
        }
        if let Some(test) = test {
            self.start(&test).await;
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    if self.handle_line(&line).await? == Flow::Quit {
                        break;
                    }
                }
                event = next_event(&mut self.events) => {
                    self.handle_event(event).await;
                }
            }
        }

        if let Some(active) = self.active.take() {
            println!("test abandoned, nothing saved");
            active.close();
        }
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> AppResult<Flow> {
        let input = match line.parse::<Input>() {
            Ok(input) => input,
            Err(InputError::Empty) => return Ok(Flow::Continue),
            Err(err) => {
                eprintln!("{err}");
                return Ok(Flow::Continue);
            }
        };

        match input {
            Input::Quit => return Ok(Flow::Quit),
            Input::Help => println!("{HELP}"),
            Input::List => print_catalog(&self.services, self.json).await?,
            Input::History(test) => self.print_history(test.as_deref()).await?,
            Input::Stats(test) => self.print_stats(test.as_deref()).await?,
            Input::Start(test_id) => self.start(&test_id).await,
            Input::Submit => self.submit().await,
            other => self.session_command(other).await,
        }
        Ok(Flow::Continue)
    }

    async fn handle_event(&mut self, event: Option<SessionEvent>) {
        let Some(event) = event else {
            self.events = None;
            return;
        };

        if self.json && !matches!(event, SessionEvent::Submitted { .. }) {
            match event.to_json() {
                Ok(json) => println!("{json}"),
                Err(err) => eprintln!("could not encode {} event: {err}", event.event_name()),
            }
            return;
        }

        match event {
            SessionEvent::Tick { remaining_secs, .. } => {
                if remaining_secs > 0 && remaining_secs % 300 == 0 {
                    println!("time left {}", format_countdown(remaining_secs));
                }
            }
            SessionEvent::LowTime { remaining_secs } => {
                println!("only {} left", format_countdown(remaining_secs));
            }
            SessionEvent::Submitted { kind, result } => {
                if !self.json {
                    println!("{}", submission_label(kind));
                }
                self.finish(&result).await;
            }
        }
    }

    async fn start(&mut self, test_id: &str) {
        if self.active.is_some() {
            eprintln!("a test is already running; submit or quit first");
            return;
        }

        match self.services.mock_tests().start_test(&MockTestId::new(test_id)).await {
            Ok(active) => {
                self.events = Some(active.subscribe());
                if !self.json {
                    let snapshot = active.snapshot().await;
                    println!(
                        "started {test_id}: {} questions, {}",
                        snapshot.questions.len(),
                        format_countdown(snapshot.total_secs)
                    );
                }
                self.render(&active).await;
                self.active = Some(active);
            }
            Err(SessionError::Storage(StorageError::NotFound)) => {
                eprintln!("no such test: {test_id} (see `list`)");
            }
            Err(err) => eprintln!("could not start {test_id}: {err}"),
        }
    }

    async fn submit(&mut self) {
        let Some(active) = self.active.as_ref() else {
            eprintln!("no test running");
            return;
        };
        match active.submit().await {
            Ok(result) => self.finish(&result).await,
            // The timer got there first; its event finishes the attempt.
            Err(err) if err.is_already_submitted() => println!("time is already up"),
            Err(err) => eprintln!("{err}"),
        }
    }

    async fn session_command(&mut self, input: Input) {
        let Some(active) = self.active.as_ref() else {
            eprintln!("no test running; `start <test-id>` first");
            return;
        };

        let outcome = match input {
            Input::Show => Ok(()),
            Input::Next => active.next().await.map(|moved| {
                if !moved {
                    println!("already at the last question");
                }
            }),
            Input::Previous => active.previous().await.map(|moved| {
                if !moved {
                    println!("already at the first question");
                }
            }),
            Input::Goto(index) => active.navigate(index).await,
            Input::Select(option) => active.select_option(OptionId::new(option)).await.map(|_| ()),
            Input::Mark => active.mark_for_review().await.map(|_| ()),
            Input::Unmark => active.clear_mark().await.map(|_| ()),
            Input::ToggleMark => active.toggle_mark().await.map(|_| ()),
            Input::Clear => active.clear_response().await.map(|_| ()),
            Input::Pause => {
                match active.pause().await {
                    Ok(_) => println!("paused"),
                    Err(err) => eprintln!("{err}"),
                }
                return;
            }
            Input::Resume => {
                match active.resume().await {
                    Ok(_) => println!("resumed"),
                    Err(err) => eprintln!("{err}"),
                }
                return;
            }
            _ => return,
        };

        match outcome {
            Ok(()) => self.render(active).await,
            Err(SessionError::UnknownOption { option_id }) => {
                eprintln!("no option `{option_id}` on this question");
            }
            Err(err) => eprintln!("{err}"),
        }
    }

    async fn finish(&mut self, result: &SessionResult) {
        self.events = None;
        let Some(active) = self.active.take() else {
            return;
        };

        let attempt = match self.services.mock_tests().persist_result(&active).await {
            Ok(id) => Some(id),
            Err(err) => {
                eprintln!("could not save the result: {err}");
                None
            }
        };
        let questions = active.shared().lock().await.questions().to_vec();
        active.close();
        if let Err(err) = self.print_result(attempt, result, &questions) {
            eprintln!("could not print the result: {err}");
        }
    }

    async fn render(&self, active: &ActiveSession) {
        if self.json {
            match serde_json::to_string(&active.snapshot().await) {
                Ok(json) => println!("{json}"),
                Err(err) => eprintln!("could not encode the snapshot: {err}"),
            }
            return;
        }

        let Some(current) = active.current().await else {
            return;
        };
        let progress = active.progress().await;
        let section = current
            .section_name
            .as_ref()
            .map(|name| format!(" {}", name.get(self.language)))
            .unwrap_or_default();

        println!();
        println!(
            "Q{}/{}{section} [{}]  {} left",
            current.index + 1,
            current.total,
            current.state.status().as_str(),
            format_countdown(progress.remaining_secs),
        );
        println!("{}", current.question.prompt().get(self.language));
        for option in current.question.options() {
            let marker = if current.state.selected() == Some(&option.id) {
                '*'
            } else {
                ' '
            };
            println!(" {marker} {}) {}", option.id, option.text.get(self.language));
        }
        println!(
            "answered {}, marked {}, not answered {}",
            progress.attempted(),
            progress.marked + progress.marked_answered,
            progress.total - progress.attempted(),
        );
    }

    fn print_result(
        &self,
        attempt: Option<AttemptId>,
        result: &SessionResult,
        questions: &[Question],
    ) -> AppResult<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(result)?);
            return Ok(());
        }

        if let Some(name) = result.test_name() {
            println!("{}", name.get(self.language));
        }
        if let Some(id) = attempt {
            println!("attempt #{id}");
        }
        println!(
            "score {}/{} ({:.1}%)",
            result.obtained_marks(),
            result.total_marks(),
            result.percentage()
        );
        println!(
            "correct {}, wrong {}, unanswered {}",
            result.correct(),
            result.wrong(),
            result.unanswered()
        );
        println!(
            "time taken {} of {} ({})",
            format_countdown(result.time_taken_secs()),
            format_countdown(result.allotted_secs()),
            submission_label(result.submission()),
        );
        for section in result.sections() {
            println!(
                "  {:<20} {:>4}/{:<4} correct {} wrong {} unanswered {}",
                section.section_name.get(self.language),
                section.obtained_marks,
                section.total_marks,
                section.correct,
                section.wrong,
                section.unanswered,
            );
        }

        let wrong = result
            .outcomes()
            .iter()
            .enumerate()
            .filter(|(_, outcome)| outcome.verdict == Verdict::Wrong);
        for (index, outcome) in wrong {
            let answer = |option: Option<&OptionId>| {
                option.map_or_else(|| "-".to_string(), ToString::to_string)
            };
            println!(
                "Q{}: chose {}, correct {}",
                index + 1,
                answer(outcome.selected.as_ref()),
                answer(outcome.correct_option.as_ref()),
            );
            let explanation = questions
                .iter()
                .find(|question| question.id() == &outcome.question_id)
                .and_then(Question::explanation);
            if let Some(explanation) = explanation {
                println!("    {}", explanation.get(self.language));
            }
        }
        Ok(())
    }

    async fn print_history(&self, test: Option<&str>) -> AppResult<()> {
        let results = self.services.results();
        let items = match test {
            Some(test_id) => results.list_for_test(&MockTestId::new(test_id)).await?,
            None => {
                results
                    .list_recent(self.services.settings().history_limit())
                    .await?
            }
        };
        if self.json {
            println!("{}", serde_json::to_string_pretty(&items)?);
            return Ok(());
        }

        if items.is_empty() {
            println!("no attempts yet");
        }
        for item in &items {
            let name = item
                .test_name
                .as_ref()
                .map_or("ad-hoc", |name| name.get(self.language));
            println!(
                "#{:<3} {:<28} {:>4}/{:<4} {:>6.1}%  {}  {}",
                item.id.value(),
                name,
                item.obtained_marks,
                item.total_marks,
                item.percentage,
                format_countdown(item.time_taken_secs),
                submission_label(item.submission),
            );
        }
        Ok(())
    }

    async fn print_stats(&self, test: Option<&str>) -> AppResult<()> {
        let results = self.services.results();
        let stats = match test {
            Some(test_id) => results.stats_for_test(&MockTestId::new(test_id)).await?,
            None => results.stats().await?,
        };
        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        match (stats.average_percentage, stats.best_percentage) {
            (Some(average), Some(best)) => println!(
                "{} attempts, average {average:.1}%, best {best:.1}%",
                stats.attempts
            ),
            _ => println!("no attempts yet"),
        }
        Ok(())
    }
}
