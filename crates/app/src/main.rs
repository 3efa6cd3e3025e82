mod terminal;

use std::fmt;

use quiz_core::model::{Difficulty, DifficultyError, QuizSettings, SettingsError};
use services::{AppServices, Clock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ui::Navigator;

const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    /// A value parsed but failed domain validation.
    Invalid(quiz_core::Error),
}

impl From<DifficultyError> for ArgsError {
    fn from(err: DifficultyError) -> Self {
        ArgsError::Invalid(err.into())
    }
}

impl From<SettingsError> for ArgsError {
    fn from(err: SettingsError) -> Self {
        ArgsError::Invalid(err.into())
    }
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::Invalid(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Store {
    Sqlite(String),
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    store: Store,
    settings: QuizSettings,
    difficulty: Option<Difficulty>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  quiz [--db <sqlite_url>|memory] [--seconds <n>] [--feedback-ms <n>] [--difficulty <tier>]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --seconds {}", QuizSettings::DEFAULT_QUESTION_SECONDS);
    eprintln!("  --feedback-ms {}", QuizSettings::DEFAULT_FEEDBACK_DELAY_MS);
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_QUESTION_SECONDS, QUIZ_FEEDBACK_MS, RUST_LOG");
}

impl Args {
    /// `Ok(None)` means help was requested.
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ArgsError> {
        let mut store = env("QUIZ_DB_URL")
            .map_or_else(|| Store::Sqlite(DEFAULT_DB_URL.into()), parse_store);
        let mut seconds = env("QUIZ_QUESTION_SECONDS")
            .and_then(|value| value.trim().parse::<u32>().ok())
            .unwrap_or(QuizSettings::DEFAULT_QUESTION_SECONDS);
        let mut feedback_ms = env("QUIZ_FEEDBACK_MS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(QuizSettings::DEFAULT_FEEDBACK_DELAY_MS);
        let mut difficulty = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    store = parse_store(value);
                }
                "--seconds" => {
                    seconds = parse_number("--seconds", require_value(args, "--seconds")?)?;
                }
                "--feedback-ms" => {
                    feedback_ms =
                        parse_number("--feedback-ms", require_value(args, "--feedback-ms")?)?;
                }
                "--difficulty" => {
                    difficulty = Some(require_value(args, "--difficulty")?.parse::<Difficulty>()?);
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let settings = QuizSettings::new(seconds, feedback_ms)?;
        Ok(Some(Self {
            store,
            settings,
            difficulty,
        }))
    }
}

fn parse_store(raw: String) -> Store {
    if raw.trim() == "memory" {
        Store::Memory
    } else {
        Store::Sqlite(normalize_sqlite_url(raw))
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn init_tracing() {
    // Logs go to stderr so they never interleave with the quiz on stdout.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let Some(parsed) = Args::parse(&mut argv, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    let clock = Clock::default();
    let services = match &parsed.store {
        Store::Memory => AppServices::in_memory(clock, parsed.settings),
        Store::Sqlite(db_url) => {
            prepare_sqlite_file(db_url)?;
            AppServices::new_sqlite(db_url, clock, parsed.settings).await?
        }
    };
    tracing::debug!(store = ?parsed.store, settings = ?parsed.settings, "services ready");

    let navigator = parsed
        .difficulty
        .map_or_else(Navigator::new, Navigator::with_difficulty);
    terminal::run(&services, navigator).await
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
