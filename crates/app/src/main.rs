use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use lesson_core::model::{ExerciseKind, LessonId, PairSide, SessionRules, UserId};
use services::{
    Advance, AppServices, Clock, LearnerContext, LessonApiConfig, LessonSession, LessonStatus,
    ProgressUpdate, ReportOutcome, SessionError,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

/// Progress file in the working directory. `sqlite::memory:` is private to
/// each pooled connection, so local progress needs a file.
const DEFAULT_DB_URL: &str = "sqlite://kira-lesson.sqlite3";

/// Play a Kira lesson in the terminal.
///
/// Questions are fetched from the lesson API; the attempt is reported back
/// when the lesson completes. Local progress is kept in `SQLite`.
#[derive(Parser, Debug)]
#[command(name = "kira-lesson")]
#[command(version, about, long_about = None)]
struct Args {
    /// Lesson (quiz) id to play
    #[arg(short, long, env = "KIRA_LESSON_ID")]
    lesson: u64,

    /// Learner id used for local progress
    #[arg(short, long, env = "KIRA_USER")]
    user: String,

    /// Topic the weekly high score is filed under
    #[arg(short, long, default_value = "general")]
    topic: String,

    /// SQLite database for local progress
    #[arg(long, env = "KIRA_DB_URL", default_value = DEFAULT_DB_URL)]
    db: String,

    /// Lesson API base url (falls back to KIRA_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Bearer token for the lesson API (falls back to KIRA_API_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Request timeout in seconds (falls back to KIRA_API_TIMEOUT_SECS, then 10)
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Shuffle answer choices
    #[arg(long)]
    shuffle: bool,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG wins over --verbose
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let api = api_config(&args)?;
    tracing::debug!(base_url = %api.base_url(), timeout = ?api.timeout(), "lesson API");

    let db_url = normalize_sqlite_url(&args.db);
    prepare_sqlite_file(&db_url)?;
    let services = AppServices::new_sqlite(
        &db_url,
        Clock::System,
        api,
        SessionRules::default(),
        args.shuffle,
    )
    .await
    .with_context(|| format!("opening {db_url}"))?;

    let learner = LearnerContext::new(
        UserId::new(args.user.clone()).context("--user must not be blank")?,
        args.topic.clone(),
    );
    play(&services, &learner, LessonId::new(args.lesson)).await
}

fn api_config(args: &Args) -> anyhow::Result<LessonApiConfig> {
    let config = match &args.api_url {
        Some(url) => LessonApiConfig::new(url)?.with_token(std::env::var("KIRA_API_TOKEN").ok()),
        None => LessonApiConfig::from_env()
            .context("set --api-url or KIRA_API_URL to reach the lesson API")?,
    };
    let config = match &args.token {
        Some(token) => config.with_token(Some(token.clone())),
        None => config,
    };
    Ok(match args.timeout_secs {
        Some(secs) => config.with_timeout(Duration::from_secs(secs)),
        None => config,
    })
}

//
// ─── PLAY LOOP ─────────────────────────────────────────────────────────────────
//

type Input = Lines<BufReader<Stdin>>;

async fn play(services: &AppServices, learner: &LearnerContext, lesson_id: LessonId) -> anyhow::Result<()> {
    let lesson_loop = services.lesson_loop();
    let Some(mut session) = lesson_loop.start_lesson(lesson_id).await? else {
        println!("Lesson {lesson_id} has no exercises right now. Try again later.");
        return Ok(());
    };
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        render(&session);
        let Some(line) = input.next_line().await? else {
            return Ok(());
        };
        let line = line.trim();
        if line == "q" {
            println!("Left the lesson.");
            return Ok(());
        }

        match apply(&mut session, line) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(SessionError::NoAnswer) => {
                println!("Answer first, then check.");
                continue;
            }
            Err(err) => {
                println!("{err}");
                continue;
            }
        }

        show_feedback(&session);
        wait_for_enter(&mut input).await?;
        let result = lesson_loop.advance(&mut session, learner).await?;
        match result.advance {
            Advance::Completed(summary) => {
                println!(
                    "\nLesson complete: {} of {} correct, +{} XP.",
                    summary.pass_count(),
                    summary.total(),
                    summary.xp_earned()
                );
                if result.report == Some(ReportOutcome::Dropped) {
                    println!("(The result could not be sent. It is kept locally only.)");
                }
                if let Some(update) = &result.progress {
                    show_progress(update);
                }
                return Ok(());
            }
            Advance::Failed => {
                println!("\nOut of lives. Lesson failed, try again!");
                return Ok(());
            }
            Advance::Next { .. } | Advance::Unchanged => {}
        }
    }
}

/// Apply one line of input. Returns `true` once the step was submitted.
fn apply(session: &mut LessonSession, line: &str) -> Result<bool, SessionError> {
    let kind = session.current_exercise().kind().clone();
    if line.is_empty() || line == "c" {
        session.submit()?;
        return Ok(true);
    }

    match kind {
        ExerciseKind::WordArrangement => {
            let Some(n) = parse_index(line) else {
                return Err(SessionError::UnknownChoice(line.to_string()));
            };
            session.toggle_word_at(n)?;
        }
        ExerciseKind::MatchPairs => {
            let (side, rest) = if let Some(rest) = line.strip_prefix('w') {
                (PairSide::Word, rest)
            } else if let Some(rest) = line.strip_prefix('m') {
                (PairSide::Meaning, rest)
            } else {
                return Err(SessionError::UnknownChoice(line.to_string()));
            };
            let (words, meanings) = session.pair_columns().unwrap_or_default();
            let column = if side == PairSide::Word { words } else { meanings };
            let item = parse_index(rest)
                .and_then(|n| column.get(n).cloned())
                .ok_or_else(|| SessionError::UnknownChoice(line.to_string()))?;
            session.toggle_pair_element(side, &item)?;
        }
        ExerciseKind::Unsupported(_) => {}
        _ => {
            let choice = parse_index(line)
                .and_then(|n| session.current_exercise().choices().get(n).cloned())
                .ok_or_else(|| SessionError::UnknownChoice(line.to_string()))?;
            session.select_option(&choice)?;
            session.submit()?;
            return Ok(true);
        }
    }
    Ok(false)
}

/// One-based menu number to index.
fn parse_index(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()?.checked_sub(1)
}

async fn wait_for_enter(input: &mut Input) -> anyhow::Result<()> {
    println!("(press enter to continue)");
    if input.next_line().await?.is_none() {
        bail!("input closed");
    }
    Ok(())
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn render(session: &LessonSession) {
    let progress = session.progress();
    let exercise = session.current_exercise();
    println!(
        "\n[{}/{}]  lives {}  xp {}",
        progress.step, progress.total, progress.lives_remaining, progress.xp_earned
    );
    println!("{}", exercise.prompt());

    match exercise.kind() {
        ExerciseKind::WordArrangement => {
            let placed = session.submission().arranged_words(exercise.choices());
            println!("  answer: {}", placed.join(" "));
            print_numbered(exercise.choices());
            println!("number toggles a word, enter checks");
        }
        ExerciseKind::MatchPairs => {
            let (words, meanings) = session.pair_columns().unwrap_or_default();
            for (i, word) in words.iter().enumerate() {
                println!("  w{}. {word}", i + 1);
            }
            for (i, meaning) in meanings.iter().enumerate() {
                println!("  m{}. {meaning}", i + 1);
            }
            println!("w<n> / m<n> toggles an item, enter checks");
        }
        ExerciseKind::Unsupported(code) => println!("  {}", unsupported_notice(code)),
        _ => print_numbered(exercise.choices()),
    }
}

/// Unsupported steps always score wrong when checked.
fn unsupported_notice(code: &str) -> String {
    format!("({code} exercises cannot be answered here. Press enter to move on; this costs a life.)")
}

fn print_numbered(items: &[String]) {
    for (i, item) in items.iter().enumerate() {
        println!("  {}. {item}", i + 1);
    }
}

fn show_feedback(session: &LessonSession) {
    if let LessonStatus::Submitted { correct: true } = session.status() {
        println!("Correct!");
    } else {
        println!(
            "Not quite. Expected: {}",
            session.current_exercise().expected_answer()
        );
    }
}

fn show_progress(update: &ProgressUpdate) {
    let level = update.level;
    println!(
        "Level {} ({}/{} XP){}",
        level.level,
        level.xp_into_level,
        level.xp_for_next_level,
        if update.leveled_up { "  level up!" } else { "" }
    );
    println!("Streak: {} day(s)", update.streak.count);
    println!(
        "Today's goal: {}/{} min ({}%)",
        update.goal.minutes,
        update.goal.goal_minutes,
        update.goal.percent()
    );
    if update.new_high_score {
        println!("New high score this week!");
    }
}

//
// ─── SQLITE URL ────────────────────────────────────────────────────────────────
//

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("sqlite://") || trimmed.starts_with("sqlite::memory:") {
        return trimmed.to_string();
    }

    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }
    Ok(())
}
