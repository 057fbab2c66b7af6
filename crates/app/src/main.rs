use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use services::{Clock, ProgressService};
use storage::repository::{Storage, TaskRepository as _};
use stride_core::model::{Category, Difficulty, Task, TaskId, UserId};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDays { raw: String },
    InvalidTasks { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDays { raw } => write!(f, "invalid --days value: {raw}"),
            ArgsError::InvalidTasks { raw } => write!(f, "invalid --tasks value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
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

struct Args {
    user: String,
    days: u32,
    tasks: u32,
    start: DateTime<Utc>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--user <id>] [--days <n>] [--tasks <n>] [--now <rfc3339>]");
    eprintln!();
    eprintln!("Runs a deterministic multi-day simulation against the in-memory tracker.");
    eprintln!("One mid-run day is skipped when --days >= 4, to show the streak reset.");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --user user_123   --days 5   --tasks 3   --now <current time>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STRIDE_USER, STRIDE_DAYS, STRIDE_TASKS");
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut user = std::env::var("STRIDE_USER").unwrap_or_else(|_| "user_123".into());
        let mut days = std::env::var("STRIDE_DAYS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(5);
        let mut tasks = std::env::var("STRIDE_TASKS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(3);
        let mut start = Utc::now();

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--user" => {
                    user = require_value(&mut args, "--user")?;
                }
                "--days" => {
                    let value = require_value(&mut args, "--days")?;
                    days = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDays { raw: value.clone() })?;
                }
                "--tasks" => {
                    let value = require_value(&mut args, "--tasks")?;
                    tasks = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidTasks { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    start = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            user,
            days,
            tasks,
            start,
        })
    }
}

/// Task templates in the shape recommendations come in, cycled to fill the
/// requested daily set.
const TASK_TEMPLATES: &[(&str, &str, Category, Difficulty, &str)] = &[
    (
        "Morning Routine Builder",
        "Start with a 5-minute morning routine and gradually increase duration",
        Category::Habits,
        Difficulty::Easy,
        "5-15 minutes",
    ),
    (
        "Emotion Journaling",
        "Write down three emotions you felt today and their triggers",
        Category::Emotions,
        Difficulty::Easy,
        "10 minutes",
    ),
    (
        "Focus Sprint",
        "Work a single task for 25 minutes without switching",
        Category::Productivity,
        Difficulty::Medium,
        "25 minutes",
    ),
    (
        "Distraction Audit",
        "List the three interruptions that cost you the most focus",
        Category::Discipline,
        Difficulty::Easy,
        "10 minutes",
    ),
    (
        "Evening Walk",
        "Take a short walk to reset energy levels",
        Category::PhysicalHealth,
        Difficulty::Easy,
        "15-20 minutes",
    ),
];

fn build_task_set(count: u32) -> Vec<Task> {
    (0..count)
        .map(|index| {
            let (title, description, category, difficulty, duration) =
                TASK_TEMPLATES[index as usize % TASK_TEMPLATES.len()];
            Task::new(
                TaskId::new(u64::from(index) + 1),
                title,
                description,
                category,
                difficulty,
                duration,
            )
            .expect("template titles are never empty")
        })
        .collect()
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::in_memory();
    let user = UserId::new(args.user);

    storage
        .tasks
        .put_tasks(&user, build_task_set(args.tasks))
        .await?;

    // one day is skipped mid-run to demonstrate the gap reset
    let skipped_day = if args.days >= 4 { Some(args.days / 2) } else { None };

    for day in 0..args.days {
        let clock = Clock::fixed(args.start + Duration::days(i64::from(day)));
        let service = ProgressService::new(
            clock,
            Arc::clone(&storage.progress),
            Arc::clone(&storage.tasks),
        );

        if day > 0 {
            service.refresh_day(&user).await?;
        }

        if skipped_day == Some(day) {
            info!("Day {}: skipped (no tasks completed)", day + 1);
            continue;
        }

        let task_ids: Vec<TaskId> = storage
            .tasks
            .list_tasks(&user)
            .await?
            .iter()
            .map(Task::id)
            .collect();
        for task_id in task_ids {
            let outcome = service.toggle_task(&user, task_id).await?;
            for id in &outcome.newly_unlocked {
                info!("Day {}: unlocked achievement {}", day + 1, id);
            }
        }

        let newly = service.record_note_shared(&user).await?;
        for id in &newly {
            info!("Day {}: unlocked achievement {}", day + 1, id);
        }

        let snapshot = service.get_progress(&user).await?;
        info!(
            "Day {}: streak {} ({}), {}/{} tasks, {}% complete",
            day + 1,
            snapshot.current_streak,
            snapshot.streak_status,
            snapshot.today_completed,
            snapshot.today_total,
            snapshot.completion_percent,
        );
        info!("Day {}: {}", day + 1, snapshot.streak_message);
    }

    let final_clock =
        Clock::fixed(args.start + Duration::days(i64::from(args.days.saturating_sub(1))));
    let service = ProgressService::new(
        final_clock,
        Arc::clone(&storage.progress),
        Arc::clone(&storage.tasks),
    );

    let snapshot = service.get_progress(&user).await?;
    let achievements = service.get_achievements(&user).await?;

    println!();
    println!("Simulation finished for {}", snapshot.user_id);
    println!(
        "  streak: {} (longest {}), tasks completed: {}, notes shared: {}",
        snapshot.current_streak,
        snapshot.longest_streak,
        snapshot.total_tasks_completed,
        snapshot.notes_shared,
    );
    println!(
        "  achievements unlocked: {}/{}",
        achievements.unlocked, achievements.total
    );
    for group in &achievements.groups {
        for item in &group.achievements {
            let mark = if item.unlocked { "x" } else { " " };
            println!(
                "  [{mark}] {} {} ({}, threshold {})",
                item.icon, item.title, group.kind, item.threshold
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = match Args::parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(err) = run(args).await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
