//! Command-line entry point over `luna_core`.
//!
//! # Responsibility
//! - Log period markers and symptoms for one user against a local database.
//! - Print the derived phase for any date.

use clap::{Parser, Subcommand, ValueEnum};
use luna_core::db::open_db;
use luna_core::{
    core_version, init_logging, ping, CycleDate, CycleSettings, CycleTracker, EntryId, LogAction,
    LogLevel, SqliteEntryRepository, Symptom, SymptomLog, WriteStatus,
};
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "luna", version, about = "Track cycle phases from the terminal")]
struct Cli {
    /// SQLite database file.
    #[arg(long, global = true, default_value = "luna.sqlite3")]
    db: PathBuf,
    /// User the entries belong to.
    #[arg(long, global = true)]
    user: Option<Uuid>,
    /// JSON settings blob (`{"cycleLength": 28}`).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    /// Overrides the configured cycle length.
    #[arg(long, global = true)]
    cycle_length: Option<u32>,
    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true)]
    log_dir: Option<String>,
    /// Defaults to `debug` in debug builds and `info` in release builds.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core linkage probe.
    Ping,
    /// Show cycle day and phase.
    Phase {
        /// Defaults to today's local date.
        #[arg(long)]
        date: Option<CycleDate>,
    },
    /// Apply a period action to a date.
    Log { date: CycleDate, action: MarkAction },
    /// Attach mood, notes and symptoms to a date.
    Symptoms {
        date: CycleDate,
        #[arg(long)]
        mood: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long = "symptom")]
        symptoms: Vec<String>,
    },
    /// List stored entries.
    Entries,
    /// Delete one stored entry.
    Delete { id: EntryId },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MarkAction {
    Toggle,
    Started,
    Ended,
}

impl From<MarkAction> for LogAction {
    fn from(value: MarkAction) -> Self {
        match value {
            MarkAction::Toggle => LogAction::Toggle,
            MarkAction::Started => LogAction::Started,
            MarkAction::Ended => LogAction::Ended,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or(LogLevel::build_default().as_str());
        init_logging(level, log_dir)?;
    }

    if let Command::Ping = cli.command {
        println!("luna_core ping={}", ping());
        println!("luna_core version={}", core_version());
        return Ok(());
    }

    let user = cli.user.ok_or("--user is required for this command")?;
    let settings = load_settings(cli.settings.as_ref(), cli.cycle_length)?;
    let conn = open_db(&cli.db)?;
    let mut tracker = CycleTracker::open(SqliteEntryRepository::new(&conn), user, settings)?;

    match cli.command {
        Command::Ping => {}
        Command::Phase { date } => {
            let date = date.unwrap_or_else(CycleDate::today_local);
            let reading = tracker.phase_on(date);
            let cycle_length = tracker.settings().cycle_length();
            println!(
                "{date} day={} phase={}",
                reading.current_day,
                reading.current_phase.as_str()
            );
            if reading.is_period_due_soon(cycle_length) {
                println!("period due soon");
            } else {
                println!(
                    "next period in {} days",
                    reading.days_until_next_period(cycle_length)
                );
            }
        }
        Command::Log { date, action } => {
            report(tracker.apply(date, action.into()));
        }
        Command::Symptoms {
            date,
            mood,
            notes,
            symptoms,
        } => {
            let symptoms = symptoms
                .iter()
                .map(|name| {
                    Symptom::parse(name).ok_or_else(|| format!("unknown symptom `{name}`"))
                })
                .collect::<Result<BTreeSet<_>, _>>()?;
            let log = SymptomLog {
                mood,
                notes,
                symptoms,
            };
            report(tracker.apply(date, LogAction::Save(log)));
        }
        Command::Entries => {
            for entry in tracker.entries() {
                let marker = entry.phase_marker.map_or("-", |marker| marker.as_str());
                let symptoms = entry
                    .symptoms
                    .iter()
                    .map(|symptom| symptom.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                println!("{} {} {} [{}]", entry.id, entry.date, marker, symptoms);
            }
        }
        Command::Delete { id } => report(tracker.delete_entry(id)),
    }
    Ok(())
}

fn load_settings(
    path: Option<&PathBuf>,
    cycle_length: Option<u32>,
) -> Result<CycleSettings, Box<dyn Error>> {
    if let Some(cycle_length) = cycle_length {
        return Ok(CycleSettings::new(cycle_length)?);
    }
    match path {
        Some(path) => Ok(CycleSettings::load_from_file(path)?),
        None => Ok(CycleSettings::default()),
    }
}

fn report(status: WriteStatus) {
    match status {
        WriteStatus::Persisted(id) => {
            info!("event=cli_write module=cli status=ok entry_id={id}");
            println!("saved {id}");
        }
        // The local view already reflects the change.
        WriteStatus::Failed { reason } => {
            warn!("event=cli_write module=cli status=error reason={reason}");
            eprintln!("warning: not saved: {reason}");
        }
    }
}
