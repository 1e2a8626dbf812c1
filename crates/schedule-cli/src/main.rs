//! `schedule` CLI: screen and update interview slots from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Would 11:20-11:50 clash with a confirmed meeting?
//! schedule --events events.json check --start 2024-02-01T11:20 --end 2024-02-01T11:50
//!
//! # Add a candidate window; the end is derived from the interview duration
//! schedule --events events.json add-slot --event b --start 2024-02-01T13:00
//!
//! # List legal start times for window 0, then confirm one
//! schedule --config schedule.toml --events events.json options --event b --slot 0
//! schedule --events events.json confirm --event b --slot 0 --time 13:30 -o events.json
//! ```
//!
//! Events are read from `--events` or stdin. Mutating commands print the
//! updated snapshot as JSON. A rejected time prints a JSON conflict report on
//! stdout and the message on stderr.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand, ValueEnum};
use schedule_engine::event::{events_from_json, events_to_json};
use schedule_engine::format::{format_candidate_summary, format_time};
use schedule_engine::{
    ConflictReport, ConflictScope, EngineConfig, EventStore, InMemoryEventStore, ScheduleService,
    SchedulingError, TimeInterval,
};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "schedule",
    version,
    about = "Interview scheduling with buffered conflict checks"
)]
struct Cli {
    /// TOML config file (defaults apply if omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Events JSON file (reads from stdin if omitted)
    #[arg(long, global = true)]
    events: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    Confirmed,
    All,
}

impl From<ScopeArg> for ConflictScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Confirmed => ConflictScope::ConfirmedOnly,
            ScopeArg::All => ConflictScope::ConfirmedAndCandidate,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check an interval against existing events without changing anything
    Check {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Which intervals block time (defaults to the configured scope)
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
        /// Event id to leave out of the check
        #[arg(long)]
        exclude: Option<String>,
    },
    /// Add a candidate window to an event
    AddSlot {
        #[arg(long)]
        event: String,
        #[arg(long)]
        start: String,
        /// Derived from the default interview duration if omitted
        #[arg(long)]
        end: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Replace the candidate window at an index
    EditSlot {
        #[arg(long)]
        event: String,
        #[arg(long)]
        index: usize,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Remove the candidate window at an index
    RemoveSlot {
        #[arg(long)]
        event: String,
        #[arg(long)]
        index: usize,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Confirm a start time (local HH:MM) inside a candidate window
    Confirm {
        #[arg(long)]
        event: String,
        #[arg(long)]
        slot: usize,
        #[arg(long)]
        time: String,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Return a confirmed event to candidate status
    Revert {
        #[arg(long)]
        event: String,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Mark an event as rejected
    Reject {
        #[arg(long)]
        event: String,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List legal start times for a candidate window
    Options {
        #[arg(long)]
        event: String,
        #[arg(long)]
        slot: usize,
    },
    /// Print an event's candidate windows as reply text, one line per day
    Summary {
        #[arg(long)]
        event: String,
    },
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    run(cli).inspect_err(|err| {
        if let Some(conflict) = err.downcast_ref::<SchedulingError>().filter(|e| e.is_conflict()) {
            if let Ok(report) = serde_json::to_string_pretty(&ConflictReport::from(conflict)) {
                println!("{}", report);
            }
        }
    })
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let tz = config.timezone()?;

    let json = read_input(cli.events.as_deref())?;
    let events = events_from_json(&json)?;
    debug!(events = events.len(), timezone = %tz, "loaded snapshot");

    let service = ScheduleService::new(InMemoryEventStore::with_events(events), config)?;

    match cli.command {
        Commands::Check {
            start,
            end,
            scope,
            exclude,
        } => {
            let interval = TimeInterval::new(parse_datetime(&start, tz)?, parse_datetime(&end, tz)?)?;
            let scope = scope
                .map(ConflictScope::from)
                .unwrap_or(service.config().policy.scope);
            let result = service.check(&interval, exclude.as_deref(), scope)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::AddSlot {
            event,
            start,
            end,
            output,
        } => {
            let start = parse_datetime(&start, tz)?;
            let end = end.as_deref().map(|s| parse_datetime(s, tz)).transpose()?;
            service.add_candidate_from(&event, Some(start), end)?;
            write_snapshot(&service, output.as_deref())?;
        }
        Commands::EditSlot {
            event,
            index,
            start,
            end,
            output,
        } => {
            let slot = TimeInterval::new(parse_datetime(&start, tz)?, parse_datetime(&end, tz)?)?;
            service.edit_candidate(&event, index, slot.into())?;
            write_snapshot(&service, output.as_deref())?;
        }
        Commands::RemoveSlot {
            event,
            index,
            output,
        } => {
            service.remove_candidate(&event, index)?;
            write_snapshot(&service, output.as_deref())?;
        }
        Commands::Confirm {
            event,
            slot,
            time,
            output,
        } => {
            let time = NaiveTime::parse_from_str(&time, "%H:%M")
                .with_context(|| format!("Invalid time '{}', expected HH:MM", time))?;
            service.confirm(&event, slot, time)?;
            write_snapshot(&service, output.as_deref())?;
        }
        Commands::Revert { event, output } => {
            service.revert(&event)?;
            write_snapshot(&service, output.as_deref())?;
        }
        Commands::Reject { event, output } => {
            service.reject(&event)?;
            write_snapshot(&service, output.as_deref())?;
        }
        Commands::Options { event, slot } => {
            for start in service.start_time_options(&event, slot)? {
                println!("{}", format_time(start, tz));
            }
        }
        Commands::Summary { event } => {
            let event = service
                .store()
                .get(&event)?
                .ok_or_else(|| SchedulingError::EventNotFound(event.clone()))?;
            println!("{}", format_candidate_summary(&event, tz));
        }
    }

    Ok(())
}

/// Parse an RFC 3339 timestamp, or a naive `YYYY-MM-DDTHH:MM[:SS]` read as
/// local time in `tz`.
fn parse_datetime(s: &str, tz: Tz) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .with_context(|| format!("Invalid datetime '{}'", s))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| anyhow!("'{}' does not exist in {}", s, tz))
}

fn write_snapshot<S: EventStore>(service: &ScheduleService<S>, path: Option<&str>) -> Result<()> {
    let json = events_to_json(&service.store().list()?)?;
    write_output(path, &format!("{}\n", json))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
