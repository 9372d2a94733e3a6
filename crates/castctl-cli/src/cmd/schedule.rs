use super::local_store;
use crate::output::{print_json, print_table};
use anyhow::{anyhow, Context};
use castctl_core::book::{self, ScheduleBook};
use castctl_core::schedule::{self, format_timestamp, parse_timestamp};
use castctl_core::types::ScheduleKind;
use castctl_core::CastError;
use chrono::{DateTime, Local, Utc};
use clap::Subcommand;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand definition
// ---------------------------------------------------------------------------

#[derive(Subcommand, Debug)]
pub enum ScheduleSubcommand {
    /// Schedule a window for an org, replacing any it already has
    Add {
        /// Organization label (stored lower-case)
        #[arg(long)]
        org: String,
        /// Opening boundary: start, broadcast or pause
        #[arg(long, default_value = "start")]
        kind: ScheduleKind,
        /// Start time, e.g. "2024-03-10 09:00:00" (local) or RFC 3339; default now
        #[arg(long)]
        start: Option<String>,
        /// Stop time; overrides --run-time
        #[arg(long)]
        stop: Option<String>,
        /// Window length as H:MM:SS
        #[arg(long, default_value = book::DEFAULT_RUN_TIME)]
        run_time: String,
    },
    /// Move an org's stop time
    Extend {
        #[arg(long)]
        org: String,
        /// New stop time
        #[arg(long)]
        stop: String,
    },
    /// List the schedule, earliest first
    List,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcommand: ScheduleSubcommand, json: bool) -> anyhow::Result<()> {
    match subcommand {
        ScheduleSubcommand::Add {
            org,
            kind,
            start,
            stop,
            run_time,
        } => add(root, &org, kind, start.as_deref(), stop.as_deref(), &run_time, json),
        ScheduleSubcommand::Extend { org, stop } => extend(root, &org, &stop, json),
        ScheduleSubcommand::List => list(root, json),
    }
}

fn timestamp(text: &str) -> anyhow::Result<DateTime<Utc>> {
    parse_timestamp(text).ok_or_else(|| CastError::InvalidTimestamp(text.to_string()).into())
}

// ---------------------------------------------------------------------------
// add
// ---------------------------------------------------------------------------

fn add(
    root: &Path,
    org: &str,
    kind: ScheduleKind,
    start: Option<&str>,
    stop: Option<&str>,
    run_time: &str,
    json: bool,
) -> anyhow::Result<()> {
    if org.trim().is_empty() {
        return Err(anyhow!("--org must not be empty"));
    }
    let start = match start {
        Some(text) => timestamp(text)?,
        None => book::default_start(Utc::now()),
    };
    let stop = match stop {
        Some(text) => timestamp(text)?,
        None => start + book::parse_run_time(run_time)?,
    };
    if stop <= start {
        return Err(anyhow!("stop time must be after start time"));
    }

    let store = local_store(root)?;
    let mut book = ScheduleBook::load(&store).context("failed to read schedule")?;
    book.schedule_window(kind, start, stop, org);
    book.save(&store).context("failed to write schedule")?;

    if json {
        return print_json(&serde_json::json!({
            "org": org.trim().to_lowercase(),
            "kind": kind,
            "start": format_timestamp(start),
            "stop": format_timestamp(stop),
        }));
    }
    println!(
        "Scheduled {} for '{}': {} → {}",
        kind,
        org.trim().to_lowercase(),
        start.with_timezone(&Local).format("%a %b %-d %-I:%M%P"),
        stop.with_timezone(&Local).format("%a %b %-d %-I:%M%P"),
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// extend
// ---------------------------------------------------------------------------

fn extend(root: &Path, org: &str, stop: &str, json: bool) -> anyhow::Result<()> {
    let stop = timestamp(stop)?;
    let store = local_store(root)?;
    let mut book = ScheduleBook::load(&store).context("failed to read schedule")?;
    let moved = book.extend(org, stop)?;
    book.save(&store).context("failed to write schedule")?;

    if json {
        return print_json(&serde_json::json!({
            "org": org.trim().to_lowercase(),
            "stop": format_timestamp(stop),
            "moved": moved,
        }));
    }
    println!(
        "Extended '{}' to {}",
        org.trim().to_lowercase(),
        stop.with_timezone(&Local).format("%a %b %-d %-I:%M%P")
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = local_store(root)?;
    let book = ScheduleBook::load(&store).context("failed to read schedule")?;
    let entries = schedule::normalize(book.rows());

    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No schedule entries.");
        return Ok(());
    }

    let rows = entries
        .iter()
        .map(|e| {
            vec![
                e.action.to_string(),
                e.at.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "?".to_string()),
                e.org.clone(),
            ]
        })
        .collect();
    print_table(&["ACTION", "TIME", "ORG"], rows);
    Ok(())
}
