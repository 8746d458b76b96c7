//! `scan-schedule`: computes the scan schedule of a project plan file.
//!
//! Reads a plan JSON, runs the pipeline, prints the schedule document (or
//! its summary) and optionally upserts it into a directory store.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::info;

use u_scan_schedule::models::{assign_custom_durations, ProjectPlan};
use u_scan_schedule::output::{self, JsonDirStore, ScheduleDocument, ScheduleStore};
use u_scan_schedule::{ScanConfig, ScanScheduler, ScheduleRequest, ScheduleSummary};

/// Work-day length of plans measured in hours.
const HOURS_PER_WORK_DAY: f64 = 9.0;

#[derive(Parser, Debug)]
#[command(name = "scan-schedule", version, about = "Derive inspection scan events from a Gantt plan")]
struct Args {
    /// Project plan JSON file
    plan: PathBuf,

    /// Upsert the document into this directory
    #[arg(long, env = "SCAN_STORE_DIR")]
    store: Option<PathBuf>,

    /// Derive task durations from the plan's work-hours calendar
    #[arg(long)]
    derive_durations: bool,

    /// Plan units per working day (default: 1 for day-unit plans, 9 otherwise)
    #[arg(long)]
    hours_per_day: Option<f64>,

    /// Wall-clock limit in seconds; 0 disables it
    #[arg(long, env = "SCAN_TIME_LIMIT_SECS", default_value = "600")]
    time_limit_secs: u64,

    /// Print summary statistics instead of the document
    #[arg(long)]
    summary: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let content = fs::read_to_string(&args.plan)
        .with_context(|| format!("Failed to read plan {}", args.plan.display()))?;
    let mut plan: ProjectPlan = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse plan {}", args.plan.display()))?;

    if args.derive_durations {
        let hours_per_day = args.hours_per_day.unwrap_or_else(|| default_hours_per_day(&plan));
        let updated = assign_custom_durations(&mut plan.tasks, &plan.worktime, hours_per_day);
        info!(updated, hours_per_day, "derived durations from work hours");
    }

    let time_limit = (args.time_limit_secs > 0).then(|| Duration::from_secs(args.time_limit_secs));
    let scheduler = ScanScheduler::new().with_config(ScanConfig::new().with_time_limit(time_limit));

    let schedule = scheduler
        .schedule(&ScheduleRequest::from_plan(&plan))
        .context("Scan scheduling failed")?;
    info!(
        schedule = %plan.id,
        events = schedule.event_count(),
        "computed scan schedule"
    );

    let serialized = output::serialize(&schedule).context("Failed to build schedule rows")?;
    let mut document = ScheduleDocument::assemble(&plan, serialized, Utc::now());

    if let Some(dir) = &args.store {
        let mut store = JsonDirStore::new(dir.clone());
        document = store
            .upsert(document)
            .with_context(|| format!("Failed to store schedule in {}", dir.display()))?;
        info!(path = %store.path_for(&plan.id).display(), "stored scan schedule");
    }

    let rendered = if args.summary {
        to_json(&ScheduleSummary::calculate(&schedule), args.pretty)?
    } else {
        to_json(&document, args.pretty)?
    };
    println!("{rendered}");

    Ok(())
}

fn default_hours_per_day(plan: &ProjectPlan) -> f64 {
    match plan.config.get("duration_unit").and_then(|v| v.as_str()) {
        Some("day") => 1.0,
        _ => HOURS_PER_WORK_DAY,
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}
