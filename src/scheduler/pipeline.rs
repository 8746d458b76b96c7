//! The scan scheduling pipeline.
//!
//! # Algorithm
//!
//! 1. Validate the batch and promote overrides.
//! 2. Normalize tasks (drop grouping nodes, apply offsets, resolve links).
//! 3. Derive dependency windows and split off leaf tasks.
//! 4. Cluster the windows into scan events.
//! 5. Attach leaf tasks.
//! 6. Place repeat scans.
//!
//! The wall-clock limit is checked between stages; a run that exceeds it is
//! abandoned without a result.

use std::time::Instant;

use tracing::debug;

use super::attach::attach_leaves;
use super::cluster::cluster;
use super::extra::ExtraScanPlacer;
use super::normalize::normalize;
use super::window::derive_windows;
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::models::{GlobalInput, Link, ProjectPlan, RawOverride, RawTask, ScanSchedule};
use crate::validation::validate_plan;

/// Input container for one scheduling run.
#[derive(Debug, Clone, Default)]
pub struct ScheduleRequest {
    /// Gantt rows, grouping nodes included.
    pub tasks: Vec<RawTask>,
    /// Dependency links.
    pub links: Vec<Link>,
    /// Offsets for tasks without an override.
    pub global: GlobalInput,
    /// Per-task overrides, not yet validated.
    pub overrides: Vec<RawOverride>,
}

impl ScheduleRequest {
    /// Creates a request with no links, zero offsets and no overrides.
    pub fn new(tasks: Vec<RawTask>) -> Self {
        Self {
            tasks,
            ..Self::default()
        }
    }

    /// Builds a request from a project plan.
    pub fn from_plan(plan: &ProjectPlan) -> Self {
        Self {
            tasks: plan.tasks.clone(),
            links: plan.links.clone(),
            global: plan.global,
            overrides: plan.overrides.clone(),
        }
    }

    /// Sets dependency links.
    pub fn with_links(mut self, links: Vec<Link>) -> Self {
        self.links = links;
        self
    }

    /// Sets the global offsets.
    pub fn with_global(mut self, global: GlobalInput) -> Self {
        self.global = global;
        self
    }

    /// Sets per-task overrides.
    pub fn with_overrides(mut self, overrides: Vec<RawOverride>) -> Self {
        self.overrides = overrides;
        self
    }

    /// First synthetic sequence number: one above every row id.
    fn first_sequence(&self) -> u64 {
        self.tasks
            .iter()
            .map(|t| t.id.value())
            .max()
            .map_or(1, |max| max + 1)
    }
}

/// Runs the scan scheduling pipeline.
///
/// # Example
///
/// ```
/// use u_scan_schedule::{ScanScheduler, ScheduleRequest};
/// use u_scan_schedule::models::{Link, RawTask};
///
/// let request = ScheduleRequest::new(vec![
///     RawTask::new(1, "2024-01-01", 4).with_text("Slab"),
///     RawTask::new(2, "2024-01-01", 2).with_text("Rebar"),
/// ])
/// .with_links(vec![Link::new(2, 1)]);
///
/// let schedule = ScanScheduler::new().schedule(&request).unwrap();
/// // Rebar is scanned on its own; Slab gets a slot when it finishes.
/// assert_eq!(schedule.event_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScanScheduler {
    config: ScanConfig,
}

impl ScanScheduler {
    /// Creates a scheduler with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Computes the scan schedule for a request.
    ///
    /// # Errors
    /// - [`ScanError::Validation`] if the batch is malformed.
    /// - [`ScanError::UnresolvedDependency`] for a link to an unknown task.
    /// - [`ScanError::TimeLimitExceeded`] if the run takes too long.
    /// - [`ScanError::EmptyTimespan`] / [`ScanError::UnorderedTimespan`] on
    ///   an internal invariant violation.
    pub fn schedule(&self, request: &ScheduleRequest) -> Result<ScanSchedule, ScanError> {
        let started = Instant::now();
        let tracer = &self.config.tracer;

        let overrides = validate_plan(&request.tasks, &request.overrides)?;
        let mut tasks = normalize(
            &request.tasks,
            &request.links,
            &request.global,
            &overrides,
            self.config.overlap_epsilon,
        )?;
        debug!(
            rows = request.tasks.len(),
            tasks = tasks.len(),
            overrides = overrides.len(),
            "normalized plan"
        );
        self.check_time(started)?;

        let partition = derive_windows(&mut tasks, tracer)?;
        debug!(
            windows = partition.with_dependency.len(),
            leaves = partition.leaves.len(),
            "derived dependency windows"
        );

        let mut events = cluster(&partition.with_dependency, tracer)?;
        debug!(events = events.len(), "clustered dependency windows");
        self.check_time(started)?;

        let attached = attach_leaves(&mut events, &partition.leaves, tracer);
        debug!(attached, events = events.len(), "attached leaf tasks");

        let placed = ExtraScanPlacer::new(&tasks, request.first_sequence(), tracer)
            .place(&mut events, &overrides)?;
        debug!(placed, events = events.len(), "placed repeat scans");
        self.check_time(started)?;

        let schedule = ScanSchedule::from_parts(events, tasks);
        schedule.check_invariants()?;
        Ok(schedule)
    }

    fn check_time(&self, started: Instant) -> Result<(), ScanError> {
        match self.config.time_limit {
            Some(limit) if started.elapsed() >= limit => Err(ScanError::TimeLimitExceeded { limit }),
            _ => Ok(()),
        }
    }
}
