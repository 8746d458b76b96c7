//! Global and per-task scheduling inputs.
//!
//! [`GlobalInput`] shifts every task's real-world start and end and sets the
//! default overlap share. A [`TaskOverride`] replaces those values for one
//! task and may request repeat scans at preferred locations.
//!
//! Overrides arrive as [`RawOverride`] (every field optional, as parsed) and
//! are promoted with `TaskOverride::try_from`, which reports each missing
//! field. A batch with any incomplete override is rejected as a whole.

use serde::{Deserialize, Serialize};

use super::TaskId;
use crate::validation::{ValidationError, ValidationErrorKind};

/// Offsets and overlap applied to all tasks without an override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalInput {
    /// Days added to every start date.
    #[serde(rename = "RealTimeStart")]
    pub real_time_start: i64,
    /// Days added to every end date.
    #[serde(rename = "RealTimeEnd")]
    pub real_time_end: i64,
    /// Default overlap fraction.
    #[serde(rename = "TaskOverlap")]
    pub task_overlap: f64,
}

impl GlobalInput {
    /// Creates a global input.
    pub fn new(real_time_start: i64, real_time_end: i64, task_overlap: f64) -> Self {
        Self {
            real_time_start,
            real_time_end,
            task_overlap,
        }
    }
}

/// A per-task override as parsed from the plan, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOverride {
    #[serde(rename = "TaskID")]
    pub task_id: Option<TaskId>,
    #[serde(rename = "RealTimeStart", default)]
    pub real_time_start: Option<i64>,
    #[serde(rename = "RealTimeEnd", default)]
    pub real_time_end: Option<i64>,
    #[serde(rename = "TaskOverlap", default)]
    pub task_overlap: Option<f64>,
    #[serde(rename = "ExtraScan", default)]
    pub extra_scan: Option<u32>,
    #[serde(rename = "ScanLocation", default)]
    pub scan_location: Option<Vec<f64>>,
    #[serde(rename = "ScanDistance", default)]
    pub scan_distance: Option<Vec<f64>>,
}

/// A complete, validated per-task override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOverride {
    /// Task the override applies to.
    pub task_id: TaskId,
    /// Replaces [`GlobalInput::real_time_start`].
    pub real_time_start: i64,
    /// Replaces [`GlobalInput::real_time_end`].
    pub real_time_end: i64,
    /// Replaces [`GlobalInput::task_overlap`].
    pub task_overlap: f64,
    /// Number of scans required beyond the clustered one.
    pub extra_scan: u32,
    /// Preferred scan positions, percent of the duration (0-100).
    pub scan_location: Vec<f64>,
    /// Tolerance around each preferred position, percent of the duration.
    pub scan_distance: Vec<f64>,
}

impl TaskOverride {
    /// Creates an override with offsets and overlap but no repeat scans.
    pub fn new(task_id: u64, real_time_start: i64, real_time_end: i64, task_overlap: f64) -> Self {
        Self {
            task_id: TaskId(task_id),
            real_time_start,
            real_time_end,
            task_overlap,
            extra_scan: 0,
            scan_location: Vec::new(),
            scan_distance: Vec::new(),
        }
    }

    /// Requests `count` repeat scans.
    pub fn with_extra_scans(mut self, count: u32) -> Self {
        self.extra_scan = count;
        self
    }

    /// Adds a preferred scan location with its tolerance (both in percent).
    pub fn with_location(mut self, location: f64, distance: f64) -> Self {
        self.scan_location.push(location);
        self.scan_distance.push(distance);
        self
    }

    /// Repeat scans without a preferred location.
    pub fn implicit_count(&self) -> usize {
        (self.extra_scan as usize).saturating_sub(self.scan_location.len())
    }

    /// Checks internal consistency of the repeat-scan request.
    pub fn check(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.scan_location.len() != self.scan_distance.len() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InconsistentOverride,
                format!(
                    "Override for task {} has {} scan locations but {} scan distances",
                    self.task_id,
                    self.scan_location.len(),
                    self.scan_distance.len()
                ),
            ));
        }

        if (self.extra_scan as usize) < self.scan_location.len() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InconsistentOverride,
                format!(
                    "Override for task {} requests {} extra scans but lists {} locations",
                    self.task_id,
                    self.extra_scan,
                    self.scan_location.len()
                ),
            ));
        }

        let out_of_range = self
            .scan_location
            .iter()
            .chain(&self.scan_distance)
            .any(|p| !(0.0..=100.0).contains(p));
        if out_of_range {
            errors.push(ValidationError::new(
                ValidationErrorKind::InconsistentOverride,
                format!(
                    "Override for task {} has a scan percentage outside 0-100",
                    self.task_id
                ),
            ));
        }

        errors
    }
}

impl TryFrom<RawOverride> for TaskOverride {
    type Error = Vec<ValidationError>;

    fn try_from(raw: RawOverride) -> Result<Self, Self::Error> {
        let label = raw
            .task_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        let mut missing = Vec::new();

        macro_rules! require {
            ($field:ident, $name:literal) => {
                match raw.$field {
                    Some(value) => Some(value),
                    None => {
                        missing.push(ValidationError::new(
                            ValidationErrorKind::MissingOverrideField,
                            format!("Override for task {label} is missing '{}'", $name),
                        ));
                        None
                    }
                }
            };
        }

        let task_id = require!(task_id, "TaskID");
        let real_time_start = require!(real_time_start, "RealTimeStart");
        let real_time_end = require!(real_time_end, "RealTimeEnd");
        let task_overlap = require!(task_overlap, "TaskOverlap");
        let extra_scan = require!(extra_scan, "ExtraScan");
        let scan_location = require!(scan_location, "ScanLocation");
        let scan_distance = require!(scan_distance, "ScanDistance");

        match (
            task_id,
            real_time_start,
            real_time_end,
            task_overlap,
            extra_scan,
            scan_location,
            scan_distance,
        ) {
            (
                Some(task_id),
                Some(real_time_start),
                Some(real_time_end),
                Some(task_overlap),
                Some(extra_scan),
                Some(scan_location),
                Some(scan_distance),
            ) => Ok(Self {
                task_id,
                real_time_start,
                real_time_end,
                task_overlap,
                extra_scan,
                scan_location,
                scan_distance,
            }),
            _ => Err(missing),
        }
    }
}
