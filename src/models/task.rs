//! Task models.
//!
//! A [`RawTask`] is a Gantt plan row as it arrives from the plan source.
//! A [`Task`] is the normalized form the scan pipeline works on: real
//! calendar dates, adjusted duration, resolved dependencies.
//!
//! # Time Representation
//! All dates are day-granular [`NaiveDate`]s. Durations are whole days.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ScanError;

/// Identifier of a plan task.
///
/// Plan sources emit ids either as JSON numbers or as numeric strings;
/// both deserialize to the same value. Always serialized as a string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

impl TaskId {
    /// Numeric value of the id.
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl Serialize for TaskId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TaskIdVisitor;

        impl Visitor<'_> for TaskIdVisitor {
            type Value = TaskId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or numeric string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<TaskId, E> {
                Ok(TaskId(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<TaskId, E> {
                u64::try_from(v)
                    .map(TaskId)
                    .map_err(|_| E::custom(format!("negative task id {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<TaskId, E> {
                v.parse()
                    .map_err(|_| E::custom(format!("task id '{v}' is not numeric")))
            }
        }

        deserializer.deserialize_any(TaskIdVisitor)
    }
}

/// Extra per-task data carried by the plan source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomData {
    /// Duration in calendar days, if the plan already computed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<i64>,
}

/// A task row exactly as the plan source provides it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTask {
    /// Task identifier.
    pub id: TaskId,
    /// Display label.
    #[serde(default)]
    pub text: String,
    /// Start date as written in the plan (`YYYY-MM-DD`, optionally with a time).
    pub start_date: String,
    /// Base duration in plan units.
    #[serde(default)]
    pub duration: i64,
    /// Grouping parent. Any id used here marks a grouping node.
    #[serde(default)]
    pub parent: TaskId,
    /// Plan-specific extras.
    #[serde(default)]
    pub custom_data: CustomData,
}

impl RawTask {
    /// Creates a raw task starting on `start_date` with the given duration.
    pub fn new(id: u64, start_date: impl Into<String>, duration: i64) -> Self {
        Self {
            id: TaskId(id),
            text: String::new(),
            start_date: start_date.into(),
            duration,
            parent: TaskId::default(),
            custom_data: CustomData::default(),
        }
    }

    /// Sets the display label.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets the grouping parent.
    pub fn with_parent(mut self, parent: u64) -> Self {
        self.parent = TaskId(parent);
        self
    }

    /// Sets the precomputed duration in calendar days.
    pub fn with_duration_days(mut self, days: i64) -> Self {
        self.custom_data.duration_days = Some(days);
        self
    }

    /// Duration the normalizer starts from: calendar days if known, else the base duration.
    pub fn base_duration(&self) -> i64 {
        self.custom_data.duration_days.unwrap_or(self.duration)
    }

    /// Parses the start date.
    pub fn parsed_start(&self) -> Option<NaiveDate> {
        parse_plan_date(&self.start_date)
    }
}

/// A normalized task, ready for window derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier.
    pub id: TaskId,
    /// Display label.
    pub text: String,
    /// Adjusted start date.
    pub start_date: NaiveDate,
    /// Adjusted completion date.
    pub end_date: NaiveDate,
    /// Adjusted duration (days).
    pub duration: i64,
    /// Ids of the tasks this one depends on, in link order.
    pub dependencies: Vec<TaskId>,
    /// Earliest availability of each dependency (parallel to `dependencies`).
    pub schedule_time: Vec<NaiveDate>,
    /// Share of the duration that may overlap with a dependent's window.
    pub overlap_fraction: f64,
}

impl Task {
    /// Creates a task spanning `[start_date, end_date]`.
    pub fn new(id: u64, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: TaskId(id),
            text: String::new(),
            start_date,
            end_date,
            duration: (end_date - start_date).num_days(),
            dependencies: Vec::new(),
            schedule_time: Vec::new(),
            overlap_fraction: 0.0,
        }
    }

    /// Sets the display label.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Overrides the duration.
    pub fn with_duration(mut self, duration: i64) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the overlap fraction.
    pub fn with_overlap(mut self, overlap_fraction: f64) -> Self {
        self.overlap_fraction = overlap_fraction;
        self
    }

    /// Adds a dependency available from `available`.
    pub fn with_dependency(mut self, target: u64, available: NaiveDate) -> Self {
        self.dependencies.push(TaskId(target));
        self.schedule_time.push(available);
        self
    }

    /// Whether this task depends on anything.
    pub fn has_dependencies(&self) -> bool {
        !self.schedule_time.is_empty()
    }

    /// Whole days between start and end date.
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}

/// Shifts a date by a (possibly negative) number of days.
///
/// # Errors
/// [`ScanError::DateOutOfRange`] when the result leaves the calendar.
#[inline]
pub fn shift_days(date: NaiveDate, days: i64) -> Result<NaiveDate, ScanError> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or(ScanError::DateOutOfRange { date, days })
}

/// Parses a plan date, discarding any time-of-day component.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]`, `DD-MM-YYYY` and
/// `DD-MM-YYYY HH:MM` (the Gantt default).
pub fn parse_plan_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d-%m-%Y"];
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%d-%m-%Y %H:%M",
        "%Y-%m-%dT%H:%M:%S",
    ];

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}
