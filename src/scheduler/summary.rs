//! Schedule statistics.
//!
//! Summarizes a completed scan schedule for reporting.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Event count | Number of scan events |
//! | Clustered tasks | Distinct tasks scanned as themselves |
//! | Repeat placements | Synthetic members |
//! | Empty events | Events with no member |
//! | Mean / max days | Timespan length per event |
//! | First / last anchor | Earliest and latest anchor dates |

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{MemberRef, ScanSchedule};

/// Scan schedule indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleSummary {
    /// Number of scan events.
    pub event_count: usize,
    /// Distinct real tasks covered.
    pub task_count: usize,
    /// Synthetic members placed for repeat scans.
    pub repeat_count: usize,
    /// Events without members.
    pub empty_events: usize,
    /// Mean timespan length in days (0.0 when empty).
    pub mean_days: f64,
    /// Longest timespan in days.
    pub max_days: usize,
    /// Member count of the largest event.
    pub largest_event: usize,
    /// Earliest anchor date.
    pub first_anchor: Option<NaiveDate>,
    /// Latest anchor date.
    pub last_anchor: Option<NaiveDate>,
}

impl ScheduleSummary {
    /// Computes the summary of a schedule.
    pub fn calculate(schedule: &ScanSchedule) -> Self {
        let events = &schedule.events;

        let mut tasks = HashSet::new();
        let mut repeat_count = 0;
        for member in schedule.members() {
            match member {
                MemberRef::Real(id) => {
                    tasks.insert(*id);
                }
                MemberRef::Synthetic { .. } => repeat_count += 1,
            }
        }

        let total_days: usize = events.iter().map(|e| e.day_count()).sum();
        let mean_days = if events.is_empty() {
            0.0
        } else {
            total_days as f64 / events.len() as f64
        };

        let anchors = schedule.anchors();

        Self {
            event_count: events.len(),
            task_count: tasks.len(),
            repeat_count,
            empty_events: events.iter().filter(|e| e.members().is_empty()).count(),
            mean_days,
            max_days: events.iter().map(|e| e.day_count()).max().unwrap_or(0),
            largest_event: events.iter().map(|e| e.members().len()).max().unwrap_or(0),
            first_anchor: anchors.iter().min().copied(),
            last_anchor: anchors.iter().max().copied(),
        }
    }

    /// Mean members per event (0.0 when empty).
    pub fn members_per_event(&self) -> f64 {
        if self.event_count == 0 {
            0.0
        } else {
            (self.task_count + self.repeat_count) as f64 / self.event_count as f64
        }
    }
}
