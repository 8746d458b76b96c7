//! Scan schedule (solution) model.
//!
//! A scan schedule is the pipeline's result: the ordered scan events plus
//! the normalized tasks they refer to. Serialization needs both.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::{MemberRef, ScanEvent, Task, TaskId};
use crate::error::ScanError;
use crate::models::scan::check_timespan;

/// A complete scan schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanSchedule {
    /// Scan events in processing order.
    pub events: Vec<ScanEvent>,
    /// Normalized tasks, sorted by end date.
    pub tasks: Vec<Task>,
}

impl ScanSchedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a schedule from events and the tasks they reference.
    pub fn from_parts(events: Vec<ScanEvent>, tasks: Vec<Task>) -> Self {
        Self { events, tasks }
    }

    /// Number of scan events.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Whether the schedule has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Looks up a normalized task.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Events that include `task`, either directly or as a repeat.
    pub fn events_for_task(&self, task: TaskId) -> Vec<&ScanEvent> {
        self.events
            .iter()
            .filter(|e| e.includes_task(task))
            .collect()
    }

    /// Anchor dates in event order.
    pub fn anchors(&self) -> Vec<NaiveDate> {
        self.events.iter().map(ScanEvent::anchor).collect()
    }

    /// Every member reference in event order.
    pub fn members(&self) -> impl Iterator<Item = &MemberRef> {
        self.events.iter().flat_map(|e| e.members())
    }

    /// Largest id published by any member (real id or synthetic sequence).
    pub fn max_member_id(&self) -> Option<u64> {
        self.members().map(MemberRef::numeric_id).max()
    }

    /// Re-checks every event's timespan and that no task is scanned as
    /// itself more than once. Repeat scans may recur freely.
    ///
    /// # Errors
    /// The first violating event, as [`ScanError::EmptyTimespan`] or
    /// [`ScanError::UnorderedTimespan`], else the first task scanned twice
    /// as [`ScanError::DuplicateMember`].
    pub fn check_invariants(&self) -> Result<(), ScanError> {
        self.events
            .iter()
            .enumerate()
            .try_for_each(|(i, e)| check_timespan(e.timespan(), &format!("scan event {i}")))?;

        let mut seen = HashSet::new();
        for member in self.members() {
            if let MemberRef::Real(task) = member {
                if !seen.insert(*task) {
                    return Err(ScanError::DuplicateMember { task: *task });
                }
            }
        }
        Ok(())
    }
}
