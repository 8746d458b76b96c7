//! Gantt-shaped schedule records.
//!
//! Each scan event becomes a container row ("Scan N") followed by one child
//! row per member. Containers get ids above every member id so the two
//! never collide. A date index keyed by anchor date summarizes the events.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::models::{MemberRef, ScanEvent, ScanSchedule, Task, TaskId};

/// Extra fields of a Gantt row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanCustomData {
    pub completeness_progress: u32,
    /// Synthetic sequence of a repeat scan, `"0"` otherwise.
    pub non_essential_progress: String,
    pub scan_task: bool,
    pub notes: String,
    /// Task a repeat scan re-inspects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_task: Option<TaskId>,
}

impl ScanCustomData {
    fn new(non_essential_progress: String, source_task: Option<TaskId>) -> Self {
        Self {
            completeness_progress: 0,
            non_essential_progress,
            scan_task: false,
            notes: String::new(),
            source_task,
        }
    }
}

/// One Gantt row: a scan container or a member task.
///
/// Dates are whole days. A container's `end_date` is the last day of its
/// timespan and covers that full day; there is no `23:59` time-of-day
/// suffix, so consumers rendering end-exclusive bars add one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: String,
    pub text: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Days: timespan length for containers, task span for members.
    pub duration: i64,
    pub progress: u32,
    pub open: bool,
    /// `"0"` for containers, the container id for members.
    pub parent: String,
    pub custom_data: ScanCustomData,
}

impl ScanRecord {
    fn container(id: u64, position: usize, event: &ScanEvent) -> Self {
        Self {
            id: id.to_string(),
            text: format!("Scan {}", position + 1),
            start_date: event.anchor(),
            end_date: event.last_date(),
            duration: event.day_count() as i64,
            progress: 0,
            open: true,
            parent: "0".to_string(),
            custom_data: ScanCustomData::new("0".to_string(), None),
        }
    }

    fn member(member: &MemberRef, text: &str, task: &Task, container: u64) -> Self {
        let custom_data = match *member {
            MemberRef::Real(_) => ScanCustomData::new("0".to_string(), None),
            MemberRef::Synthetic { sequence, original } => {
                ScanCustomData::new(sequence.to_string(), Some(original))
            }
        };
        Self {
            id: member.numeric_id().to_string(),
            text: text.to_string(),
            start_date: task.start_date,
            end_date: task.end_date,
            duration: task.span_days(),
            progress: 0,
            open: true,
            parent: container.to_string(),
            custom_data,
        }
    }

    /// Whether this row is a scan container.
    pub fn is_container(&self) -> bool {
        self.parent == "0"
    }
}

/// Summary of the event anchored on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateIndexEntry {
    /// Timespan length in days.
    pub duration: usize,
    pub is_completed: bool,
    pub areas: f64,
    pub notes: String,
    pub elements: Vec<String>,
    /// Member references (`"id"` or `"sequence:original"`).
    pub tasks: Vec<String>,
}

impl DateIndexEntry {
    fn new(duration: usize) -> Self {
        Self {
            duration,
            is_completed: false,
            areas: 0.0,
            notes: String::new(),
            elements: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

/// Serializer output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SerializedSchedule {
    /// Containers, each followed by its members.
    pub scans: Vec<ScanRecord>,
    /// Entries keyed by anchor date.
    pub date_index: BTreeMap<NaiveDate, DateIndexEntry>,
}

/// Flattens a schedule into Gantt rows and a date index.
///
/// When two events share an anchor date, the later one owns the index entry.
///
/// # Errors
/// [`ScanError::UnknownMember`] if a member refers to a task the schedule
/// does not contain.
pub fn serialize(schedule: &ScanSchedule) -> Result<SerializedSchedule, ScanError> {
    let tasks: HashMap<TaskId, &Task> = schedule.tasks.iter().map(|t| (t.id, t)).collect();
    let base = schedule.max_member_id().map_or(1, |max| max + 1);
    let mut out = SerializedSchedule::default();

    for (position, event) in schedule.events.iter().enumerate() {
        let container = base + position as u64;
        out.scans
            .push(ScanRecord::container(container, position, event));

        let mut entry = DateIndexEntry::new(event.day_count());
        for (member, text) in event.members().iter().zip(event.texts()) {
            let task = tasks
                .get(&member.task_id())
                .ok_or_else(|| ScanError::UnknownMember {
                    member: member.to_string(),
                })?;
            out.scans
                .push(ScanRecord::member(member, text, task, container));
            entry.tasks.push(member.to_string());
        }
        out.date_index.insert(event.anchor(), entry);
    }

    Ok(out)
}
