//! Task normalization.
//!
//! Turns raw Gantt rows into [`Task`]s with real-world dates.
//!
//! # Algorithm
//!
//! 1. Every id used as some row's `parent` is a grouping node and is dropped.
//! 2. Each remaining row gets its effective offsets: the override's
//!    `RealTimeStart`/`RealTimeEnd`/`TaskOverlap` if one exists, else the
//!    global ones. With base start `s`, base duration `d`, offsets `a`/`b`:
//!    - `start_date = s + a`
//!    - `duration   = d - a + b`
//!    - `end_date   = s + b + duration`
//!    - `overlap    = TaskOverlap + epsilon`
//! 3. Every link whose source is the row appends its target to
//!    `dependencies` and the target's adjusted start to `schedule_time`.
//! 4. The result is stably sorted by end date.
//!
//! # Complexity
//! O(n + l) with hashed lookups, plus the O(n log n) sort.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::error::ScanError;
use crate::models::{shift_days, GlobalInput, Link, RawTask, Task, TaskId, TaskOverride};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Offsets in effect for one task.
#[derive(Debug, Clone, Copy)]
struct Offsets {
    start: i64,
    end: i64,
    overlap: f64,
}

struct Normalizer<'a> {
    global: &'a GlobalInput,
    overrides: HashMap<TaskId, &'a TaskOverride>,
    raw_by_id: HashMap<TaskId, &'a RawTask>,
}

impl<'a> Normalizer<'a> {
    fn new(tasks: &'a [RawTask], global: &'a GlobalInput, overrides: &'a [TaskOverride]) -> Self {
        let mut by_task = HashMap::new();
        for ov in overrides {
            // first entry wins
            by_task.entry(ov.task_id).or_insert(ov);
        }
        Self {
            global,
            overrides: by_task,
            raw_by_id: tasks.iter().map(|t| (t.id, t)).collect(),
        }
    }

    fn offsets(&self, id: TaskId) -> Offsets {
        match self.overrides.get(&id) {
            Some(ov) => Offsets {
                start: ov.real_time_start,
                end: ov.real_time_end,
                overlap: ov.task_overlap,
            },
            None => Offsets {
                start: self.global.real_time_start,
                end: self.global.real_time_end,
                overlap: self.global.task_overlap,
            },
        }
    }

    fn base_start(task: &RawTask) -> Result<NaiveDate, ScanError> {
        task.parsed_start().ok_or_else(|| {
            ScanError::Validation(vec![ValidationError::new(
                ValidationErrorKind::InvalidDate,
                format!(
                    "Task '{}' has unparsable start date '{}'",
                    task.id, task.start_date
                ),
            )])
        })
    }

    /// Adjusted start of any plan row, grouping nodes included.
    fn adjusted_start(&self, task: &RawTask) -> Result<NaiveDate, ScanError> {
        shift_days(Self::base_start(task)?, self.offsets(task.id).start)
    }

    fn normalize_one(&self, raw: &RawTask, links: &[Link], epsilon: f64) -> Result<Task, ScanError> {
        let base = Self::base_start(raw)?;
        let offsets = self.offsets(raw.id);
        let duration = raw
            .base_duration()
            .saturating_sub(offsets.start)
            .saturating_add(offsets.end);

        let mut task = Task {
            id: raw.id,
            text: raw.text.clone(),
            start_date: shift_days(base, offsets.start)?,
            end_date: shift_days(base, offsets.end.saturating_add(duration))?,
            duration,
            dependencies: Vec::new(),
            schedule_time: Vec::new(),
            overlap_fraction: offsets.overlap + epsilon,
        };

        for link in links.iter().filter(|l| l.source == raw.id) {
            let target =
                self.raw_by_id
                    .get(&link.target)
                    .ok_or(ScanError::UnresolvedDependency {
                        task: raw.id,
                        target: link.target,
                    })?;
            task.dependencies.push(link.target);
            task.schedule_time.push(self.adjusted_start(target)?);
        }

        Ok(task)
    }
}

/// Normalizes raw plan rows.
///
/// # Arguments
/// * `tasks` - Gantt rows, grouping nodes included.
/// * `links` - dependency links between rows.
/// * `global` - offsets and overlap for rows without an override.
/// * `overrides` - validated per-task overrides.
/// * `epsilon` - added to every overlap fraction.
///
/// # Errors
/// [`ScanError::UnresolvedDependency`] for a link to an unknown row, or
/// [`ScanError::Validation`] for an unparsable start date.
pub fn normalize(
    tasks: &[RawTask],
    links: &[Link],
    global: &GlobalInput,
    overrides: &[TaskOverride],
    epsilon: f64,
) -> Result<Vec<Task>, ScanError> {
    let parents: HashSet<TaskId> = tasks.iter().map(|t| t.parent).collect();
    let normalizer = Normalizer::new(tasks, global, overrides);

    let mut normalized = tasks
        .iter()
        .filter(|t| !parents.contains(&t.id))
        .map(|t| normalizer.normalize_one(t, links, epsilon))
        .collect::<Result<Vec<_>, _>>()?;

    normalized.sort_by_key(|t| t.end_date);
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn plain() -> GlobalInput {
        GlobalInput::new(0, 0, 0.0)
    }

    #[test]
    fn test_basic_dates() {
        let tasks = vec![RawTask::new(1, "2024-01-01", 4).with_text("Dig")];
        let out = normalize(&tasks, &[], &plain(), &[], 0.001).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start_date, d("2024-01-01"));
        assert_eq!(out[0].end_date, d("2024-01-05"));
        assert_eq!(out[0].duration, 4);
        assert!((out[0].overlap_fraction - 0.001).abs() < 1e-12);
        assert_eq!(out[0].text, "Dig");
    }

    #[test]
    fn test_global_offsets() {
        let tasks = vec![RawTask::new(1, "2024-01-10", 10)];
        let global = GlobalInput::new(2, 3, 0.5);
        let out = normalize(&tasks, &[], &global, &[], 0.001).unwrap();
        // duration = 10 - 2 + 3, end = base + 3 + 11
        assert_eq!(out[0].start_date, d("2024-01-12"));
        assert_eq!(out[0].duration, 11);
        assert_eq!(out[0].end_date, d("2024-01-24"));
        assert!((out[0].overlap_fraction - 0.501).abs() < 1e-12);
    }

    #[test]
    fn test_override_replaces_global() {
        let tasks = vec![
            RawTask::new(1, "2024-01-10", 10),
            RawTask::new(2, "2024-01-10", 10),
        ];
        let global = GlobalInput::new(2, 3, 0.5);
        let overrides = vec![TaskOverride::new(2, -1, 0, 0.2)];
        let out = normalize(&tasks, &[], &global, &overrides, 0.001).unwrap();

        let t2 = out.iter().find(|t| t.id == TaskId(2)).unwrap();
        assert_eq!(t2.start_date, d("2024-01-09"));
        assert_eq!(t2.duration, 11);
        assert_eq!(t2.end_date, d("2024-01-21"));
        assert!((t2.overlap_fraction - 0.201).abs() < 1e-12);
    }

    #[test]
    fn test_custom_duration_preferred() {
        let tasks = vec![RawTask::new(1, "2024-01-01", 4).with_duration_days(6)];
        let out = normalize(&tasks, &[], &plain(), &[], 0.0).unwrap();
        assert_eq!(out[0].duration, 6);
        assert_eq!(out[0].end_date, d("2024-01-07"));
    }

    #[test]
    fn test_parents_dropped() {
        let tasks = vec![
            RawTask::new(10, "2024-01-01", 9),
            RawTask::new(11, "2024-01-01", 2).with_parent(10),
            RawTask::new(12, "2024-01-03", 2).with_parent(10),
        ];
        let out = normalize(&tasks, &[], &plain(), &[], 0.0).unwrap();
        let ids: Vec<u64> = out.iter().map(|t| t.id.value()).collect();
        assert_eq!(ids, vec![11, 12]);
    }

    #[test]
    fn test_dependencies_resolved_with_target_offsets() {
        let tasks = vec![
            RawTask::new(1, "2024-01-01", 2),
            RawTask::new(2, "2024-01-05", 3),
            RawTask::new(3, "2024-01-08", 1),
        ];
        let links = vec![Link::new(1, 2), Link::new(1, 3)];
        let overrides = vec![TaskOverride::new(3, 2, 2, 0.0)];
        let out = normalize(&tasks, &links, &GlobalInput::new(1, 1, 0.0), &overrides, 0.0).unwrap();

        let t1 = out.iter().find(|t| t.id == TaskId(1)).unwrap();
        assert_eq!(t1.dependencies, vec![TaskId(2), TaskId(3)]);
        assert_eq!(t1.schedule_time, vec![d("2024-01-06"), d("2024-01-10")]);
    }

    #[test]
    fn test_unknown_dependency() {
        let tasks = vec![RawTask::new(1, "2024-01-01", 2)];
        let err = normalize(&tasks, &[Link::new(1, 77)], &plain(), &[], 0.0).unwrap_err();
        assert!(matches!(
            err,
            ScanError::UnresolvedDependency { task, target }
                if task == TaskId(1) && target == TaskId(77)
        ));
    }

    #[test]
    fn test_sorted_by_end_date_stable() {
        let tasks = vec![
            RawTask::new(1, "2024-01-01", 5),
            RawTask::new(2, "2024-01-01", 2),
            RawTask::new(3, "2024-01-03", 3),
            RawTask::new(4, "2024-01-02", 1),
        ];
        let out = normalize(&tasks, &[], &plain(), &[], 0.0).unwrap();
        let ids: Vec<u64> = out.iter().map(|t| t.id.value()).collect();
        // ends: 1→01-06, 2→01-03, 3→01-06, 4→01-03
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize(&[], &[], &plain(), &[], 0.001).unwrap().is_empty());
    }
}
