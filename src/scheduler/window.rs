//! Dependency window derivation.
//!
//! A task with dependencies can be scanned from its own completion until
//! its earliest dependency becomes available, extended by the part of that
//! dependency's duration allowed to overlap.
//!
//! # Algorithm
//!
//! For each dependency-bearing task, in end-date order:
//! 1. `end_scan` = earliest `schedule_time` entry (first on ties); that
//!    entry's dependency is the *governing* dependency.
//! 2. `start_scan` = the task's end date.
//! 3. `overlap_days = round(dep.duration * dep.overlap_fraction)`, with a
//!    negative fraction counting as zero.
//! 4. If `start_scan > end_scan` (the plan lets the dependency start before
//!    this task finishes), with `difference` = days between them:
//!    the task's overlap fraction drops by `difference / overlap_days` when
//!    `overlap_days >= difference`, else to zero; `end_scan = start_scan`.
//!    The fraction is clamped at zero and stays on the task, so later tasks
//!    depending on it see the reduced value.
//! 5. If the task's overlap fraction is still positive, `end_scan` moves
//!    `overlap_days` later.
//! 6. The timespan holds every day from `start_scan` up to but excluding
//!    `end_scan`, and always at least `start_scan`.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::ScanError;
use crate::models::{shift_days, Task, TaskId};
use crate::trace::{TraceEvent, Tracer};

/// Feasible scan dates of one dependency-bearing task.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyWindow {
    /// The task.
    pub task_id: TaskId,
    /// Its label.
    pub text: String,
    /// Ascending, gap-free, never empty.
    pub timespan: Vec<NaiveDate>,
}

/// Tasks split by whether they have dependencies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowPartition {
    /// Windows of dependency-bearing tasks, in task order.
    pub with_dependency: Vec<DependencyWindow>,
    /// Dependency-free tasks, in task order.
    pub leaves: Vec<Task>,
}

/// Derives scan windows and splits off leaf tasks.
///
/// `tasks` must be in end-date order. Overlap fractions are corrected in
/// place (see module docs).
///
/// # Errors
/// [`ScanError::DateOutOfRange`] when an overlap extension leaves the calendar.
pub fn derive_windows(tasks: &mut [Task], tracer: &Tracer) -> Result<WindowPartition, ScanError> {
    let index: HashMap<TaskId, usize> = tasks.iter().enumerate().map(|(i, t)| (t.id, i)).collect();
    let mut partition = WindowPartition::default();

    for i in 0..tasks.len() {
        let Some((governing, end_scan)) = earliest_dependency(&tasks[i]) else {
            partition.leaves.push(tasks[i].clone());
            continue;
        };

        let overlap_days = tasks[i]
            .dependencies
            .get(governing)
            .and_then(|dep| index.get(dep))
            .map(|&d| (tasks[d].duration as f64 * tasks[d].overlap_fraction.max(0.0)).round() as i64)
            .unwrap_or(0);

        let task = &mut tasks[i];
        let start_scan = task.end_date;
        let mut end_scan = end_scan;

        if start_scan > end_scan {
            let difference = (start_scan - end_scan).num_days();
            end_scan = start_scan;

            if overlap_days >= difference {
                task.overlap_fraction -= difference as f64 / overlap_days as f64;
            } else {
                task.overlap_fraction = 0.0;
            }
            task.overlap_fraction = task.overlap_fraction.max(0.0);

            tracer.emit(|| TraceEvent::WindowCorrected {
                task: task.id,
                difference_days: difference,
                overlap_fraction: task.overlap_fraction,
            });
        }

        if task.overlap_fraction > 0.0 {
            end_scan = shift_days(end_scan, overlap_days)?;
        }

        let timespan = days_between(start_scan, end_scan);
        tracer.emit(|| TraceEvent::WindowDerived {
            task: task.id,
            first: start_scan,
            days: timespan.len(),
            overlap_fraction: task.overlap_fraction,
        });

        partition.with_dependency.push(DependencyWindow {
            task_id: task.id,
            text: task.text.clone(),
            timespan,
        });
    }

    Ok(partition)
}

/// Index and date of the earliest dependency availability.
fn earliest_dependency(task: &Task) -> Option<(usize, NaiveDate)> {
    task.schedule_time
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, date)| match best {
            Some((_, current)) if current <= date => best,
            _ => Some((i, date)),
        })
}

/// `[start, end)` by day, but never empty: `start` is always included.
fn days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = vec![start];
    days.extend(start.iter_days().skip(1).take_while(|d| *d < end));
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dates(from: &str, to: &str) -> Vec<NaiveDate> {
        d(from).iter_days().take_while(|x| *x <= d(to)).collect()
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between(d("2024-01-03"), d("2024-01-06")), dates("2024-01-03", "2024-01-05"));
        assert_eq!(days_between(d("2024-01-03"), d("2024-01-03")), vec![d("2024-01-03")]);
        assert_eq!(days_between(d("2024-01-03"), d("2024-01-01")), vec![d("2024-01-03")]);
    }

    #[test]
    fn test_earliest_dependency_first_on_ties() {
        let t = Task::new(1, d("2024-01-01"), d("2024-01-02"))
            .with_dependency(5, d("2024-01-09"))
            .with_dependency(6, d("2024-01-07"))
            .with_dependency(7, d("2024-01-07"));
        assert_eq!(earliest_dependency(&t), Some((1, d("2024-01-07"))));
        assert_eq!(earliest_dependency(&Task::new(2, d("2024-01-01"), d("2024-01-01"))), None);
    }

    #[test]
    fn test_window_until_dependency() {
        // B ends 01-03, its dependency C is available 01-06
        let mut tasks = vec![
            Task::new(3, d("2023-12-30"), d("2024-01-02")).with_overlap(0.001),
            Task::new(2, d("2023-12-31"), d("2024-01-03"))
                .with_overlap(0.001)
                .with_dependency(3, d("2024-01-06")),
        ];
        let p = derive_windows(&mut tasks, &Tracer::disabled()).unwrap();
        assert_eq!(p.leaves.len(), 1);
        assert_eq!(p.leaves[0].id, TaskId(3));
        assert_eq!(p.with_dependency.len(), 1);
        assert_eq!(p.with_dependency[0].timespan, dates("2024-01-03", "2024-01-05"));
    }

    #[test]
    fn test_window_extended_by_dependency_overlap() {
        let mut tasks = vec![
            Task::new(1, d("2024-01-01"), d("2024-01-11")).with_overlap(0.5),
            Task::new(2, d("2024-01-01"), d("2024-01-12"))
                .with_overlap(0.2)
                .with_dependency(1, d("2024-01-14")),
        ];
        let p = derive_windows(&mut tasks, &Tracer::disabled()).unwrap();
        // overlap days = round(10 * 0.5) = 5, end = 01-19
        assert_eq!(p.with_dependency[0].timespan, dates("2024-01-12", "2024-01-18"));
    }

    #[test]
    fn test_inversion_reduces_overlap() {
        let mut tasks = vec![
            Task::new(1, d("2024-01-01"), d("2024-01-11")).with_overlap(0.5),
            Task::new(2, d("2024-01-01"), d("2024-01-12"))
                .with_overlap(0.6)
                .with_dependency(1, d("2024-01-10")),
        ];
        let p = derive_windows(&mut tasks, &Tracer::disabled()).unwrap();
        // difference 2 days, overlap days 5 → 0.6 - 0.4 = 0.2 stays positive
        assert!((tasks[1].overlap_fraction - 0.2).abs() < 1e-9);
        assert_eq!(p.with_dependency[0].timespan, dates("2024-01-12", "2024-01-16"));
    }

    #[test]
    fn test_inversion_exceeding_overlap_zeroes_it() {
        let mut tasks = vec![
            Task::new(1, d("2024-01-01"), d("2024-01-03")).with_overlap(0.5),
            Task::new(2, d("2024-01-01"), d("2024-01-12"))
                .with_overlap(0.6)
                .with_dependency(1, d("2024-01-02")),
        ];
        let p = derive_windows(&mut tasks, &Tracer::disabled()).unwrap();
        assert_eq!(tasks[1].overlap_fraction, 0.0);
        assert_eq!(p.with_dependency[0].timespan, vec![d("2024-01-12")]);
    }

    #[test]
    fn test_reduction_clamped_at_zero() {
        let mut tasks = vec![
            Task::new(1, d("2024-01-01"), d("2024-01-11")).with_overlap(0.5),
            Task::new(2, d("2024-01-01"), d("2024-01-12"))
                .with_overlap(0.1)
                .with_dependency(1, d("2024-01-08")),
        ];
        let p = derive_windows(&mut tasks, &Tracer::disabled()).unwrap();
        // 0.1 - 4/5 < 0 → clamped, no extension
        assert_eq!(tasks[1].overlap_fraction, 0.0);
        assert_eq!(p.with_dependency[0].timespan, vec![d("2024-01-12")]);
    }

    #[test]
    fn test_corrected_overlap_visible_to_later_tasks() {
        let mut tasks = vec![
            Task::new(1, d("2024-01-01"), d("2024-01-05")).with_overlap(0.5),
            Task::new(2, d("2024-01-01"), d("2024-01-11"))
                .with_overlap(0.5)
                .with_dependency(1, d("2024-01-01")),
            Task::new(3, d("2024-01-01"), d("2024-01-12"))
                .with_overlap(0.5)
                .with_dependency(2, d("2024-01-20")),
        ];
        let p = derive_windows(&mut tasks, &Tracer::disabled()).unwrap();
        // task 2 is zeroed, so task 3 gets round(10 * 0) = 0 extra days
        assert_eq!(tasks[1].overlap_fraction, 0.0);
        assert_eq!(p.with_dependency[1].timespan, dates("2024-01-12", "2024-01-19"));
    }

    #[test]
    fn test_grouping_dependency_contributes_nothing() {
        let mut tasks = vec![Task::new(2, d("2024-01-01"), d("2024-01-04"))
            .with_overlap(0.5)
            .with_dependency(99, d("2024-01-06"))];
        let p = derive_windows(&mut tasks, &Tracer::disabled()).unwrap();
        assert_eq!(p.with_dependency[0].timespan, dates("2024-01-04", "2024-01-05"));
    }

    #[test]
    fn test_zero_duration_still_one_date() {
        let mut tasks = vec![Task::new(2, d("2024-01-04"), d("2024-01-04"))
            .with_overlap(0.0)
            .with_dependency(9, d("2024-01-04"))];
        let p = derive_windows(&mut tasks, &Tracer::disabled()).unwrap();
        assert_eq!(p.with_dependency[0].timespan, vec![d("2024-01-04")]);
    }

    #[test]
    fn test_negative_dependency_overlap_counts_as_zero() {
        // 2 ends 01-12; its dependency 1 starts 01-20 with a negative overlap
        let mut tasks = vec![
            Task::new(2, d("2024-01-01"), d("2024-01-12"))
                .with_overlap(0.5)
                .with_dependency(1, d("2024-01-20")),
            Task::new(1, d("2024-01-20"), d("2024-01-30")).with_overlap(-0.5),
        ];
        let p = derive_windows(&mut tasks, &Tracer::disabled()).unwrap();
        assert_eq!(p.with_dependency[0].timespan, dates("2024-01-12", "2024-01-19"));
    }

    #[test]
    fn test_extension_past_calendar_is_an_error() {
        let mut tasks = vec![
            Task::new(1, d("2024-01-01"), d("2024-01-11")).with_overlap(1e12),
            Task::new(2, d("2024-01-01"), d("2024-01-12"))
                .with_overlap(0.2)
                .with_dependency(1, d("2024-01-14")),
        ];
        assert!(matches!(
            derive_windows(&mut tasks, &Tracer::disabled()),
            Err(ScanError::DateOutOfRange { .. })
        ));
    }
}
