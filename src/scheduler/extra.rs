//! Repeat scan placement.
//!
//! Some tasks need more than the one scan clustering gives them. Each
//! override with `ExtraScan > 0` places that many additional scans within
//! the task's own dates, preferring to piggyback on events that already
//! happen then.
//!
//! # Algorithm
//!
//! Per override, in list order:
//! 1. *Existing* events are those anchored within the task's dates at the
//!    start of the override.
//! 2. **Explicit** scans: for each preferred location, `target` and
//!    `tolerance` are its percentages of the duration in days. The first
//!    existing event anchored in `[target - tolerance, target + tolerance]`
//!    is narrowed to end no later than the window and takes the scan;
//!    otherwise a single-day event at `target` is created.
//! 3. **Implicit** scans: day offsets from [`implicit_offsets`]. A date
//!    already used by this task is skipped; a date covered by an existing
//!    event narrows that event to the date; anything else becomes a new
//!    single-day event.
//! 4. Scans still missing go to the first unused days of the task.
//! 5. Events are re-sorted by first date.
//!
//! Every placement is a synthetic member with a fresh sequence number.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use tracing::warn;

use super::bisect::implicit_offsets;
use crate::error::ScanError;
use crate::models::{shift_days, MemberRef, ScanEvent, Task, TaskId, TaskOverride};
use crate::trace::{TraceEvent, Tracer};

/// Places repeat scans for overridden tasks.
#[derive(Debug)]
pub struct ExtraScanPlacer<'a> {
    tasks: HashMap<TaskId, &'a Task>,
    next_sequence: u64,
    tracer: &'a Tracer,
}

/// Working state for one task's repeat scans.
struct TaskPlacement<'t> {
    task: &'t Task,
    existing: Vec<usize>,
    banned: BTreeSet<NaiveDate>,
    remaining: usize,
}

impl<'a> ExtraScanPlacer<'a> {
    /// Creates a placer over normalized `tasks`.
    ///
    /// `first_sequence` must exceed every real task id.
    pub fn new(tasks: &'a [Task], first_sequence: u64, tracer: &'a Tracer) -> Self {
        Self {
            tasks: tasks.iter().map(|t| (t.id, t)).collect(),
            next_sequence: first_sequence,
            tracer,
        }
    }

    /// The sequence number the next placement will get.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Places every requested repeat scan. Returns the number placed.
    ///
    /// # Errors
    /// Timespan invariant violations while narrowing an event.
    pub fn place(
        &mut self,
        events: &mut Vec<ScanEvent>,
        overrides: &[TaskOverride],
    ) -> Result<usize, ScanError> {
        let mut placed = 0;

        for ov in overrides.iter().filter(|ov| ov.extra_scan > 0) {
            let Some(&task) = self.tasks.get(&ov.task_id) else {
                warn!(task = %ov.task_id, "extra scans requested for a task that is not scheduled");
                continue;
            };

            let mut state = TaskPlacement {
                task,
                existing: events
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| task.start_date <= e.anchor() && e.anchor() <= task.end_date)
                    .map(|(k, _)| k)
                    .collect(),
                banned: BTreeSet::new(),
                remaining: ov.extra_scan as usize,
            };

            for (&location, &distance) in ov.scan_location.iter().zip(&ov.scan_distance) {
                self.place_explicit(events, &mut state, location, distance)?;
            }
            self.place_implicit(events, &mut state, ov.implicit_count())?;
            self.fill_remaining(events, &mut state);

            placed += ov.extra_scan as usize - state.remaining;
            events.sort_by_key(ScanEvent::anchor);
        }

        Ok(placed)
    }

    fn place_explicit(
        &mut self,
        events: &mut Vec<ScanEvent>,
        state: &mut TaskPlacement<'_>,
        location: f64,
        distance: f64,
    ) -> Result<(), ScanError> {
        let task = state.task;
        let target = percent_of(task.duration, location);
        let tolerance = percent_of(task.duration, distance);
        let window_start = shift_days(task.start_date, target - tolerance)?;
        let window_end = shift_days(task.start_date, target + tolerance)?;

        let hit = state
            .existing
            .iter()
            .copied()
            .find(|&k| (window_start..=window_end).contains(&events[k].anchor()));

        match hit {
            Some(k) => {
                let narrowed: Vec<NaiveDate> = events[k]
                    .timespan()
                    .iter()
                    .copied()
                    .take_while(|d| *d <= window_end)
                    .collect();
                events[k].set_timespan(narrowed)?;
                state.banned.extend(events[k].timespan().iter().copied());
                let date = events[k].anchor();
                self.attach(&mut events[k], task, date, true);
            }
            None => {
                // not added to `existing`: later scans of this task never merge into it
                let date = shift_days(task.start_date, target)?;
                state.banned.insert(date);
                let mut event = ScanEvent::on(date);
                self.attach(&mut event, task, date, false);
                events.push(event);
            }
        }

        state.remaining = state.remaining.saturating_sub(1);
        Ok(())
    }

    fn place_implicit(
        &mut self,
        events: &mut Vec<ScanEvent>,
        state: &mut TaskPlacement<'_>,
        count: usize,
    ) -> Result<(), ScanError> {
        if count == 0 {
            return Ok(());
        }

        let task = state.task;
        let mut free = Vec::new();

        for offset in implicit_offsets(task.duration, count) {
            let date = shift_days(task.start_date, offset)?;
            if state.banned.contains(&date) {
                continue;
            }
            match state.existing.iter().copied().find(|&k| events[k].covers(date)) {
                Some(k) if state.remaining > 0 => {
                    events[k].set_timespan(vec![date])?;
                    state.banned.insert(date);
                    self.attach(&mut events[k], task, date, true);
                    state.remaining -= 1;
                }
                Some(_) => {}
                None => free.push(date),
            }
        }

        for date in free {
            if state.remaining == 0 {
                break;
            }
            state.banned.insert(date);
            let mut event = ScanEvent::on(date);
            self.attach(&mut event, task, date, false);
            events.push(event);
            state.remaining -= 1;
        }

        Ok(())
    }

    fn fill_remaining(&mut self, events: &mut Vec<ScanEvent>, state: &mut TaskPlacement<'_>) {
        let task = state.task;
        let mut days = task
            .start_date
            .iter_days()
            .take_while(|d| *d <= task.end_date);

        while state.remaining > 0 {
            let Some(date) = days.find(|d| !state.banned.contains(d)) else {
                break;
            };
            state.banned.insert(date);
            let mut event = ScanEvent::on(date);
            self.attach(&mut event, task, date, false);
            events.push(event);
            state.remaining -= 1;
        }
    }

    fn attach(&mut self, event: &mut ScanEvent, task: &Task, date: NaiveDate, merged: bool) {
        let member = MemberRef::Synthetic {
            sequence: self.next_sequence,
            original: task.id,
        };
        self.next_sequence += 1;
        event.attach(member, task.text.clone());
        self.tracer.emit(|| TraceEvent::RepeatPlaced {
            member,
            date,
            merged,
        });
    }
}

/// `round(duration / 100 * percent)` in whole days.
fn percent_of(duration: i64, percent: f64) -> i64 {
    (duration as f64 / 100.0 * percent).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn task(id: u64, start: &str, end: &str) -> Task {
        Task::new(id, d(start), d(end)).with_text(format!("T{id}"))
    }

    fn synthetic_dates(events: &[ScanEvent], original: u64) -> Vec<NaiveDate> {
        events
            .iter()
            .filter(|e| {
                e.members()
                    .iter()
                    .any(|m| m.is_synthetic() && m.task_id() == TaskId(original))
            })
            .map(ScanEvent::anchor)
            .collect()
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(20, 50.0), 10);
        assert_eq!(percent_of(20, 10.0), 2);
        assert_eq!(percent_of(7, 50.0), 4);
        assert_eq!(percent_of(0, 80.0), 0);
    }

    #[test]
    fn test_explicit_and_implicit_on_empty_schedule() {
        // duration 20: explicit at day 10, implicit at days 5 and 16
        let tasks = vec![task(1, "2024-01-01", "2024-01-21")];
        let overrides = vec![TaskOverride::new(1, 0, 0, 0.0)
            .with_extra_scans(3)
            .with_location(50.0, 10.0)];
        let tracer = Tracer::disabled();
        let mut placer = ExtraScanPlacer::new(&tasks, 2, &tracer);
        let mut events = Vec::new();

        assert_eq!(placer.place(&mut events, &overrides).unwrap(), 3);
        assert_eq!(
            synthetic_dates(&events, 1),
            vec![d("2024-01-06"), d("2024-01-11"), d("2024-01-17")]
        );
        assert_eq!(placer.next_sequence(), 5);
    }

    #[test]
    fn test_explicit_merges_into_existing_event() {
        let tasks = vec![task(1, "2024-01-01", "2024-01-21")];
        let overrides = vec![TaskOverride::new(1, 0, 0, 0.0)
            .with_extra_scans(1)
            .with_location(50.0, 10.0)];
        let span: Vec<NaiveDate> = d("2024-01-09")
            .iter_days()
            .take_while(|x| *x <= d("2024-01-18"))
            .collect();
        let mut events = vec![ScanEvent::new(span)
            .unwrap()
            .with_member(MemberRef::Real(TaskId(7)), "T7")];
        let tracer = Tracer::disabled();
        let mut placer = ExtraScanPlacer::new(&tasks, 10, &tracer);

        placer.place(&mut events, &overrides).unwrap();
        assert_eq!(events.len(), 1);
        // window is day 8..=12, so the event ends on 01-13
        assert_eq!(events[0].anchor(), d("2024-01-09"));
        assert_eq!(events[0].last_date(), d("2024-01-13"));
        assert_eq!(
            events[0].members()[1],
            MemberRef::Synthetic {
                sequence: 10,
                original: TaskId(1)
            }
        );
    }

    #[test]
    fn test_implicit_merge_narrows_to_date() {
        let tasks = vec![task(1, "2024-01-01", "2024-01-21")];
        let overrides = vec![TaskOverride::new(1, 0, 0, 0.0).with_extra_scans(1)];
        let span: Vec<NaiveDate> = d("2024-01-08")
            .iter_days()
            .take_while(|x| *x <= d("2024-01-14"))
            .collect();
        let mut events = vec![ScanEvent::new(span).unwrap()];
        let tracer = Tracer::disabled();
        let mut placer = ExtraScanPlacer::new(&tasks, 10, &tracer);

        placer.place(&mut events, &overrides).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].timespan(), &[d("2024-01-11")]);
        assert!(events[0].includes_task(TaskId(1)));
    }

    #[test]
    fn test_events_outside_task_not_merged() {
        let tasks = vec![task(1, "2024-01-05", "2024-01-25")];
        let overrides = vec![TaskOverride::new(1, 0, 0, 0.0).with_extra_scans(1)];
        // covers the midpoint but is anchored before the task starts
        let span: Vec<NaiveDate> = d("2024-01-01")
            .iter_days()
            .take_while(|x| *x <= d("2024-01-20"))
            .collect();
        let mut events = vec![ScanEvent::new(span).unwrap()];
        let tracer = Tracer::disabled();
        let mut placer = ExtraScanPlacer::new(&tasks, 10, &tracer);

        placer.place(&mut events, &overrides).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].day_count(), 20);
        assert_eq!(synthetic_dates(&events, 1), vec![d("2024-01-15")]);
    }

    #[test]
    fn test_short_task_fills_first_free_days() {
        // duration 3: bisection yields one offset, the rest fill from the start
        let tasks = vec![task(1, "2024-01-01", "2024-01-04")];
        let overrides = vec![TaskOverride::new(1, 0, 0, 0.0).with_extra_scans(3)];
        let tracer = Tracer::disabled();
        let mut placer = ExtraScanPlacer::new(&tasks, 2, &tracer);
        let mut events = Vec::new();

        assert_eq!(placer.place(&mut events, &overrides).unwrap(), 3);
        assert_eq!(
            synthetic_dates(&events, 1),
            vec![d("2024-01-01"), d("2024-01-02"), d("2024-01-03")]
        );
    }

    #[test]
    fn test_repeats_capped_by_task_days() {
        let tasks = vec![task(1, "2024-01-01", "2024-01-02")];
        let overrides = vec![TaskOverride::new(1, 0, 0, 0.0).with_extra_scans(5)];
        let tracer = Tracer::disabled();
        let mut placer = ExtraScanPlacer::new(&tasks, 2, &tracer);
        let mut events = Vec::new();

        assert_eq!(placer.place(&mut events, &overrides).unwrap(), 2);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_unknown_task_skipped() {
        let tasks = vec![task(1, "2024-01-01", "2024-01-11")];
        let overrides = vec![TaskOverride::new(9, 0, 0, 0.0).with_extra_scans(2)];
        let tracer = Tracer::disabled();
        let mut placer = ExtraScanPlacer::new(&tasks, 10, &tracer);
        let mut events = Vec::new();

        assert_eq!(placer.place(&mut events, &overrides).unwrap(), 0);
        assert!(events.is_empty());
        assert_eq!(placer.next_sequence(), 10);
    }

    #[test]
    fn test_sequence_shared_across_overrides() {
        let tasks = vec![
            task(1, "2024-01-01", "2024-01-11"),
            task(2, "2024-02-01", "2024-02-11"),
        ];
        let overrides = vec![
            TaskOverride::new(2, 0, 0, 0.0).with_extra_scans(1),
            TaskOverride::new(1, 0, 0, 0.0).with_extra_scans(1),
        ];
        let tracer = Tracer::disabled();
        let mut placer = ExtraScanPlacer::new(&tasks, 3, &tracer);
        let mut events = Vec::new();
        placer.place(&mut events, &overrides).unwrap();

        // re-sorted by date: task 1's scan first, but it got the later sequence
        let sequences: Vec<u64> = events.iter().map(|e| e.members()[0].numeric_id()).collect();
        assert_eq!(sequences, vec![4, 3]);
    }
}
