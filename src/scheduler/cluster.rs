//! Greedy maximum-overlap clustering of dependency windows.
//!
//! Groups dependency-bearing tasks that share feasible dates into as few
//! scan events as the greedy order allows.
//!
//! # Algorithm
//!
//! Windows are visited in task (end-date) order; a claimed marker keeps
//! every task in exactly one event. For each unclaimed task `i`:
//!
//! 1. For every other unclaimed task `n`, for every date of `n`'s window
//!    that is also in `i`'s window, `n` joins the bucket keyed by that date.
//!    Buckets are created lazily and remember creation order.
//! 2. No bucket → `i` becomes a standalone event over its whole window.
//! 3. Otherwise the bucket with the most members wins; among equals the
//!    earliest-created one. `i` joins it.
//! 4. The member with the fewest dates from the anchor onwards supplies
//!    the baseline dates (`i` first, then members in order, strict `<`).
//! 5. The event's timespan starts at the anchor and grows day by day along
//!    the baseline while every member's window contains the date; it stops
//!    at the first date not shared by all.
//! 6. All members are claimed.
//!
//! Early finishers claim slack first, which keeps later, tighter windows
//! from fragmenting the schedule.
//!
//! # Complexity
//! O(n² · w · log w) for n windows of up to w dates.

use chrono::NaiveDate;

use super::window::DependencyWindow;
use crate::error::ScanError;
use crate::models::{MemberRef, ScanEvent};
use crate::trace::{TraceEvent, Tracer};

/// Tasks sharing one candidate date with the task being clustered.
#[derive(Debug, Clone)]
struct Bucket {
    anchor: NaiveDate,
    members: Vec<usize>,
}

/// A cluster under construction, in working indices.
#[derive(Debug, Clone)]
struct Cluster {
    members: Vec<usize>,
    timespan: Vec<NaiveDate>,
}

/// Clusters dependency windows into scan events.
///
/// # Errors
/// [`ScanError::EmptyTimespan`] / [`ScanError::UnorderedTimespan`] if an
/// assembled event violates the timespan invariant.
pub fn cluster(windows: &[DependencyWindow], tracer: &Tracer) -> Result<Vec<ScanEvent>, ScanError> {
    let mut claimed = vec![false; windows.len()];
    let mut clusters = Vec::new();

    for i in 0..windows.len() {
        if claimed[i] {
            continue;
        }

        let buckets = collect_buckets(windows, &claimed, i);
        let Some(best) = select_bucket(&buckets) else {
            claimed[i] = true;
            tracer.emit(|| TraceEvent::Standalone {
                task: windows[i].task_id,
            });
            clusters.push(Cluster {
                members: vec![i],
                timespan: windows[i].timespan.clone(),
            });
            continue;
        };

        let mut members = best.members.clone();
        members.push(i);
        let timespan = grow_timespan(windows, &members, best.anchor, baseline(windows, best, i));

        for &m in &members {
            claimed[m] = true;
        }
        tracer.emit(|| TraceEvent::BucketSelected {
            task: windows[i].task_id,
            anchor: best.anchor,
            members: members.len(),
            days: timespan.len(),
        });
        clusters.push(Cluster { members, timespan });
    }

    clusters
        .into_iter()
        .map(|c| -> Result<ScanEvent, ScanError> {
            let mut event = ScanEvent::new(c.timespan)?;
            for m in c.members {
                event.attach(MemberRef::Real(windows[m].task_id), windows[m].text.clone());
            }
            Ok(event)
        })
        .collect()
}

fn collect_buckets(windows: &[DependencyWindow], claimed: &[bool], i: usize) -> Vec<Bucket> {
    let own = &windows[i].timespan;
    let mut buckets: Vec<Bucket> = Vec::new();

    for (n, other) in windows.iter().enumerate() {
        if claimed[n] || n == i {
            continue;
        }
        for &date in &other.timespan {
            if own.binary_search(&date).is_err() {
                continue;
            }
            match buckets.iter_mut().find(|b| b.anchor == date) {
                Some(bucket) => bucket.members.push(n),
                None => buckets.push(Bucket {
                    anchor: date,
                    members: vec![n],
                }),
            }
        }
    }

    buckets
}

/// Largest bucket; the first created wins ties.
fn select_bucket(buckets: &[Bucket]) -> Option<&Bucket> {
    buckets.iter().fold(None, |best, b| match best {
        Some(current) if current.members.len() >= b.members.len() => Some(current),
        _ => Some(b),
    })
}

/// Dates of `window` from `anchor` onwards.
fn remaining_from<'a>(window: &'a DependencyWindow, anchor: NaiveDate) -> &'a [NaiveDate] {
    let start = window.timespan.partition_point(|d| *d < anchor);
    &window.timespan[start..]
}

/// The member window with the fewest dates left at the anchor.
fn baseline<'a>(windows: &'a [DependencyWindow], bucket: &Bucket, i: usize) -> &'a [NaiveDate] {
    let mut best = remaining_from(&windows[i], bucket.anchor);
    for &m in &bucket.members {
        let candidate = remaining_from(&windows[m], bucket.anchor);
        if candidate.len() < best.len() {
            best = candidate;
        }
    }
    best
}

fn grow_timespan(
    windows: &[DependencyWindow],
    members: &[usize],
    anchor: NaiveDate,
    baseline: &[NaiveDate],
) -> Vec<NaiveDate> {
    let mut timespan = vec![anchor];
    for &date in baseline.iter().skip_while(|d| **d <= anchor) {
        let shared = members
            .iter()
            .all(|&m| windows[m].timespan.binary_search(&date).is_ok());
        if !shared {
            break;
        }
        timespan.push(date);
    }
    timespan
}
