//! Scan event model.
//!
//! A scan event is one physical site inspection. It covers a set of tasks
//! and a window of calendar dates on which all of them can be scanned.
//!
//! # Invariant
//! A timespan is never empty and strictly ascending. The constructors and
//! [`ScanEvent::set_timespan`] enforce this and report violations as
//! [`ScanError`] rather than repairing them.

use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use super::TaskId;
use crate::error::ScanError;

/// A reference from a scan event to a task.
///
/// Repeat scans of the same task need ids distinct from the task itself,
/// so they carry a generated sequence number next to the original id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberRef {
    /// The task itself.
    Real(TaskId),
    /// A repeat scan of `original`, identified by `sequence`.
    Synthetic {
        /// Generated id, above every real task id.
        sequence: u64,
        /// The task being re-scanned.
        original: TaskId,
    },
}

impl MemberRef {
    /// The task this member stands for.
    pub fn task_id(&self) -> TaskId {
        match *self {
            Self::Real(id) => id,
            Self::Synthetic { original, .. } => original,
        }
    }

    /// The id this member is published under.
    pub fn numeric_id(&self) -> u64 {
        match *self {
            Self::Real(id) => id.value(),
            Self::Synthetic { sequence, .. } => sequence,
        }
    }

    /// Whether this is a repeat-scan placement.
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic { .. })
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real(id) => write!(f, "{id}"),
            Self::Synthetic { sequence, original } => write!(f, "{sequence}:{original}"),
        }
    }
}

impl Serialize for MemberRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One inspection event: member tasks and the dates it may happen on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanEvent {
    members: Vec<MemberRef>,
    texts: Vec<String>,
    timespan: Vec<NaiveDate>,
}

impl ScanEvent {
    /// Creates an event with no members over `timespan`.
    ///
    /// # Errors
    /// [`ScanError::EmptyTimespan`] or [`ScanError::UnorderedTimespan`].
    pub fn new(timespan: Vec<NaiveDate>) -> Result<Self, ScanError> {
        check_timespan(&timespan, "new scan event")?;
        Ok(Self {
            members: Vec::new(),
            texts: Vec::new(),
            timespan,
        })
    }

    /// Creates an event with no members on a single date.
    pub fn on(date: NaiveDate) -> Self {
        Self {
            members: Vec::new(),
            texts: Vec::new(),
            timespan: vec![date],
        }
    }

    /// Adds a member with its label.
    pub fn attach(&mut self, member: MemberRef, text: impl Into<String>) {
        self.members.push(member);
        self.texts.push(text.into());
    }

    /// Builder form of [`attach`](Self::attach).
    pub fn with_member(mut self, member: MemberRef, text: impl Into<String>) -> Self {
        self.attach(member, text);
        self
    }

    /// Replaces the timespan.
    ///
    /// # Errors
    /// Same as [`new`](Self::new); the event is left unchanged on error.
    pub fn set_timespan(&mut self, timespan: Vec<NaiveDate>) -> Result<(), ScanError> {
        check_timespan(&timespan, "retimed scan event")?;
        self.timespan = timespan;
        Ok(())
    }

    /// Member references in attachment order.
    pub fn members(&self) -> &[MemberRef] {
        &self.members
    }

    /// Member labels, parallel to [`members`](Self::members).
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// All dates the event may take place on.
    pub fn timespan(&self) -> &[NaiveDate] {
        &self.timespan
    }

    /// First date of the timespan. Events are keyed by it.
    #[inline]
    pub fn anchor(&self) -> NaiveDate {
        self.timespan[0]
    }

    /// Last date of the timespan.
    #[inline]
    pub fn last_date(&self) -> NaiveDate {
        self.timespan[self.timespan.len() - 1]
    }

    /// Whether `date` lies between the first and last date (inclusive).
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.anchor() <= date && date <= self.last_date()
    }

    /// Number of dates in the timespan.
    pub fn day_count(&self) -> usize {
        self.timespan.len()
    }

    /// Whether a real or synthetic member refers to `task`.
    pub fn includes_task(&self, task: TaskId) -> bool {
        self.members.iter().any(|m| m.task_id() == task)
    }
}

/// Rejects empty or non-ascending timespans.
pub(crate) fn check_timespan(timespan: &[NaiveDate], context: &str) -> Result<(), ScanError> {
    if timespan.is_empty() {
        return Err(ScanError::EmptyTimespan {
            context: context.to_string(),
        });
    }
    if timespan.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ScanError::UnorderedTimespan {
            context: context.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_member_ref_display() {
        let real = MemberRef::Real(TaskId(12));
        let synth = MemberRef::Synthetic {
            sequence: 40,
            original: TaskId(12),
        };
        assert_eq!(real.to_string(), "12");
        assert_eq!(synth.to_string(), "40:12");
        assert_eq!(synth.task_id(), TaskId(12));
        assert_eq!(synth.numeric_id(), 40);
        assert!(synth.is_synthetic());
        assert!(!real.is_synthetic());
        assert_eq!(serde_json::to_string(&synth).unwrap(), "\"40:12\"");
    }

    #[test]
    fn test_empty_timespan_rejected() {
        let err = ScanEvent::new(Vec::new()).unwrap_err();
        assert!(matches!(err, ScanError::EmptyTimespan { .. }));
    }

    #[test]
    fn test_unordered_timespan_rejected() {
        let err = ScanEvent::new(vec![d("2024-01-03"), d("2024-01-02")]).unwrap_err();
        assert!(matches!(err, ScanError::UnorderedTimespan { .. }));

        let dup = ScanEvent::new(vec![d("2024-01-03"), d("2024-01-03")]);
        assert!(dup.is_err());
    }

    #[test]
    fn test_set_timespan_keeps_event_on_error() {
        let mut ev = ScanEvent::new(vec![d("2024-01-01"), d("2024-01-02")]).unwrap();
        assert!(ev.set_timespan(Vec::new()).is_err());
        assert_eq!(ev.day_count(), 2);

        ev.set_timespan(vec![d("2024-01-02")]).unwrap();
        assert_eq!(ev.anchor(), d("2024-01-02"));
        assert_eq!(ev.last_date(), d("2024-01-02"));
    }

    #[test]
    fn test_covers_and_members() {
        let ev = ScanEvent::new(vec![d("2024-01-01"), d("2024-01-02"), d("2024-01-03")])
            .unwrap()
            .with_member(MemberRef::Real(TaskId(3)), "Walls");
        assert!(ev.covers(d("2024-01-02")));
        assert!(!ev.covers(d("2024-01-04")));
        assert!(ev.includes_task(TaskId(3)));
        assert_eq!(ev.texts(), &["Walls".to_string()]);
    }
}
