//! Weekly work-hours calendar.
//!
//! Mirrors the Gantt `worktime` block: a default hour list plus seven
//! weekday slots (Sunday first). An empty slot means "no explicit hours";
//! the output document fills it with the default list.
//!
//! # Working days
//! Before normalization, a weekday counts as a working day iff its slot is
//! non-empty. [`WorkHoursCalendar::calendar_days_for`] uses that rule to turn
//! a working-day duration into a calendar-day span.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use super::RawTask;

/// One entry of an hour list: either a bare hour or a `"8:00-12:00"` range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HourEntry {
    /// A bare hour boundary.
    Hour(u32),
    /// A textual range.
    Range(String),
}

/// Seven weekday slots plus the default hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkHoursCalendar {
    /// Default hours, used for empty weekday slots.
    #[serde(default)]
    pub hours: Vec<HourEntry>,
    /// Sunday..Saturday. Plans write `false`, `null` or `[]` for an empty slot.
    #[serde(default, deserialize_with = "deserialize_day_slots")]
    pub dates: [Vec<HourEntry>; 7],
}

impl WorkHoursCalendar {
    /// Creates a calendar with default hours and all weekday slots empty.
    pub fn new(hours: Vec<HourEntry>) -> Self {
        Self {
            hours,
            dates: Default::default(),
        }
    }

    /// Sets explicit hours for a weekday (0 = Sunday).
    pub fn with_day(mut self, weekday: usize, hours: Vec<HourEntry>) -> Self {
        if let Some(slot) = self.dates.get_mut(weekday) {
            *slot = hours;
        }
        self
    }

    /// Copy with every empty weekday slot filled with the default hours.
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        for slot in out.dates.iter_mut().filter(|s| s.is_empty()) {
            slot.clone_from(&self.hours);
        }
        out
    }

    /// Whether the weekday (0 = Sunday) has explicit hours.
    #[inline]
    pub fn is_working_weekday(&self, weekday: usize) -> bool {
        self.dates.get(weekday).is_some_and(|slot| !slot.is_empty())
    }

    /// Hours in effect on a weekday (explicit, else default).
    pub fn hours_for(&self, weekday: usize) -> &[HourEntry] {
        match self.dates.get(weekday) {
            Some(slot) if !slot.is_empty() => slot,
            _ => &self.hours,
        }
    }

    /// Calendar days needed to fit `working_days` starting on `start`.
    ///
    /// Every non-working weekday met on the way adds one calendar day.
    /// The result is rounded up. Returns `None` when no weekday is a
    /// working day, since the span would never close.
    pub fn calendar_days_for(&self, start: NaiveDate, working_days: f64) -> Option<i64> {
        if !(0..7).any(|d| self.is_working_weekday(d)) {
            return None;
        }

        let mut weekday = start.weekday().num_days_from_sunday() as usize;
        let mut counted = 0.0;
        let mut calendar_days = working_days;
        while counted < working_days {
            if self.is_working_weekday(weekday) {
                counted += 1.0;
            } else {
                calendar_days += 1.0;
            }
            weekday = (weekday + 1) % 7;
        }

        Some(calendar_days.ceil() as i64)
    }
}

/// Fills `custom_data.duration_days` for every task from the calendar.
///
/// `hours_per_day` converts plan units to days: 1 for day-unit plans,
/// the length of a work day for hour-unit plans. Tasks with an unparsable
/// start date are left alone; validation reports them. Returns how many
/// tasks were updated.
pub fn assign_custom_durations(
    tasks: &mut [RawTask],
    calendar: &WorkHoursCalendar,
    hours_per_day: f64,
) -> usize {
    let mut updated = 0;
    for task in tasks.iter_mut() {
        let Some(start) = task.parsed_start() else {
            continue;
        };
        let working_days = task.duration as f64 / hours_per_day;
        if let Some(days) = calendar.calendar_days_for(start, working_days) {
            task.custom_data.duration_days = Some(days);
            updated += 1;
        }
    }
    updated
}

fn deserialize_day_slots<'de, D>(deserializer: D) -> Result<[Vec<HourEntry>; 7], D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Slot {
        Hours(Vec<HourEntry>),
        Flag(Option<bool>),
    }

    let slots: Vec<Slot> = Vec::deserialize(deserializer)?;
    let mut days: [Vec<HourEntry>; 7] = Default::default();
    for (day, slot) in days.iter_mut().zip(slots) {
        if let Slot::Hours(hours) = slot {
            *day = hours;
        }
    }
    Ok(days)
}
