//! The persisted schedule document.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::serialize::{DateIndexEntry, ScanRecord, SerializedSchedule};
use crate::models::{Link, ProjectPlan, WorkHoursCalendar};

/// Rows and links as the Gantt view loads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanData {
    pub scans: Vec<ScanRecord>,
    pub links: Vec<Link>,
}

/// A scan schedule ready to store, keyed by `schedule_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDocument {
    pub schedule_id: String,
    pub data: ScanData,
    /// Plan config with day units forced.
    pub config: serde_json::Map<String, serde_json::Value>,
    pub resources: serde_json::Value,
    /// Work hours with every weekday slot filled.
    pub workhours: WorkHoursCalendar,
    pub date_index: BTreeMap<NaiveDate, DateIndexEntry>,
    /// Kept from the first stored version.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleDocument {
    /// Builds the document for `plan` at time `now`.
    ///
    /// Both timestamps are `now`; a store keeps the original `created_at`
    /// when it replaces an existing document.
    pub fn assemble(plan: &ProjectPlan, serialized: SerializedSchedule, now: DateTime<Utc>) -> Self {
        let mut config = plan.config.clone();
        config.insert("duration_unit".into(), "day".into());
        config.insert("custom_duration_unit".into(), "d".into());

        Self {
            schedule_id: plan.id.clone(),
            data: ScanData {
                scans: serialized.scans,
                links: plan.links.clone(),
            },
            config,
            resources: plan.resources.clone(),
            workhours: plan.worktime.normalized(),
            date_index: serialized.date_index,
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of scan containers.
    pub fn scan_count(&self) -> usize {
        self.data.scans.iter().filter(|r| r.is_container()).count()
    }
}
