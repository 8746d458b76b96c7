//! Project plan input bundle.
//!
//! Everything one scheduling run reads from the plan source: Gantt tasks and
//! links, presentation config, resources, work hours, and the scan inputs.

use serde::{Deserialize, Serialize};

use super::{GlobalInput, Link, RawOverride, RawTask, WorkHoursCalendar};

/// A Gantt project plan plus scan inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPlan {
    /// External schedule identifier; the output document is keyed by it.
    pub id: String,
    /// Gantt task rows.
    #[serde(default)]
    pub tasks: Vec<RawTask>,
    /// Dependency links.
    #[serde(default)]
    pub links: Vec<Link>,
    /// Gantt presentation config, passed through to the output.
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
    /// Resource definitions, passed through to the output.
    #[serde(default)]
    pub resources: serde_json::Value,
    /// Weekly work hours.
    #[serde(default)]
    pub worktime: WorkHoursCalendar,
    /// Offsets and overlap for all tasks.
    #[serde(default)]
    pub global: GlobalInput,
    /// Per-task overrides.
    #[serde(default)]
    pub overrides: Vec<RawOverride>,
}
