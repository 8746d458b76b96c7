//! Scan scheduling domain models.
//!
//! Provides the data types for the scan pipeline: plan input, normalized
//! tasks, scan events and the resulting schedule.
//!
//! # Domain Mappings
//!
//! | u-scan-schedule | Construction site | Plant maintenance |
//! |-----------------|-------------------|-------------------|
//! | Task | Work package | Work order |
//! | Link | Predecessor | Prerequisite |
//! | ScanEvent | Site scan visit | Inspection round |
//! | TaskOverride | Package QA plan | Inspection plan |

mod calendar;
mod link;
mod overrides;
mod plan;
pub(crate) mod scan;
mod schedule;
mod task;

pub use calendar::{assign_custom_durations, HourEntry, WorkHoursCalendar};
pub use link::Link;
pub use overrides::{GlobalInput, RawOverride, TaskOverride};
pub use plan::ProjectPlan;
pub use scan::{MemberRef, ScanEvent};
pub use schedule::ScanSchedule;
pub use task::{parse_plan_date, shift_days, CustomData, RawTask, Task, TaskId};
