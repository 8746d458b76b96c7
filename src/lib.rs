//! Inspection scan scheduling for Gantt project plans.
//!
//! Derives the fewest physical site-scan events that still give every task
//! a feasible inspection date, then places mandatory repeat scans.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `RawTask`, `Task`, `Link`, `TaskOverride`,
//!   `ScanEvent`, `ScanSchedule`, `WorkHoursCalendar`, `ProjectPlan`
//! - **`validation`**: Batch checks (duplicate IDs, dates, override completeness)
//! - **`scheduler`**: The pipeline: normalize, windows, clustering, leaf
//!   attachment, repeat placement; plus `ScheduleSummary`
//! - **`output`**: Gantt rows, date index, the stored document and `ScheduleStore`
//! - **`config`**: `ScanConfig`
//! - **`trace`**: Optional per-decision trace hook (debug builds)
//!
//! # Example
//!
//! ```
//! use u_scan_schedule::{output, ScanScheduler, ScheduleRequest};
//! use u_scan_schedule::models::{Link, RawTask};
//!
//! let request = ScheduleRequest::new(vec![
//!     RawTask::new(1, "2024-01-01", 5).with_text("Formwork"),
//!     RawTask::new(2, "2024-01-01", 3).with_text("Rebar"),
//!     RawTask::new(3, "2024-01-02", 2).with_text("Conduits"),
//! ])
//! .with_links(vec![Link::new(2, 1), Link::new(3, 1)]);
//!
//! let schedule = ScanScheduler::new().schedule(&request).unwrap();
//! let rows = output::serialize(&schedule).unwrap();
//! assert_eq!(rows.date_index.len(), schedule.event_count());
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod scheduler;
pub mod trace;
pub mod validation;

pub use config::ScanConfig;
pub use error::{Result, ScanError};
pub use scheduler::{ScanScheduler, ScheduleRequest, ScheduleSummary};
