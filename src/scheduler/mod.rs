//! Scan scheduling pipeline and schedule statistics.
//!
//! Turns a Gantt plan into the fewest scan events that still give every
//! task a feasible inspection date.
//!
//! # Algorithm
//!
//! `ScanScheduler` chains the stages in order:
//! normalize → derive windows → cluster → attach leaves → place repeats.
//! Clustering is a greedy maximum-overlap heuristic over tasks sorted by
//! end date. It is deterministic but not optimal.
//!
//! # Summary
//!
//! `ScheduleSummary` reports event counts, repeat placements and timespan
//! lengths of a finished schedule.

pub mod attach;
pub mod bisect;
pub mod cluster;
pub mod extra;
pub mod normalize;
mod pipeline;
mod summary;
pub mod window;

pub use attach::attach_leaves;
pub use bisect::implicit_offsets;
pub use cluster::cluster;
pub use extra::ExtraScanPlacer;
pub use normalize::normalize;
pub use pipeline::{ScanScheduler, ScheduleRequest};
pub use summary::ScheduleSummary;
pub use window::{derive_windows, DependencyWindow, WindowPartition};
