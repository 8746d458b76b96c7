//! Schedule output: Gantt rows, the stored document, and persistence.

mod document;
mod serialize;
mod store;

pub use document::{ScanData, ScheduleDocument};
pub use serialize::{serialize, DateIndexEntry, ScanCustomData, ScanRecord, SerializedSchedule};
pub use store::{JsonDirStore, MemoryStore, ScheduleStore};
