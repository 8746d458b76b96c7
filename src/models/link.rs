//! Dependency link model.

use serde::{Deserialize, Serialize};

use super::TaskId;

/// A dependency between two plan tasks: `source` depends on `target`.
///
/// Links are passed through to the output document unchanged, so any
/// extra Gantt fields (`type`, `lag`, ...) survive the round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// The dependent task.
    pub source: TaskId,
    /// The task depended on.
    pub target: TaskId,
    /// Fields the scheduler does not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Link {
    /// Creates a link where `source` depends on `target`.
    pub fn new(source: u64, target: u64) -> Self {
        Self {
            source: TaskId(source),
            target: TaskId(target),
            extra: serde_json::Map::new(),
        }
    }
}
