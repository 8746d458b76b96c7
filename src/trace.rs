//! Injectable fine-grained trace hook.
//!
//! Per-decision diagnostics (which bucket won, how a window was corrected,
//! where a repeat scan landed) are too chatty for the log. Callers that want
//! them install a [`TraceHook`]; the pipeline reports through a [`Tracer`].
//!
//! Events are only built and delivered in debug builds. In release builds
//! [`Tracer::emit`] compiles to nothing and the closure is never called.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::models::{MemberRef, TaskId};

/// A single pipeline decision.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// A dependency window was derived.
    WindowDerived {
        task: TaskId,
        first: NaiveDate,
        days: usize,
        overlap_fraction: f64,
    },
    /// A task's completion fell after its dependency's availability.
    WindowCorrected {
        task: TaskId,
        difference_days: i64,
        overlap_fraction: f64,
    },
    /// The clusterer grouped a task with others.
    BucketSelected {
        task: TaskId,
        anchor: NaiveDate,
        members: usize,
        days: usize,
    },
    /// The clusterer found nothing to share dates with.
    Standalone { task: TaskId },
    /// A leaf task was attached to an event.
    LeafAttached { task: TaskId, anchor: NaiveDate },
    /// A repeat scan was placed.
    RepeatPlaced {
        member: MemberRef,
        date: NaiveDate,
        merged: bool,
    },
}

/// Callback receiving trace events.
pub type TraceHook = Arc<dyn Fn(&TraceEvent) + Send + Sync>;

/// Delivers trace events to an optional hook.
#[derive(Clone, Default)]
pub struct Tracer {
    hook: Option<TraceHook>,
}

impl Tracer {
    /// A tracer that drops everything.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// A tracer delivering to `hook`.
    pub fn new(hook: TraceHook) -> Self {
        Self { hook: Some(hook) }
    }

    /// Builds and delivers an event if a hook is installed (debug builds only).
    #[inline(always)]
    pub fn emit(&self, event: impl FnOnce() -> TraceEvent) {
        #[cfg(debug_assertions)]
        if let Some(hook) = &self.hook {
            hook(&event());
        }
        #[cfg(not(debug_assertions))]
        let _ = event;
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.hook.is_some())
            .finish()
    }
}
