//! Pipeline configuration.

use std::time::Duration;

use crate::trace::{TraceHook, Tracer};

/// Default share added to every task's overlap so a zero overlap never
/// collapses a window by accident.
pub const DEFAULT_OVERLAP_EPSILON: f64 = 0.001;

/// Default wall-clock cap for one run.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(600);

/// Settings for one scan scheduling run.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use u_scan_schedule::ScanConfig;
///
/// let config = ScanConfig::new()
///     .with_time_limit(Some(Duration::from_secs(30)))
///     .with_overlap_epsilon(0.0);
/// assert_eq!(config.overlap_epsilon, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Added to every task's overlap fraction.
    pub overlap_epsilon: f64,
    /// Wall-clock cap, checked between stages. `None` = unbounded.
    pub time_limit: Option<Duration>,
    /// Receives per-decision trace events in debug builds.
    pub tracer: Tracer,
}

impl ScanConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            overlap_epsilon: DEFAULT_OVERLAP_EPSILON,
            time_limit: Some(DEFAULT_TIME_LIMIT),
            tracer: Tracer::disabled(),
        }
    }

    /// Sets the overlap epsilon.
    pub fn with_overlap_epsilon(mut self, epsilon: f64) -> Self {
        self.overlap_epsilon = epsilon;
        self
    }

    /// Sets or clears the wall-clock cap.
    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    /// Installs a trace hook.
    pub fn with_trace_hook(mut self, hook: TraceHook) -> Self {
        self.tracer = Tracer::new(hook);
        self
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new()
    }
}
