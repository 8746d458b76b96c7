//! Error types for u-scan-schedule.
//!
//! Input problems are collected and reported together as
//! [`ScanError::Validation`]. Timespan violations are internal defects and
//! are surfaced as-is instead of being repaired.

use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::TaskId;
use crate::validation::ValidationError;

/// Error type for a scan scheduling run.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The input batch failed validation; nothing was computed.
    #[error("input rejected: {}", summarize(.0))]
    Validation(Vec<ValidationError>),

    /// A link points at a task that does not exist.
    #[error("task {task} depends on unknown task {target}")]
    UnresolvedDependency { task: TaskId, target: TaskId },

    /// A scan event ended up with no dates.
    #[error("{context} has an empty timespan")]
    EmptyTimespan { context: String },

    /// A scan event's dates are not strictly ascending.
    #[error("{context} has dates out of order or duplicated")]
    UnorderedTimespan { context: String },

    /// A task is scanned as itself in more than one event.
    #[error("task {task} is scanned as itself more than once")]
    DuplicateMember { task: TaskId },

    /// A scan event refers to a task the schedule does not contain.
    #[error("scan member {member} does not refer to a scheduled task")]
    UnknownMember { member: String },

    /// A day offset moved a date outside the supported calendar.
    #[error("shifting {date} by {days} days leaves the supported calendar")]
    DateOutOfRange { date: NaiveDate, days: i64 },

    /// The run exceeded its wall-clock limit and was abandoned.
    #[error("scan scheduling exceeded its time limit of {limit:?}")]
    TimeLimitExceeded { limit: Duration },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<Vec<ValidationError>> for ScanError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Validation(errors)
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    match errors {
        [] => "no details".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}

/// Result alias for scan scheduling.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_validation_message() {
        let err = ScanError::from(vec![
            ValidationError::new(ValidationErrorKind::DuplicateId, "Duplicate task ID: 3"),
            ValidationError::new(ValidationErrorKind::InvalidDate, "bad date"),
        ]);
        assert_eq!(
            err.to_string(),
            "input rejected: Duplicate task ID: 3 (and 1 more)"
        );
    }

    #[test]
    fn test_dependency_message() {
        let err = ScanError::UnresolvedDependency {
            task: TaskId(4),
            target: TaskId(99),
        };
        assert_eq!(err.to_string(), "task 4 depends on unknown task 99");
    }
}
