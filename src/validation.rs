//! Input validation for scan scheduling.
//!
//! Checks the whole batch before any pipeline stage runs. Detects:
//! - Duplicate task IDs
//! - Unparsable start dates
//! - Overrides with missing fields
//! - Overrides whose repeat-scan lists disagree
//!
//! All problems are collected so the caller sees them at once. Dependency
//! targets are resolved later by the normalizer, which reports the first
//! unknown target as [`ScanError::UnresolvedDependency`](crate::ScanError).

use std::collections::HashSet;

use crate::models::{RawOverride, RawTask, TaskOverride};

/// Validation result.
pub type ValidationResult = Result<Vec<TaskOverride>, Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two tasks share the same ID.
    DuplicateId,
    /// A start date could not be parsed.
    InvalidDate,
    /// An override lacks a mandatory field.
    MissingOverrideField,
    /// An override's scan lists or counts contradict each other.
    InconsistentOverride,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a plan batch and promotes its overrides.
///
/// Checks:
/// 1. No duplicate task IDs
/// 2. Every start date parses
/// 3. Every override carries all fields
/// 4. Every override's location/distance lists match and fit `ExtraScan`
///
/// # Returns
/// The validated overrides in input order, or every detected issue.
pub fn validate_plan(tasks: &[RawTask], overrides: &[RawOverride]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut task_ids = HashSet::new();
    for task in tasks {
        if !task_ids.insert(task.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate task ID: {}", task.id),
            ));
        }

        if task.parsed_start().is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDate,
                format!(
                    "Task '{}' has unparsable start date '{}'",
                    task.id, task.start_date
                ),
            ));
        }
    }

    let mut validated = Vec::with_capacity(overrides.len());
    for raw in overrides {
        match TaskOverride::try_from(raw.clone()) {
            Ok(ov) => {
                errors.extend(ov.check());
                validated.push(ov);
            }
            Err(missing) => errors.extend(missing),
        }
    }

    if errors.is_empty() {
        Ok(validated)
    } else {
        Err(errors)
    }
}
