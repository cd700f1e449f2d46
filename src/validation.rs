//! Input validation for explicit task sets.
//!
//! Checks a task set before it is simulated. Detects:
//! - Duplicate names
//! - Names longer than [`MAX_TASK_NAME_LEN`]
//! - Tasks with no work (a zero run time never completes)
//! - Priorities outside the configured levels

use crate::models::MAX_TASK_NAME_LEN;
use crate::simulation::TaskSpec;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two tasks share the same name.
    DuplicateName,
    /// A name does not fit the task name limit.
    NameTooLong,
    /// A task has no ticks of work.
    ZeroRunTime,
    /// A priority is not below the configured number of levels.
    PriorityOutOfRange,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a task set.
///
/// Checks:
/// 1. No duplicate names
/// 2. Every name fits [`MAX_TASK_NAME_LEN`]
/// 3. Every run time is at least one tick
/// 4. Every priority is in `0..priority_levels`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_tasks(tasks: &[TaskSpec], priority_levels: u8) -> ValidationResult {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for task in tasks {
        if !names.insert(task.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate task name: {}", task.name),
            ));
        }

        if task.name.len() > MAX_TASK_NAME_LEN {
            errors.push(ValidationError::new(
                ValidationErrorKind::NameTooLong,
                format!(
                    "Task name '{}' is longer than {MAX_TASK_NAME_LEN} bytes",
                    task.name
                ),
            ));
        }

        if task.run_time == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroRunTime,
                format!("Task '{}' has no run time", task.name),
            ));
        }

        if task.priority >= priority_levels {
            errors.push(ValidationError::new(
                ValidationErrorKind::PriorityOutOfRange,
                format!(
                    "Task '{}' has priority {}, expected 0..{priority_levels}",
                    task.name, task.priority
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tasks() -> Vec<TaskSpec> {
        vec![
            TaskSpec::new("00", 0, 4, 0),
            TaskSpec::new("01", 3, 10, 2),
            TaskSpec::new("02", 3, 1, 3),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_tasks(&sample_tasks(), 4).is_ok());
        assert!(validate_tasks(&[], 4).is_ok());
    }

    #[test]
    fn test_duplicate_name() {
        let tasks = vec![TaskSpec::new("A", 0, 1, 0), TaskSpec::new("A", 2, 1, 0)];
        let errors = validate_tasks(&tasks, 4).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateName);
    }

    #[test]
    fn test_name_too_long() {
        let long = "x".repeat(MAX_TASK_NAME_LEN + 1);
        let tasks = vec![
            TaskSpec::new(long, 0, 1, 0),
            TaskSpec::new("y".repeat(MAX_TASK_NAME_LEN), 0, 1, 0),
        ];
        let errors = validate_tasks(&tasks, 4).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::NameTooLong);
    }

    #[test]
    fn test_zero_run_time() {
        let tasks = vec![TaskSpec::new("idle", 0, 0, 0)];
        let errors = validate_tasks(&tasks, 4).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::ZeroRunTime));
    }

    #[test]
    fn test_priority_out_of_range() {
        let tasks = vec![TaskSpec::new("hi", 0, 1, 4)];
        let errors = validate_tasks(&tasks, 4).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::PriorityOutOfRange && e.message.contains("hi")));
        assert!(validate_tasks(&tasks, 5).is_ok());
    }

    #[test]
    fn test_multiple_errors() {
        let tasks = vec![
            TaskSpec::new("A", 0, 0, 9),
            TaskSpec::new("A", 1, 1, 0),
        ];
        let errors = validate_tasks(&tasks, 4).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
