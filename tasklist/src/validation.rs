//! Local validation of drafts before they reach the remote store.
//!
//! [`validate`] is pure: it looks only at the draft and the collection it is
//! handed, and it reports every violated rule rather than stopping at the
//! first one.

use tasklist_proto::{Task, TaskId};

use crate::draft::Draft;

/// A rule a draft failed to satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The name is the empty string.
    #[error("Task must have a name.")]
    MissingName,
    /// Another task already uses this exact name.
    #[error("Task with this name already exists.")]
    DuplicateName,
    /// The priority has a fractional part or is not a finite number.
    #[error("Priority must be integral number.")]
    NonIntegerPriority,
}

/// Checks `draft` against `existing`, returning every violation in rule order.
///
/// A task in `existing` whose id equals `exclude_id` is ignored by the
/// uniqueness rule, so a task being edited may keep its own name. Whitespace
/// is significant: `"  "` is a name, and `"a"` and `"A"` are different names.
#[must_use]
pub fn validate(draft: &Draft, existing: &[Task], exclude_id: Option<TaskId>) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if draft.name.is_empty() {
        errors.push(ValidationError::MissingName);
    }

    if existing
        .iter()
        .any(|task| task.name == draft.name && Some(task.id) != exclude_id)
    {
        errors.push(ValidationError::DuplicateName);
    }

    if !draft.priority.is_whole_number() {
        errors.push(ValidationError::NonIntegerPriority);
    }

    errors
}

/// Renders violations as the plain messages shown to the user.
#[must_use]
pub fn messages(errors: &[ValidationError]) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}
