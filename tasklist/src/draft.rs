//! Editable, detached copies of a task's mutable fields.

use std::fmt;

use tasklist_proto::{Task, TaskStatus};

/// Largest magnitude an `f64` priority may have and still fit an `i64`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// A draft's priority.
///
/// Stored priorities and whole numbers entered by the user are held as
/// `i64`; anything else the user types stays an `f64` until validation
/// rejects it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Priority {
    /// A whole number that fits an `i64`.
    Whole(i64),
    /// Any other input, kept as typed.
    Typed(f64),
}

impl Priority {
    /// The exact integer value, if this is [`Priority::Whole`].
    #[must_use]
    pub const fn as_i64(self) -> Option<i64> {
        match self {
            Self::Whole(p) => Some(p),
            Self::Typed(_) => None,
        }
    }

    /// Whether the value is a finite number without a fractional part.
    #[must_use]
    pub fn is_whole_number(self) -> bool {
        match self {
            Self::Whole(_) => true,
            Self::Typed(p) => p.is_finite() && p.fract() == 0.0,
        }
    }
}

impl From<i64> for Priority {
    fn from(p: i64) -> Self {
        Self::Whole(p)
    }
}

impl From<f64> for Priority {
    #[allow(clippy::cast_possible_truncation)]
    fn from(p: f64) -> Self {
        if p.is_finite() && p.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&p) {
            Self::Whole(p as i64)
        } else {
            Self::Typed(p)
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Whole(p) => write!(f, "{p}"),
            Self::Typed(p) => write!(f, "{p}"),
        }
    }
}

/// A single field edit coming from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// New name text.
    Name(String),
    /// New status selection.
    Status(TaskStatus),
    /// New priority, as typed (may be fractional until validated).
    Priority(f64),
}

/// Working copy of a task's `name`, `status` and `priority`.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    /// Task name.
    pub name: String,
    /// Task status.
    pub status: TaskStatus,
    /// Task priority, exact when whole.
    pub priority: Priority,
}

impl Draft {
    /// Name pre-filled into the new-task form.
    pub const DEFAULT_NAME: &'static str = "Todo title";

    /// The draft a new-task form starts from.
    #[must_use]
    pub fn new_task() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            status: TaskStatus::NotStarted,
            priority: Priority::Whole(0),
        }
    }

    /// Copies the mutable fields of an existing task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            status: task.status,
            priority: Priority::Whole(task.priority),
        }
    }

    /// Field-wise comparison with a task's mutable fields.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.name == task.name
            && self.status == task.status
            && self.priority == Priority::Whole(task.priority)
    }

    /// Applies a single field edit.
    pub fn apply(&mut self, field: Field) {
        match field {
            Field::Name(name) => self.name = name,
            Field::Status(status) => self.status = status,
            Field::Priority(priority) => self.priority = priority.into(),
        }
    }

    /// The priority as a whole number, if it is one and fits in an `i64`.
    #[must_use]
    pub const fn integral_priority(&self) -> Option<i64> {
        self.priority.as_i64()
    }
}

impl Default for Draft {
    fn default() -> Self {
        Self::new_task()
    }
}
