//! Task model and its JSON wire representation.
//!
//! The canonical [`Task`] carries its status as a [`TaskStatus`] label.
//! On the wire the same entity travels as a [`WireTask`], where the status
//! is the zero-based ordinal of the enumeration. [`TaskStatus::ordinal`]
//! and [`TaskStatus::from_ordinal`] are the only place that mapping lives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Server-assigned task identifier.
///
/// `0` means "not yet persisted"; the store assigns real ids on create.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    /// Identifier carried by a task that the store has not seen yet.
    pub const UNSAVED: Self = Self(0);

    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether this id denotes a task that has not been persisted.
    #[must_use]
    pub const fn is_unsaved(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a task, in its fixed order.
///
/// The order is part of the wire contract: a status is transmitted as its
/// position in [`TaskStatus::ALL`]. Progress is not enforced to be monotonic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskStatus {
    /// Not picked up yet.
    #[default]
    NotStarted,
    /// Being worked on.
    InProgress,
    /// Done. Only completed tasks may be deleted.
    Completed,
}

impl TaskStatus {
    /// Every status, in wire order.
    pub const ALL: [Self; 3] = [Self::NotStarted, Self::InProgress, Self::Completed];

    /// Zero-based position of this status in [`TaskStatus::ALL`].
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
        }
    }

    /// Inverse of [`ordinal`](Self::ordinal). Returns `None` for unknown ordinals.
    #[must_use]
    pub const fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Self::NotStarted),
            1 => Some(Self::InProgress),
            2 => Some(Self::Completed),
            _ => None,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = WireError;

    /// Accepts the display label (`"In progress"`) or a kebab/snake form
    /// (`in-progress`, `in_progress`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "notstarted" => Ok(Self::NotStarted),
            "inprogress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(WireError::UnknownStatusLabel(s.to_string())),
        }
    }
}

/// Canonical task as held by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task {
    /// Server-assigned identity.
    pub id: TaskId,
    /// Unique, non-empty name.
    pub name: String,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Whole-number priority, unbounded.
    pub priority: i64,
}

/// Transport form of a [`Task`]: status is sent as its ordinal.
///
/// An absent `id` decodes as `0` (unsaved).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTask {
    /// Raw identifier, `0` for a task being created.
    #[serde(default)]
    pub id: i64,
    /// Task name.
    pub name: String,
    /// Task priority.
    pub priority: i64,
    /// Ordinal of [`TaskStatus`].
    pub status: u8,
}

/// Errors raised while moving tasks across the wire boundary.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The payload carried a status ordinal outside [`TaskStatus::ALL`].
    #[error("unknown status ordinal {0}")]
    UnknownStatus(u8),

    /// A status label could not be recognised.
    #[error("unknown status '{0}' (expected not-started, in-progress or completed)")]
    UnknownStatusLabel(String),

    /// The payload was not valid wire JSON.
    #[error("malformed task payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<&Task> for WireTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.get(),
            name: task.name.clone(),
            priority: task.priority,
            status: task.status.ordinal(),
        }
    }
}

impl TryFrom<WireTask> for Task {
    type Error = WireError;

    fn try_from(wire: WireTask) -> Result<Self, Self::Error> {
        let status =
            TaskStatus::from_ordinal(wire.status).ok_or(WireError::UnknownStatus(wire.status))?;
        Ok(Self {
            id: TaskId::new(wire.id),
            name: wire.name,
            status,
            priority: wire.priority,
        })
    }
}

/// Decodes a JSON array of wire tasks into canonical tasks, preserving order.
///
/// # Errors
///
/// Returns [`WireError::Json`] if the bytes are not a JSON array of wire
/// tasks, or [`WireError::UnknownStatus`] for the first task whose ordinal
/// is not a known status.
pub fn decode_list(bytes: &[u8]) -> Result<Vec<Task>, WireError> {
    let wire: Vec<WireTask> = serde_json::from_slice(bytes)?;
    wire.into_iter().map(Task::try_from).collect()
}

/// Encodes canonical tasks as a JSON array of wire tasks.
///
/// # Errors
///
/// Returns [`WireError::Json`] if serialization fails.
pub fn encode_list(tasks: &[Task]) -> Result<Vec<u8>, WireError> {
    let wire: Vec<WireTask> = tasks.iter().map(WireTask::from).collect();
    Ok(serde_json::to_vec(&wire)?)
}
