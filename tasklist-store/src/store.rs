//! In-memory task collection.
//!
//! The [`TaskStore`] keeps tasks in insertion order behind a [`RwLock`] and
//! enforces the store-side rules: names are non-empty and unique, ids are
//! assigned from 1 upward and never reused.

use tasklist_proto::{Task, TaskId, WireTask};
use tokio::sync::RwLock;

/// Reasons the store refuses a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The task name is empty.
    #[error("Task name must not be empty.")]
    EmptyName,

    /// Another task already carries this name.
    #[error("Task with name '{0}' already exists.")]
    DuplicateName(String),

    /// No task has this id.
    #[error("Task {0} not found.")]
    NotFound(TaskId),

    /// The status ordinal does not name a known status.
    #[error("Unknown status {0}.")]
    UnknownStatus(u8),

    /// The body id disagrees with the id in the path.
    #[error("Task id {body} does not match path id {path}.")]
    IdMismatch {
        /// Id from the request path.
        path: TaskId,
        /// Id from the request body.
        body: i64,
    },
}

#[derive(Debug)]
struct Inner {
    tasks: Vec<Task>,
    next_id: i64,
}

/// Thread-safe in-memory task collection.
#[derive(Debug)]
pub struct TaskStore {
    inner: RwLock<Inner>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                tasks: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// All tasks in insertion order.
    pub async fn list(&self) -> Vec<Task> {
        self.inner.read().await.tasks.clone()
    }

    /// Inserts a new task and returns it with its assigned id.
    ///
    /// The id in `wire` is ignored.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyName`], [`StoreError::DuplicateName`] or
    /// [`StoreError::UnknownStatus`].
    pub async fn create(&self, wire: WireTask) -> Result<Task, StoreError> {
        let mut inner = self.inner.write().await;
        let task = checked(wire, &inner.tasks, None)?;
        let task = Task {
            id: TaskId::new(inner.next_id),
            ..task
        };
        inner.next_id += 1;
        inner.tasks.push(task.clone());
        drop(inner);
        tracing::debug!(task_id = %task.id, name = %task.name, "task created");
        Ok(task)
    }

    /// Replaces the task `id` in place.
    ///
    /// A body id of `0` is taken to mean `id`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if `id` is unknown, [`StoreError::IdMismatch`]
    /// if the body names another task, or a validation error.
    pub async fn update(&self, id: TaskId, wire: WireTask) -> Result<Task, StoreError> {
        if wire.id != 0 && wire.id != id.get() {
            return Err(StoreError::IdMismatch {
                path: id,
                body: wire.id,
            });
        }
        let mut inner = self.inner.write().await;
        let index = inner
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let task = Task {
            id,
            ..checked(wire, &inner.tasks, Some(id))?
        };
        inner.tasks[index] = task.clone();
        drop(inner);
        tracing::debug!(task_id = %id, "task updated");
        Ok(task)
    }

    /// Removes the task `id`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if `id` is unknown.
    pub async fn remove(&self, id: TaskId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let index = inner
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        inner.tasks.remove(index);
        drop(inner);
        tracing::debug!(task_id = %id, "task removed");
        Ok(())
    }
}

/// Converts `wire` to a task and checks it against `existing`, ignoring the
/// task `own_id`.
fn checked(wire: WireTask, existing: &[Task], own_id: Option<TaskId>) -> Result<Task, StoreError> {
    let status = wire.status;
    let task = Task::try_from(wire).map_err(|_| StoreError::UnknownStatus(status))?;
    if task.name.is_empty() {
        return Err(StoreError::EmptyName);
    }
    if existing
        .iter()
        .any(|t| Some(t.id) != own_id && t.name == task.name)
    {
        return Err(StoreError::DuplicateName(task.name));
    }
    Ok(task)
}
