//! Task board: the controller plus one editing session per listed task.
//!
//! This is what a presentation layer drives. Every operation delegates to
//! the matching [`EditSession`] and then re-aligns the sessions with the
//! controller's snapshot, so the session list always mirrors the store's
//! order without losing unsaved edits.

use std::collections::HashMap;

use tasklist_proto::TaskId;
use tracing::debug;

use crate::controller::{RefreshError, TaskListController};
use crate::session::{EditSession, SessionError, SubmitOutcome};
use crate::transport::TaskTransport;

/// Errors returned by [`TaskBoard`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// No session exists for this id in the current snapshot.
    #[error("no task with id {0}")]
    UnknownTask(TaskId),

    /// The session refused the operation.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Controller, new-task form and per-task sessions.
pub struct TaskBoard<T> {
    controller: TaskListController<T>,
    new_task: EditSession,
    sessions: Vec<EditSession>,
    last_errors: Vec<String>,
}

impl<T: TaskTransport> TaskBoard<T> {
    /// Creates an empty board; call [`load`](Self::load) to fetch tasks.
    pub fn new(transport: T) -> Self {
        Self {
            controller: TaskListController::new(transport),
            new_task: EditSession::new_task(),
            sessions: Vec::new(),
            last_errors: Vec::new(),
        }
    }

    /// Refreshes the list and rebuilds the sessions from it.
    ///
    /// # Errors
    ///
    /// Returns the refresh failure; it is also recorded in the controller's
    /// error list and existing sessions are left as they were.
    pub async fn load(&mut self) -> Result<(), RefreshError> {
        let result = self.controller.refresh().await;
        self.sync_sessions();
        result.map(|_| ())
    }

    /// Aligns the sessions with the current snapshot.
    ///
    /// Sessions for ids still present are reconciled and kept, sessions for
    /// vanished ids are dropped and new ids get fresh sessions.
    pub fn sync_sessions(&mut self) {
        let snapshot = self.controller.tasks();
        let mut previous: HashMap<TaskId, EditSession> = self
            .sessions
            .drain(..)
            .filter_map(|s| s.id().map(|id| (id, s)))
            .collect();

        self.sessions = snapshot
            .iter()
            .map(|task| match previous.remove(&task.id) {
                Some(mut session) => {
                    session.reconcile(&snapshot);
                    session
                }
                None => EditSession::existing(task.clone()),
            })
            .collect();

        if !previous.is_empty() {
            debug!(dropped = previous.len(), "dropped sessions for vanished tasks");
        }
    }

    /// Submits the new-task form.
    pub async fn submit_new(&mut self) -> SubmitOutcome {
        let outcome = self.new_task.submit(&mut self.controller).await;
        self.last_errors = self.new_task.errors().to_vec();
        self.sync_sessions();
        outcome
    }

    /// Submits the session for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::UnknownTask`] if `id` is not in the snapshot.
    pub async fn submit(&mut self, id: TaskId) -> Result<SubmitOutcome, BoardError> {
        self.last_errors.clear();
        let index = self.index_of(id)?;
        let outcome = self.sessions[index].submit(&mut self.controller).await;
        self.last_errors = self.sessions[index].errors().to_vec();
        self.sync_sessions();
        Ok(outcome)
    }

    /// Discards unsaved edits of `id`. Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::UnknownTask`] if `id` is not in the snapshot.
    pub fn reset(&mut self, id: TaskId) -> Result<bool, BoardError> {
        let index = self.index_of(id)?;
        Ok(self.sessions[index].reset())
    }

    /// Deletes `id` from the store.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::UnknownTask`] if `id` is not in the snapshot and
    /// [`BoardError::Session`] if the task may not be deleted.
    pub async fn delete(&mut self, id: TaskId) -> Result<SubmitOutcome, BoardError> {
        self.last_errors.clear();
        let index = self.index_of(id)?;
        let outcome = self.sessions[index].delete(&mut self.controller).await?;
        self.last_errors = self.sessions[index].errors().to_vec();
        self.sync_sessions();
        Ok(outcome)
    }

    /// Messages of the session that ran the last submit or delete.
    ///
    /// Captured before the sessions are re-aligned, so they outlive a
    /// session dropped because its task vanished from the store.
    #[must_use]
    pub fn last_errors(&self) -> &[String] {
        &self.last_errors
    }

    #[must_use]
    pub const fn controller(&self) -> &TaskListController<T> {
        &self.controller
    }

    #[must_use]
    pub const fn new_task(&self) -> &EditSession {
        &self.new_task
    }

    pub fn new_task_mut(&mut self) -> &mut EditSession {
        &mut self.new_task
    }

    /// Sessions in snapshot order.
    #[must_use]
    pub fn sessions(&self) -> &[EditSession] {
        &self.sessions
    }

    #[must_use]
    pub fn session(&self, id: TaskId) -> Option<&EditSession> {
        self.sessions.iter().find(|s| s.id() == Some(id))
    }

    pub fn session_mut(&mut self, id: TaskId) -> Option<&mut EditSession> {
        self.sessions.iter_mut().find(|s| s.id() == Some(id))
    }

    fn index_of(&self, id: TaskId) -> Result<usize, BoardError> {
        self.sessions
            .iter()
            .position(|s| s.id() == Some(id))
            .ok_or(BoardError::UnknownTask(id))
    }
}
