//! Editing sessions: per-task transient state between the user and the store.
//!
//! An [`EditSession`] holds a detached [`Draft`], the snapshot it started from
//! (if any) and the messages produced by its last operation. Validation runs
//! only on submit; any edit clears the shown messages.
//!
//! After a create, update or delete attempt the session asks the controller
//! to refresh even when the store answered with a failure status, and a
//! new-task session resets its draft to the defaults in that case too.
//! Only a failure to reach the store at all skips that follow-up.
//!
//! `submit` and `delete` borrow the session mutably for the whole attempt,
//! so a second attempt on the same session cannot start before the first
//! has resolved.

use tasklist_proto::{Task, TaskId, TaskStatus};
use tracing::{debug, warn};

use crate::controller::TaskListController;
use crate::draft::{Draft, Field};
use crate::transport::{TaskTransport, TransportError};
use crate::validation::{self, validate};

/// Affordance errors: the operation is not available for this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Only persisted tasks whose stored status is `Completed` can be deleted.
    #[error("only completed tasks can be deleted")]
    DeleteNotAllowed,
}

/// Observable state of a session between operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Draft equals its origin (or the defaults, for a new task).
    Clean,
    /// Draft differs from its origin.
    Dirty,
    /// Last submit was stopped by validation; messages are shown.
    Invalid,
    /// Last submit or delete reached the transport and failed.
    Failed,
}

/// Result of a `submit` or `delete` attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing to send: the draft is not dirty.
    Unchanged,
    /// Validation failed; the transport was not called.
    Rejected,
    /// The store accepted the change and the list was refreshed.
    Persisted,
    /// The transport reported a failure; see [`EditSession::errors`].
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Origin {
    New,
    Existing(Task),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Invalid,
    Transport,
}

/// Transient editing state for one task, or for the new-task form.
#[derive(Debug, Clone)]
pub struct EditSession {
    origin: Origin,
    draft: Draft,
    errors: Vec<String>,
    failure: Option<Failure>,
}

impl EditSession {
    /// A session composing a new task, starting from [`Draft::new_task`].
    #[must_use]
    pub fn new_task() -> Self {
        Self {
            origin: Origin::New,
            draft: Draft::new_task(),
            errors: Vec::new(),
            failure: None,
        }
    }

    /// A session editing `task`, starting from its current fields.
    #[must_use]
    pub fn existing(task: Task) -> Self {
        Self {
            draft: Draft::from_task(&task),
            origin: Origin::Existing(task),
            errors: Vec::new(),
            failure: None,
        }
    }

    /// Id of the edited task; `None` for a new-task session.
    #[must_use]
    pub const fn id(&self) -> Option<TaskId> {
        match &self.origin {
            Origin::New => None,
            Origin::Existing(task) => Some(task.id),
        }
    }

    /// The snapshot this session compares against; `None` for a new task.
    #[must_use]
    pub const fn original(&self) -> Option<&Task> {
        match &self.origin {
            Origin::New => None,
            Origin::Existing(task) => Some(task),
        }
    }

    /// The working draft.
    #[must_use]
    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Messages from the last operation.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Whether the draft differs from its origin.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        match &self.origin {
            Origin::New => self.draft != Draft::new_task(),
            Origin::Existing(task) => !self.draft.matches(task),
        }
    }

    /// Whether `delete` is available: the stored status must be `Completed`.
    ///
    /// The draft's status is irrelevant; changing the status in the form does
    /// not enable deletion until the change is saved.
    #[must_use]
    pub fn can_delete(&self) -> bool {
        matches!(&self.origin, Origin::Existing(task) if task.status == TaskStatus::Completed)
    }

    /// Current phase, derived from the draft and the last outcome.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match self.failure {
            Some(Failure::Invalid) => SessionPhase::Invalid,
            Some(Failure::Transport) => SessionPhase::Failed,
            None if self.is_dirty() => SessionPhase::Dirty,
            None => SessionPhase::Clean,
        }
    }

    /// Applies one field edit and clears any shown messages.
    pub fn on_field_change(&mut self, field: Field) {
        self.draft.apply(field);
        self.clear_errors();
    }

    /// Sets the draft name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.on_field_change(Field::Name(name.into()));
    }

    /// Sets the draft status.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.on_field_change(Field::Status(status));
    }

    /// Sets the draft priority.
    pub fn set_priority(&mut self, priority: f64) {
        self.on_field_change(Field::Priority(priority));
    }

    /// Discards the draft. Does nothing at all, messages included, when the
    /// draft is not dirty. Returns whether anything was reset.
    pub fn reset(&mut self) -> bool {
        if !self.is_dirty() {
            return false;
        }
        self.draft = self.origin_draft();
        self.clear_errors();
        true
    }

    /// Validates the draft and persists it: `create` for a new task, `update`
    /// for an existing one.
    ///
    /// An existing task whose draft is not dirty is left alone. A new task is
    /// always submitted. Validation runs against the controller's current
    /// snapshot, excluding this task's own id.
    pub async fn submit<T: TaskTransport>(
        &mut self,
        list: &mut TaskListController<T>,
    ) -> SubmitOutcome {
        self.clear_errors();

        let exclude_id = match &self.origin {
            Origin::Existing(_) if !self.is_dirty() => return SubmitOutcome::Unchanged,
            Origin::Existing(task) => Some(task.id),
            Origin::New => None,
        };

        let violations = validate(&self.draft, &list.tasks(), exclude_id);
        if !violations.is_empty() {
            debug!(task_id = ?exclude_id, count = violations.len(), "draft rejected by validation");
            self.errors = validation::messages(&violations);
            self.failure = Some(Failure::Invalid);
            return SubmitOutcome::Rejected;
        }

        let result = match exclude_id {
            Some(id) => list.transport().update(id, &self.draft).await,
            None => list.transport().create(&self.draft).await,
        };
        self.settle(result, list).await
    }

    /// Deletes the task from the store.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DeleteNotAllowed`] without calling the transport
    /// unless this session edits a persisted task whose stored status is
    /// `Completed`.
    pub async fn delete<T: TaskTransport>(
        &mut self,
        list: &mut TaskListController<T>,
    ) -> Result<SubmitOutcome, SessionError> {
        let id = match &self.origin {
            Origin::Existing(task) if task.status == TaskStatus::Completed => task.id,
            _ => return Err(SessionError::DeleteNotAllowed),
        };
        self.clear_errors();

        let result = list.transport().remove(id).await;
        Ok(self.settle(result, list).await)
    }

    /// Re-derives the origin from a fresh snapshot.
    ///
    /// A clean draft follows the new snapshot; a dirty draft is kept. Returns
    /// `false` if the task is no longer present. New-task sessions are
    /// unaffected and always return `true`.
    pub fn reconcile(&mut self, snapshot: &[Task]) -> bool {
        let Origin::Existing(current) = &self.origin else {
            return true;
        };
        let Some(fresh) = snapshot.iter().find(|t| t.id == current.id) else {
            return false;
        };
        if !self.is_dirty() {
            self.draft = Draft::from_task(fresh);
        }
        self.origin = Origin::Existing(fresh.clone());
        true
    }

    /// Records the transport outcome and runs the follow-up refresh.
    async fn settle<T: TaskTransport>(
        &mut self,
        result: Result<(), TransportError>,
        list: &mut TaskListController<T>,
    ) -> SubmitOutcome {
        let outcome = match &result {
            Ok(()) => {
                debug!(task_id = ?self.id(), "task mutation persisted");
                SubmitOutcome::Persisted
            }
            Err(e) => {
                warn!(task_id = ?self.id(), error = %e, "task mutation failed");
                self.errors.push(e.to_string());
                self.failure = Some(Failure::Transport);
                SubmitOutcome::Failed
            }
        };

        // The store was never reached: nothing to refresh, keep the draft.
        if result.is_err_and(|e| !e.is_status()) {
            return outcome;
        }

        // Refresh failures are reported through the controller's own errors.
        let snapshot = match list.refresh().await {
            Ok(snapshot) => snapshot,
            Err(_) => list.tasks(),
        };
        if matches!(self.origin, Origin::New) {
            self.draft = Draft::new_task();
        } else {
            self.reconcile(&snapshot);
        }
        outcome
    }

    fn origin_draft(&self) -> Draft {
        match &self.origin {
            Origin::New => Draft::new_task(),
            Origin::Existing(task) => Draft::from_task(task),
        }
    }

    fn clear_errors(&mut self) {
        self.errors.clear();
        self.failure = None;
    }
}
