//! Task list controller: owner of the canonical task snapshot.
//!
//! The controller is the only writer of the snapshot. Each [`refresh`]
//! performs exactly one fetch and, on success, swaps the whole collection
//! for the store's answer; nothing is patched in place. Presentation layers
//! observe changes through [`subscribe`].
//!
//! [`refresh`]: TaskListController::refresh
//! [`subscribe`]: TaskListController::subscribe

use std::sync::Arc;

use tasklist_proto::{Task, TaskId};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::transport::{TaskTransport, TransportError};

/// A refresh attempt failed; the previous snapshot is still in place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to refresh task list: {0}")]
pub struct RefreshError(#[from] pub TransportError);

/// What a presentation layer sees of the controller.
#[derive(Debug, Clone)]
pub struct ListView {
    /// Current snapshot, in store order.
    pub tasks: Arc<[Task]>,
    /// `false` while a refresh is outstanding.
    pub is_loaded: bool,
    /// Messages from the latest refresh attempt.
    pub errors: Arc<[String]>,
}

/// Owns the snapshot and the transport used to fetch it.
pub struct TaskListController<T> {
    transport: T,
    snapshot: Arc<[Task]>,
    is_loaded: bool,
    errors: Vec<String>,
    view: watch::Sender<ListView>,
}

impl<T: TaskTransport> TaskListController<T> {
    /// Creates a controller with an empty, not-yet-loaded snapshot.
    pub fn new(transport: T) -> Self {
        let snapshot: Arc<[Task]> = Arc::from(Vec::new());
        let (view, _) = watch::channel(ListView {
            tasks: Arc::clone(&snapshot),
            is_loaded: false,
            errors: Arc::from(Vec::new()),
        });
        Self {
            transport,
            snapshot,
            is_loaded: false,
            errors: Vec::new(),
            view,
        }
    }

    /// Fetches the full collection and replaces the snapshot with it.
    ///
    /// The error list is cleared when the attempt starts. `is_loaded` is
    /// `false` for the duration of the fetch and `true` afterwards, whatever
    /// the outcome. No retry is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError`] if the transport call fails; its message is
    /// also recorded in [`errors`](Self::errors) and the snapshot is kept.
    pub async fn refresh(&mut self) -> Result<Arc<[Task]>, RefreshError> {
        self.is_loaded = false;
        self.errors.clear();
        self.publish();

        let result = self.transport.fetch_all().await;
        self.is_loaded = true;

        let outcome = match result {
            Ok(tasks) => {
                info!(count = tasks.len(), "task list refreshed");
                self.snapshot = Arc::from(tasks);
                Ok(Arc::clone(&self.snapshot))
            }
            Err(e) => {
                warn!(error = %e, "task list refresh failed");
                self.errors.push(e.to_string());
                Err(RefreshError(e))
            }
        };
        self.publish();
        outcome
    }

    /// Current snapshot. Cloning the `Arc` is cheap.
    #[must_use]
    pub fn tasks(&self) -> Arc<[Task]> {
        Arc::clone(&self.snapshot)
    }

    /// Looks up a task in the current snapshot.
    #[must_use]
    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.snapshot.iter().find(|t| t.id == id)
    }

    /// Whether no refresh is outstanding.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    /// Messages produced by the latest refresh attempt.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// The transport sessions persist through.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Subscribes to every change of the snapshot, load flag or errors.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ListView> {
        self.view.subscribe()
    }

    fn publish(&self) {
        self.view.send_replace(ListView {
            tasks: Arc::clone(&self.snapshot),
            is_loaded: self.is_loaded,
            errors: Arc::from(self.errors.as_slice()),
        });
    }
}
