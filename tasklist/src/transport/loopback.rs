//! Loopback transport for tests and offline demos.
//!
//! Keeps the task collection in process behind a [`parking_lot::Mutex`] and
//! honours the same contract as the remote store: ids are assigned from 1
//! upward, and updating or deleting an unknown id answers `404`. Every call
//! is recorded, and a one-shot failure can be injected with
//! [`LoopbackTransport::fail_next`].

use parking_lot::Mutex;
use tasklist_proto::{Task, TaskId, WireTask};

use super::{TaskTransport, TransportError, wire_task};
use crate::draft::Draft;

/// A call observed by the loopback transport, with its wire payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `fetch_all`.
    FetchAll,
    /// `create` with the payload that would have been posted.
    Create(WireTask),
    /// `update` of the given id.
    Update(TaskId, WireTask),
    /// `remove` of the given id.
    Remove(TaskId),
}

#[derive(Debug, Default)]
struct LoopbackState {
    tasks: Vec<Task>,
    next_id: i64,
    calls: Vec<Call>,
    fail_next: Option<TransportError>,
}

/// In-process [`TaskTransport`].
#[derive(Debug)]
pub struct LoopbackTransport {
    state: Mutex<LoopbackState>,
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackTransport {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    /// Creates a store pre-filled with `tasks`, in order.
    ///
    /// New ids continue after the largest id present.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|t| t.id.get()).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(LoopbackState {
                tasks,
                next_id,
                ..LoopbackState::default()
            }),
        }
    }

    /// Makes the next call of any kind fail with `error`.
    ///
    /// The failing call is still recorded but does not touch the collection.
    pub fn fail_next(&self, error: TransportError) {
        self.state.lock().fail_next = Some(error);
    }

    /// Every call made so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Forgets the recorded calls.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Current contents of the store.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    /// Records `call`, then yields the injected failure if one is pending.
    fn begin(state: &mut LoopbackState, call: Call) -> Result<(), TransportError> {
        state.calls.push(call);
        state.fail_next.take().map_or(Ok(()), Err)
    }
}

fn not_found(id: TaskId) -> TransportError {
    TransportError::Status {
        status: 404,
        status_text: "Not Found".to_string(),
        body: format!("task {id} not found"),
    }
}

impl TaskTransport for LoopbackTransport {
    async fn fetch_all(&self) -> Result<Vec<Task>, TransportError> {
        let mut state = self.state.lock();
        Self::begin(&mut state, Call::FetchAll)?;
        Ok(state.tasks.clone())
    }

    async fn create(&self, draft: &Draft) -> Result<(), TransportError> {
        let wire = wire_task(TaskId::UNSAVED, draft)?;
        let mut state = self.state.lock();
        Self::begin(&mut state, Call::Create(wire.clone()))?;
        let id = TaskId::new(state.next_id);
        state.next_id += 1;
        let task = Task::try_from(WireTask { id: id.get(), ..wire })
            .map_err(|e| TransportError::Unexpected(e.to_string()))?;
        state.tasks.push(task);
        Ok(())
    }

    async fn update(&self, id: TaskId, draft: &Draft) -> Result<(), TransportError> {
        let wire = wire_task(id, draft)?;
        let mut state = self.state.lock();
        Self::begin(&mut state, Call::Update(id, wire.clone()))?;
        let task =
            Task::try_from(wire).map_err(|e| TransportError::Unexpected(e.to_string()))?;
        let slot = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        *slot = task;
        Ok(())
    }

    async fn remove(&self, id: TaskId) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        Self::begin(&mut state, Call::Remove(id))?;
        let index = state
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        state.tasks.remove(index);
        Ok(())
    }
}
