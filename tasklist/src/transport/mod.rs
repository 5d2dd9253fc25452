//! Transport layer between the engine and the remote task store.
//!
//! Defines the [`TaskTransport`] trait with the four CRUD operations of the
//! store contract. Concrete implementations:
//! - [`http::HttpTransport`]: JSON over HTTP via `reqwest`
//! - [`loopback::LoopbackTransport`]: in-process store for tests and offline demos
//!
//! An unsuccessful HTTP status is *reported* as [`TransportError::Status`],
//! never raised as a panic; callers decide whether to carry on.

pub mod http;
pub mod loopback;

use std::future::Future;

use tasklist_proto::{TaskId, WireTask};

use crate::draft::Draft;

/// Errors surfaced by a transport call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The store answered with a non-success status.
    #[error("Request did not succeed. Status: {status} {status_text}. Reason: {body}")]
    Status {
        /// Numeric HTTP status.
        status: u16,
        /// Canonical reason phrase, empty if unknown.
        status_text: String,
        /// Response body text.
        body: String,
    },

    /// The request itself failed: connect, DNS, body read or JSON parse.
    #[error("{0}")]
    Network(String),

    /// A failure that fits neither of the above.
    #[error("Unexpected error occurred: {0}.")]
    Unexpected(String),
}

impl TransportError {
    /// Whether the store was reached and answered with a failure status.
    #[must_use]
    pub const fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

/// The four store operations the engine needs.
///
/// Implementations never mutate any client-side cache; the controller
/// re-fetches after every mutation.
pub trait TaskTransport: Send + Sync {
    /// Fetches the full collection in store order.
    fn fetch_all(
        &self,
    ) -> impl Future<Output = Result<Vec<tasklist_proto::Task>, TransportError>> + Send;

    /// Creates a task from `draft`; the request carries id `0`.
    fn create(&self, draft: &Draft) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Replaces the task `id` with the contents of `draft`.
    fn update(
        &self,
        id: TaskId,
        draft: &Draft,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Deletes the task `id`.
    fn remove(&self, id: TaskId) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Builds the wire form of `draft` under the given id.
///
/// # Errors
///
/// Returns [`TransportError::Unexpected`] if the draft priority is not a
/// whole number representable on the wire; validation normally rules this out.
pub fn wire_task(id: TaskId, draft: &Draft) -> Result<WireTask, TransportError> {
    let priority = draft.integral_priority().ok_or_else(|| {
        TransportError::Unexpected(format!(
            "priority {} cannot be sent as a whole number",
            draft.priority
        ))
    })?;
    Ok(WireTask {
        id: id.get(),
        name: draft.name.clone(),
        priority,
        status: draft.status.ordinal(),
    })
}
