//! HTTP front end of the task store.
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | `GET` | `{base}` | `200` + JSON array of wire tasks |
//! | `POST` | `{base}` | `201` + the created wire task |
//! | `PUT` | `{base}/{id}` | `204` |
//! | `DELETE` | `{base}/{id}` | `204` |
//!
//! Refusals are answered with a `4xx` status and a plain-text reason.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use tasklist_proto::{TaskId, WireTask};
use tracing::{debug, info};

use crate::store::{StoreError, TaskStore};

/// Default mount point of the collection.
pub const DEFAULT_BASE_PATH: &str = "/api/todo";

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::EmptyName
            | Self::DuplicateName(_)
            | Self::UnknownStatus(_)
            | Self::IdMismatch { .. } => StatusCode::BAD_REQUEST,
        };
        debug!(status = status.as_u16(), reason = %self, "request refused");
        (status, self.to_string()).into_response()
    }
}

/// Builds the router with the collection mounted at `base_path`.
///
/// `base_path` gets a leading slash if it lacks one and loses any trailing
/// slashes; an empty path mounts the collection at `/`.
pub fn router(base_path: &str, store: Arc<TaskStore>) -> Router {
    let base = normalize_base_path(base_path);
    let collection = if base.is_empty() { "/" } else { base.as_str() };
    let item = format!("{base}/{{id}}");

    Router::new()
        .route(collection, get(list_tasks).post(create_task))
        .route(&item, put(update_task).delete(delete_task))
        .with_state(store)
}

/// Leading slash, no trailing slash; `""` for the root.
#[must_use]
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

async fn list_tasks(State(store): State<Arc<TaskStore>>) -> Json<Vec<WireTask>> {
    let tasks = store.list().await;
    debug!(count = tasks.len(), "listing tasks");
    Json(tasks.iter().map(WireTask::from).collect())
}

async fn create_task(
    State(store): State<Arc<TaskStore>>,
    Json(wire): Json<WireTask>,
) -> Result<impl IntoResponse, StoreError> {
    let task = store.create(wire).await?;
    Ok((StatusCode::CREATED, Json(WireTask::from(&task))))
}

async fn update_task(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<i64>,
    Json(wire): Json<WireTask>,
) -> Result<StatusCode, StoreError> {
    store.update(TaskId::new(id), wire).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_task(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StoreError> {
    store.remove(TaskId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Starts a server with an empty store at the default base path.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, DEFAULT_BASE_PATH, Arc::new(TaskStore::new())).await
}

/// Starts a server over an existing store.
///
/// Binds `addr` (use port `0` for an OS-assigned port) and serves on a
/// spawned task. Returns the bound address and the task handle.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    base_path: &str,
    store: Arc<TaskStore>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(base_path, store);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;
    info!(addr = %bound_addr, base_path = %normalize_base_path(base_path), "task store bound");

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "task store server error");
        }
    });

    Ok((bound_addr, handle))
}
