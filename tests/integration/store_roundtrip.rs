//! Integration tests: client engine against the in-process task store.
//!
//! Runs `tasklist-store` on an OS-assigned port and drives it through
//! `HttpTransport`, the controller and the board:
//! - create, update and delete round trips over real HTTP
//! - store-side refusals surfacing as status errors
//! - unreachable store surfacing as a network error

use std::sync::Arc;

use tasklist::board::{BoardError, TaskBoard};
use tasklist::controller::TaskListController;
use tasklist::draft::{Draft, Priority};
use tasklist::session::{EditSession, SessionError, SessionPhase, SubmitOutcome};
use tasklist::transport::http::HttpTransport;
use tasklist::transport::{TaskTransport, TransportError};
use tasklist_proto::{TaskId, TaskStatus, WireTask};
use tasklist_store::server::{DEFAULT_BASE_PATH, start_server_with_state};
use tasklist_store::store::TaskStore;

/// Start the store in-process and return its collection URL and store.
async fn start_store() -> (String, Arc<TaskStore>, tokio::task::JoinHandle<()>) {
    let store = Arc::new(TaskStore::new());
    let (addr, handle) = start_server_with_state("127.0.0.1:0", DEFAULT_BASE_PATH, Arc::clone(&store))
        .await
        .expect("failed to start task store");
    (format!("http://{addr}{DEFAULT_BASE_PATH}"), store, handle)
}

fn wire(name: &str, status: TaskStatus) -> WireTask {
    WireTask {
        id: 0,
        name: name.to_string(),
        priority: 0,
        status: status.ordinal(),
    }
}

// =============================================================================
// Transport against the store
// =============================================================================

#[tokio::test]
async fn fetch_from_empty_store() {
    let (url, _store, _handle) = start_store().await;
    let transport = HttpTransport::new(url);
    assert!(transport.fetch_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn transport_crud_round_trip() {
    let (url, _store, _handle) = start_store().await;
    let transport = HttpTransport::new(format!("{url}/"));

    let draft = Draft {
        name: "Buy milk".to_string(),
        status: TaskStatus::NotStarted,
        priority: Priority::Whole(2),
    };
    transport.create(&draft).await.unwrap();

    let tasks = transport.fetch_all().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, TaskId::new(1));
    assert_eq!(tasks[0].name, "Buy milk");
    assert_eq!(tasks[0].priority, 2);

    let updated = Draft {
        status: TaskStatus::Completed,
        ..draft
    };
    transport.update(TaskId::new(1), &updated).await.unwrap();
    assert_eq!(
        transport.fetch_all().await.unwrap()[0].status,
        TaskStatus::Completed
    );

    transport.remove(TaskId::new(1)).await.unwrap();
    assert!(transport.fetch_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn store_refusal_is_a_status_error_with_reason() {
    let (url, store, _handle) = start_store().await;
    store.create(wire("A", TaskStatus::NotStarted)).await.unwrap();
    let transport = HttpTransport::new(url);

    let err = transport
        .create(&Draft {
            name: "A".to_string(),
            ..Draft::new_task()
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TransportError::Status {
            status: 400,
            status_text: "Bad Request".to_string(),
            body: "Task with name 'A' already exists.".to_string(),
        }
    );
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let (url, _store, _handle) = start_store().await;
    let transport = HttpTransport::new(url);

    let err = transport.remove(TaskId::new(42)).await.unwrap_err();
    assert!(matches!(err, TransportError::Status { status: 404, .. }));
    assert!(err.to_string().contains("Not Found"));
}

#[tokio::test]
async fn unreachable_store_is_a_network_error() {
    let (url, _store, handle) = start_store().await;
    handle.abort();
    let _ = handle.await;

    let mut controller = TaskListController::new(HttpTransport::new(url));
    let err = controller.refresh().await.unwrap_err();
    assert!(matches!(err.0, TransportError::Network(_)));
    assert_eq!(controller.errors().len(), 1);
    assert!(controller.is_loaded());
}

// =============================================================================
// Sessions and board over HTTP
// =============================================================================

#[tokio::test]
async fn new_task_session_creates_and_resets() {
    let (url, _store, _handle) = start_store().await;
    let mut controller = TaskListController::new(HttpTransport::new(url));
    controller.refresh().await.unwrap();

    let mut session = EditSession::new_task();
    session.set_name("Buy milk");
    session.set_priority(2.0);

    assert_eq!(session.submit(&mut controller).await, SubmitOutcome::Persisted);
    assert_eq!(controller.tasks().len(), 1);
    assert_eq!(controller.tasks()[0].name, "Buy milk");
    assert_eq!(session.draft(), &Draft::new_task());
}

#[tokio::test]
async fn duplicate_name_never_reaches_the_store() {
    let (url, store, _handle) = start_store().await;
    store.create(wire("A", TaskStatus::NotStarted)).await.unwrap();
    let mut controller = TaskListController::new(HttpTransport::new(url));
    controller.refresh().await.unwrap();

    let mut session = EditSession::new_task();
    session.set_name("A");
    assert_eq!(session.submit(&mut controller).await, SubmitOutcome::Rejected);
    assert_eq!(session.phase(), SessionPhase::Invalid);
    assert_eq!(store.list().await.len(), 1);
}

#[tokio::test]
async fn board_update_then_delete() {
    let (url, store, _handle) = start_store().await;
    store.create(wire("Write report", TaskStatus::InProgress)).await.unwrap();
    store.create(wire("Buy milk", TaskStatus::NotStarted)).await.unwrap();

    let mut board = TaskBoard::new(HttpTransport::new(url));
    board.load().await.unwrap();
    assert_eq!(board.sessions().len(), 2);

    let id = TaskId::new(1);
    assert_eq!(
        board.delete(id).await,
        Err(BoardError::Session(SessionError::DeleteNotAllowed))
    );

    board.session_mut(id).unwrap().set_status(TaskStatus::Completed);
    assert_eq!(board.submit(id).await, Ok(SubmitOutcome::Persisted));
    assert_eq!(store.list().await[0].status, TaskStatus::Completed);
    assert!(board.session(id).unwrap().can_delete());

    assert_eq!(board.delete(id).await, Ok(SubmitOutcome::Persisted));
    assert!(board.session(id).is_none());
    assert_eq!(store.list().await.len(), 1);
}

#[tokio::test]
async fn update_of_task_deleted_elsewhere_keeps_the_404_message() {
    let (url, store, _handle) = start_store().await;
    store.create(wire("A", TaskStatus::NotStarted)).await.unwrap();

    let mut board = TaskBoard::new(HttpTransport::new(url));
    board.load().await.unwrap();
    let id = TaskId::new(1);
    board.session_mut(id).unwrap().set_name("A2");

    store.remove(id).await.unwrap();

    let mut controller_view = board.controller().subscribe();
    assert_eq!(board.submit(id).await, Ok(SubmitOutcome::Failed));

    // The refresh removed the task and its session, not the message.
    assert!(board.session(id).is_none());
    assert!(board.controller().tasks().is_empty());
    assert!(controller_view.has_changed().unwrap());
    assert_eq!(board.last_errors().len(), 1);
    assert!(board.last_errors()[0].starts_with("Request did not succeed. Status: 404 Not Found."));
}

#[tokio::test]
async fn rename_over_http_keeps_large_priority_exact() {
    let (url, store, _handle) = start_store().await;
    store
        .create(WireTask {
            priority: (1 << 53) + 1,
            ..wire("A", TaskStatus::NotStarted)
        })
        .await
        .unwrap();

    let mut board = TaskBoard::new(HttpTransport::new(url));
    board.load().await.unwrap();
    let id = TaskId::new(1);
    board.session_mut(id).unwrap().set_name("B");

    assert_eq!(board.submit(id).await, Ok(SubmitOutcome::Persisted));
    let stored = &store.list().await[0];
    assert_eq!(stored.name, "B");
    assert_eq!(stored.priority, 9_007_199_254_740_993);
}

#[tokio::test]
async fn concurrent_clients_converge_after_refresh() {
    let (url, _store, _handle) = start_store().await;
    let mut alice = TaskBoard::new(HttpTransport::new(url.clone()));
    let mut bob = TaskBoard::new(HttpTransport::new(url));
    alice.load().await.unwrap();
    bob.load().await.unwrap();

    alice.new_task_mut().set_name("from alice");
    alice.submit_new().await;
    assert!(bob.sessions().is_empty());

    bob.load().await.unwrap();
    assert_eq!(bob.sessions().len(), 1);
    assert_eq!(bob.sessions()[0].draft().name, "from alice");
}
