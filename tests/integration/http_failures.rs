//! Integration tests: `HttpTransport` against a scripted HTTP stub.
//!
//! The stub records every request and answers from a script, so the exact
//! wire traffic and the handling of failure statuses can be checked:
//! - request method, path and JSON body of each operation
//! - a `500` on the list call leaves the snapshot in place
//! - a `500` on a mutation still triggers the follow-up refresh
//! - malformed list bodies surface as transport errors
//! - an error body cut short still yields the status

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use parking_lot::Mutex;
use tasklist::controller::TaskListController;
use tasklist::draft::{Draft, Priority};
use tasklist::session::{EditSession, SubmitOutcome};
use tasklist::transport::http::HttpTransport;
use tasklist::transport::{TaskTransport, TransportError};
use tasklist_proto::{Task, TaskId, TaskStatus};

/// A request as seen by the stub.
#[derive(Debug, Clone, PartialEq)]
struct Seen {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
}

#[derive(Default)]
struct Stub {
    seen: Mutex<Vec<Seen>>,
    script: Mutex<VecDeque<(StatusCode, String)>>,
}

impl Stub {
    fn answer(&self, status: StatusCode, body: &str) {
        self.script.lock().push_back((status, body.to_string()));
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().clone()
    }
}

async fn handle(
    State(stub): State<Arc<Stub>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> (StatusCode, String) {
    stub.seen.lock().push(Seen {
        method,
        path: uri.path().to_string(),
        body: serde_json::from_slice(&body).ok(),
    });
    stub.script
        .lock()
        .pop_front()
        .unwrap_or((StatusCode::OK, String::new()))
}

/// Start the stub and return the collection URL the client should use.
async fn start_stub() -> (String, Arc<Stub>) {
    let stub = Arc::new(Stub::default());
    let app = Router::new().fallback(handle).with_state(Arc::clone(&stub));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/api/todo"), stub)
}

/// Answer a single request with the raw `response` bytes, then hang up.
fn start_raw_responder(response: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream.write_all(response.as_bytes()).unwrap();
    });
    format!("http://{addr}/api/todo")
}

const ONE_TASK: &str = r#"[{"id":1,"name":"A","priority":3,"status":1}]"#;

fn task_a() -> Task {
    Task {
        id: TaskId::new(1),
        name: "A".to_string(),
        status: TaskStatus::InProgress,
        priority: 3,
    }
}

// =============================================================================
// Wire traffic
// =============================================================================

#[tokio::test]
async fn requests_follow_the_store_contract() {
    let (url, stub) = start_stub().await;
    let transport = HttpTransport::new(url);

    stub.answer(StatusCode::OK, ONE_TASK);
    let tasks = transport.fetch_all().await.unwrap();
    assert_eq!(tasks, vec![task_a()]);

    let draft = Draft {
        name: "Buy milk".to_string(),
        status: TaskStatus::NotStarted,
        priority: Priority::Whole(2),
    };
    transport.create(&draft).await.unwrap();
    transport.update(TaskId::new(5), &draft).await.unwrap();
    transport.remove(TaskId::new(5)).await.unwrap();

    let seen = stub.seen();
    assert_eq!(seen.len(), 4);
    assert_eq!((seen[0].method.clone(), seen[0].path.as_str()), (Method::GET, "/api/todo"));
    assert_eq!(
        seen[1],
        Seen {
            method: Method::POST,
            path: "/api/todo".to_string(),
            body: Some(serde_json::json!({"id": 0, "name": "Buy milk", "priority": 2, "status": 0})),
        }
    );
    assert_eq!(
        seen[2],
        Seen {
            method: Method::PUT,
            path: "/api/todo/5".to_string(),
            body: Some(serde_json::json!({"id": 5, "name": "Buy milk", "priority": 2, "status": 0})),
        }
    );
    assert_eq!((seen[3].method.clone(), seen[3].path.as_str()), (Method::DELETE, "/api/todo/5"));
    assert_eq!(seen[3].body, None);
}

#[tokio::test]
async fn absent_id_in_list_decodes_as_unsaved() {
    let (url, stub) = start_stub().await;
    stub.answer(StatusCode::OK, r#"[{"name":"A","priority":0,"status":2}]"#);

    let tasks = HttpTransport::new(url).fetch_all().await.unwrap();
    assert_eq!(tasks[0].id, TaskId::UNSAVED);
    assert_eq!(tasks[0].status, TaskStatus::Completed);
}

// =============================================================================
// Failure handling
// =============================================================================

#[tokio::test]
async fn list_failure_keeps_snapshot_and_records_one_message() {
    let (url, stub) = start_stub().await;
    let mut controller = TaskListController::new(HttpTransport::new(url));

    stub.answer(StatusCode::OK, ONE_TASK);
    controller.refresh().await.unwrap();

    stub.answer(StatusCode::INTERNAL_SERVER_ERROR, "db down");
    assert!(controller.refresh().await.is_err());

    assert!(controller.is_loaded());
    assert_eq!(&*controller.tasks(), [task_a()].as_slice());
    assert_eq!(
        controller.errors(),
        ["Request did not succeed. Status: 500 Internal Server Error. Reason: db down".to_string()]
    );
}

#[tokio::test]
async fn unknown_status_ordinal_is_unexpected() {
    let (url, stub) = start_stub().await;
    stub.answer(StatusCode::OK, r#"[{"id":1,"name":"A","priority":0,"status":7}]"#);

    let err = HttpTransport::new(url).fetch_all().await.unwrap_err();
    assert!(matches!(err, TransportError::Unexpected(_)));
}

#[tokio::test]
async fn malformed_list_body_is_a_network_error() {
    let (url, stub) = start_stub().await;
    stub.answer(StatusCode::OK, "<html>not json</html>");

    let err = HttpTransport::new(url).fetch_all().await.unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
}

#[tokio::test]
async fn failed_create_still_refreshes_and_resets_the_form() {
    let (url, stub) = start_stub().await;
    let mut controller = TaskListController::new(HttpTransport::new(url));
    stub.answer(StatusCode::OK, "[]");
    controller.refresh().await.unwrap();

    stub.answer(StatusCode::SERVICE_UNAVAILABLE, "maintenance");
    stub.answer(StatusCode::OK, "[]");
    let mut session = EditSession::new_task();
    session.set_name("Buy milk");

    assert_eq!(session.submit(&mut controller).await, SubmitOutcome::Failed);
    assert_eq!(
        session.errors(),
        ["Request did not succeed. Status: 503 Service Unavailable. Reason: maintenance".to_string()]
    );
    assert_eq!(session.draft(), &Draft::new_task());

    let methods: Vec<Method> = stub.seen().into_iter().map(|s| s.method).collect();
    assert_eq!(methods, vec![Method::GET, Method::POST, Method::GET]);
}

#[tokio::test]
async fn failed_delete_reports_and_refreshes() {
    let (url, stub) = start_stub().await;
    let mut controller = TaskListController::new(HttpTransport::new(url));
    stub.answer(
        StatusCode::OK,
        r#"[{"id":1,"name":"A","priority":0,"status":2}]"#,
    );
    controller.refresh().await.unwrap();

    stub.answer(StatusCode::CONFLICT, "locked");
    stub.answer(
        StatusCode::OK,
        r#"[{"id":1,"name":"A","priority":0,"status":2}]"#,
    );
    let mut session = EditSession::existing(controller.tasks()[0].clone());

    assert_eq!(session.delete(&mut controller).await, Ok(SubmitOutcome::Failed));
    assert!(session.errors()[0].contains("409"));
    assert!(session.errors()[0].contains("locked"));
    assert_eq!(controller.tasks().len(), 1);
    assert_eq!(stub.seen().last().map(|s| s.method.clone()), Some(Method::GET));
}

#[tokio::test]
async fn truncated_error_body_still_reports_the_status() {
    let url = start_raw_responder(
        "HTTP/1.1 502 Bad Gateway\r\ncontent-length: 64\r\nconnection: close\r\n\r\npartial",
    );

    let err = HttpTransport::new(url).fetch_all().await.unwrap_err();
    assert_eq!(
        err,
        TransportError::Status {
            status: 502,
            status_text: "Bad Gateway".to_string(),
            body: String::new(),
        }
    );
}

#[tokio::test]
async fn empty_error_body_is_a_status_error() {
    let (url, stub) = start_stub().await;
    stub.answer(StatusCode::NOT_FOUND, "");

    let err = HttpTransport::new(url).remove(TaskId::new(9)).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Request did not succeed. Status: 404 Not Found. Reason: "
    );
}
