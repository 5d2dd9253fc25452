//! HTTP transport for the remote task store.
//!
//! Speaks the store's JSON contract with `reqwest`:
//!
//! | Operation | Request |
//! |---|---|
//! | fetch all | `GET {base}` |
//! | create | `POST {base}` with a wire task (`id = 0`) |
//! | update | `PUT {base}/{id}` with a wire task |
//! | remove | `DELETE {base}/{id}` |

use tasklist_proto::{Task, TaskId, WireError, decode_list};
use tracing::{debug, warn};

use super::{TaskTransport, TransportError, wire_task};
use crate::draft::Draft;

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

impl From<WireError> for TransportError {
    fn from(e: WireError) -> Self {
        match e {
            WireError::Json(_) => Self::Network(e.to_string()),
            WireError::UnknownStatus(_) | WireError::UnknownStatusLabel(_) => {
                Self::Unexpected(e.to_string())
            }
        }
    }
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport for the collection at `base_url`.
    ///
    /// Trailing slashes are dropped so item paths join cleanly.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a transport that reuses an existing client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// The collection address requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, id: TaskId) -> String {
        format!("{}/{id}", self.base_url)
    }
}

/// Turns a non-success response into [`TransportError::Status`].
async fn check(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    // An unreadable body must not hide the status.
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), body = %body, "store rejected request");
    Err(TransportError::Status {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        body,
    })
}

impl TaskTransport for HttpTransport {
    async fn fetch_all(&self) -> Result<Vec<Task>, TransportError> {
        debug!(url = %self.base_url, "fetching task list");
        let response = check(self.client.get(&self.base_url).send().await?).await?;
        let bytes = response.bytes().await?;
        Ok(decode_list(&bytes)?)
    }

    async fn create(&self, draft: &Draft) -> Result<(), TransportError> {
        let body = wire_task(TaskId::UNSAVED, draft)?;
        debug!(url = %self.base_url, name = %body.name, "creating task");
        check(self.client.post(&self.base_url).json(&body).send().await?).await?;
        Ok(())
    }

    async fn update(&self, id: TaskId, draft: &Draft) -> Result<(), TransportError> {
        let body = wire_task(id, draft)?;
        debug!(task_id = %id, "updating task");
        check(self.client.put(self.item_url(id)).json(&body).send().await?).await?;
        Ok(())
    }

    async fn remove(&self, id: TaskId) -> Result<(), TransportError> {
        debug!(task_id = %id, "deleting task");
        check(self.client.delete(self.item_url(id)).send().await?).await?;
        Ok(())
    }
}
