//! High-level client with one typed method per A2A JSON-RPC method.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{A2AError, A2AResult};
use crate::types::{
    JsonRpcId, JsonRpcRequest, JsonRpcResponse, Message, Task, TaskIdParams,
    TaskPushNotificationConfig, TaskQueryParams, TaskSendParams,
};
use crate::utils::constants::*;

use super::sse::SseStream;
use super::transport::{JsonRpcTransport, Transport};

/// Client for an A2A agent.
///
/// | Method | JSON-RPC |
/// |--------|----------|
/// | [`send_task`](Self::send_task) | `tasks/send` |
/// | [`send_task_streaming`](Self::send_task_streaming) | `tasks/sendSubscribe` |
/// | [`get_task`](Self::get_task) | `tasks/get` |
/// | [`cancel_task`](Self::cancel_task) | `tasks/cancel` |
/// | [`set_task_callback`](Self::set_task_callback) | `tasks/pushNotification/set` |
/// | [`get_task_callback`](Self::get_task_callback) | `tasks/pushNotification/get` |
///
/// JSON-RPC error objects come back as their typed [`A2AError`] variant,
/// e.g. [`A2AError::TaskNotFound`].
///
/// ```no_run
/// use a2a_min::client::A2AClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = A2AClient::connect("http://localhost:8000/");
///
/// let task = client.send("Hello, agent!").await?;
/// println!("Task {} is {}", task.id, task.status.state);
///
/// let mut stream = client.send_streaming("Tell me a story").await?;
/// while let Some(update) = stream.next().await {
///     println!("{:?}", update?);
/// }
/// # Ok(())
/// # }
/// ```
pub struct A2AClient {
    transport: Box<dyn Transport>,
}

impl std::fmt::Debug for A2AClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("A2AClient").finish_non_exhaustive()
    }
}

impl A2AClient {
    /// Create a client for the JSON-RPC endpoint at `url`.
    pub fn connect(url: &str) -> Self {
        Self::with_transport(Box::new(JsonRpcTransport::new(url)))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self { transport }
    }

    // ──────────────────────────────────────────────────
    // Core A2A JSON-RPC Methods
    // ──────────────────────────────────────────────────

    /// Submit a task and wait for it to settle (`tasks/send`).
    ///
    /// The returned task is completed, failed, canceled, or waiting for
    /// input.
    pub async fn send_task(&self, params: TaskSendParams) -> A2AResult<Task> {
        self.call(METHOD_TASKS_SEND, &params).await
    }

    /// Submit a task and stream its updates (`tasks/sendSubscribe`).
    pub async fn send_task_streaming(&self, params: TaskSendParams) -> A2AResult<SseStream> {
        let request = build_request(METHOD_TASKS_SEND_SUBSCRIBE, &params)?;
        debug!(task_id = %params.id, "Opening task stream");
        self.transport.send_stream(&request).await
    }

    /// Fetch a task snapshot (`tasks/get`).
    pub async fn get_task(&self, params: TaskQueryParams) -> A2AResult<Task> {
        self.call(METHOD_TASKS_GET, &params).await
    }

    /// Cancel a task (`tasks/cancel`).
    pub async fn cancel_task(&self, params: TaskIdParams) -> A2AResult<Task> {
        self.call(METHOD_TASKS_CANCEL, &params).await
    }

    /// Register a push-notification config (`tasks/pushNotification/set`).
    pub async fn set_task_callback(
        &self,
        config: TaskPushNotificationConfig,
    ) -> A2AResult<TaskPushNotificationConfig> {
        self.call(METHOD_PUSH_NOTIFICATION_SET, &config).await
    }

    /// Read back a push-notification config (`tasks/pushNotification/get`).
    ///
    /// `None` when the task has none.
    pub async fn get_task_callback(
        &self,
        params: TaskIdParams,
    ) -> A2AResult<Option<TaskPushNotificationConfig>> {
        self.call(METHOD_PUSH_NOTIFICATION_GET, &params).await
    }

    /// Close the underlying transport.
    pub async fn close(self) -> A2AResult<()> {
        self.transport.close().await
    }

    // ──────────────────────────────────────────────────
    // Convenience Helpers
    // ──────────────────────────────────────────────────

    /// Send text as a new task with fresh task and session ids.
    pub async fn send(&self, text: &str) -> A2AResult<Task> {
        self.send_task(new_task_params(Message::user(text), None))
            .await
    }

    /// Send text as a new streaming task with fresh task and session ids.
    pub async fn send_streaming(&self, text: &str) -> A2AResult<SseStream> {
        self.send_task_streaming(new_task_params(Message::user(text), None))
            .await
    }

    /// Send a message as a new task, optionally within an existing session.
    pub async fn send_message(&self, message: Message, session_id: Option<&str>) -> A2AResult<Task> {
        self.send_task(new_task_params(message, session_id)).await
    }

    /// Fetch a task by id.
    pub async fn get_task_by_id(
        &self,
        task_id: &str,
        history_length: Option<usize>,
    ) -> A2AResult<Task> {
        self.get_task(TaskQueryParams {
            id: task_id.to_string(),
            history_length,
            metadata: None,
        })
        .await
    }

    /// Cancel a task by id.
    pub async fn cancel_task_by_id(&self, task_id: &str) -> A2AResult<Task> {
        self.cancel_task(TaskIdParams::new(task_id)).await
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: &impl Serialize) -> A2AResult<T> {
        let request = build_request(method, params)?;
        let response = self.transport.send(&request).await?;
        parse_result(response)
    }
}

// ──────────────────────────────────────────────────
// Internal helpers
// ──────────────────────────────────────────────────

fn new_task_params(message: Message, session_id: Option<&str>) -> TaskSendParams {
    let session_id = session_id
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    TaskSendParams::new(uuid::Uuid::new_v4().to_string(), message).with_session(session_id)
}

/// Build a JSON-RPC request with a random UUID id.
fn build_request(method: &str, params: &impl Serialize) -> A2AResult<JsonRpcRequest> {
    let params = serde_json::to_value(params)
        .map_err(|e| A2AError::Transport(format!("failed to serialize request params: {e}")))?;
    Ok(JsonRpcRequest::new(
        JsonRpcId::String(uuid::Uuid::new_v4().to_string()),
        method,
        Some(params),
    ))
}

/// Extract `result`, or turn `error` into its typed variant.
fn parse_result<T: DeserializeOwned>(response: JsonRpcResponse) -> A2AResult<T> {
    if let Some(error) = response.error {
        return Err(A2AError::from_rpc(error));
    }

    // `null` is a legitimate result (an unset push config), so a missing
    // `result` is read as null too.
    let result = response.result.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(result)
        .map_err(|e| A2AError::InvalidJson(format!("failed to deserialize response result: {e}")))
}
