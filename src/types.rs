//! A2A protocol types for the `tasks/*` JSON-RPC surface.
//!
//! Covers the task model (tasks, statuses, messages, parts, artifacts), the
//! streaming update events, the push-notification configuration shapes and
//! the JSON-RPC 2.0 envelope. All types serialize with camelCase field
//! names to match the wire format.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Enums
// ============================================================================

/// The lifecycle state of a task.
///
/// Serialized as kebab-case strings (`"input-required"`). Valid transitions
/// between states live in [`crate::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    /// Task has been accepted but processing has not started.
    Submitted,
    /// Task is actively being processed.
    Working,
    /// The agent needs more input from the caller to continue.
    InputRequired,
    /// Task completed successfully.
    Completed,
    /// Task failed.
    Failed,
    /// Task was canceled.
    Canceled,
}

impl TaskState {
    /// All states, in declaration order.
    pub const ALL: [TaskState; 6] = [
        TaskState::Submitted,
        TaskState::Working,
        TaskState::InputRequired,
        TaskState::Completed,
        TaskState::Failed,
        TaskState::Canceled,
    ];
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Submitted => "submitted",
            TaskState::Working => "working",
            TaskState::InputRequired => "input-required",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            TaskState::Canceled => "canceled",
        };
        write!(f, "{}", s)
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message from the user / client.
    User,
    /// Message from the agent / server.
    Agent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Agent => write!(f, "agent"),
        }
    }
}

// ============================================================================
// Core Task Types
// ============================================================================

/// Current status of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    /// The current state.
    pub state: TaskState,

    /// The most recent agent-authored message, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    /// RFC 3339 timestamp of when this status was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// A task — one unit of work tracked from submission to a terminal outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Caller-supplied task identifier. Immutable for the task's lifetime.
    pub id: String,

    /// Optional grouping key for related tasks (e.g. a conversation).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Current task status.
    pub status: TaskStatus,

    /// Messages exchanged so far, in insertion order.
    #[serde(default)]
    pub history: Vec<Message>,

    /// Artifacts produced by the task. Never shrinks.
    #[serde(default)]
    pub artifacts: Vec<Artifact>,

    /// Arbitrary metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

// ============================================================================
// Message & Parts
// ============================================================================

/// A single message in a conversation.
///
/// A message with zero parts is invalid; see [`crate::utils::validate_message`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Who sent this message.
    pub role: Role,

    /// Content parts of the message.
    pub parts: Vec<Part>,

    /// Arbitrary metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// File payload of a [`Part::File`] — inline base64 bytes or a URI reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    /// Optional file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// MIME type of the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Base64-encoded file content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<String>,

    /// URI pointing to the file content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// A content part within a message or artifact.
///
/// Discriminated by the `type` field:
/// - Text: `{"type": "text", "text": "hello"}`
/// - File: `{"type": "file", "file": {"uri": "https://example.com/a.pdf", "mimeType": "application/pdf"}}`
/// - Data: `{"type": "data", "data": {"key": "value"}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Part {
    /// A text content part.
    #[serde(rename = "text")]
    Text {
        /// The text content.
        text: String,
        /// Optional metadata associated with this part.
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    /// A file content part.
    #[serde(rename = "file")]
    File {
        /// The file reference.
        file: FileContent,
        /// Optional metadata associated with this part.
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    /// A structured data content part.
    #[serde(rename = "data")]
    Data {
        /// Arbitrary structured data.
        data: serde_json::Value,
        /// Optional metadata associated with this part.
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
}

/// An output bundle produced by a task.
///
/// Incremental chunks target an artifact by `index`; `append = true` extends
/// the artifact at that index instead of replacing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Human-readable name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Description of the artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Content parts of the artifact.
    pub parts: Vec<Part>,

    /// Position among the task's artifacts.
    #[serde(default)]
    pub index: u32,

    /// Whether this chunk extends the artifact at `index`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append: Option<bool>,

    /// Whether this is the last chunk of the artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_chunk: Option<bool>,

    /// Arbitrary metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

// ============================================================================
// Streaming Events
// ============================================================================

/// Notification that a task's status has changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdateEvent {
    /// ID of the task whose status changed.
    pub id: String,

    /// Discriminator field — always "status-update".
    #[serde(default = "kind_status_update")]
    pub kind: String,

    /// The new status.
    pub status: TaskStatus,

    /// Whether this is the last update of the task's sequence.
    #[serde(rename = "final", default)]
    pub r#final: bool,

    /// Arbitrary metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Notification that an artifact has been created or extended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskArtifactUpdateEvent {
    /// ID of the task that produced the artifact.
    pub id: String,

    /// Discriminator field — always "artifact-update".
    #[serde(default = "kind_artifact_update")]
    pub kind: String,

    /// The artifact chunk.
    pub artifact: Artifact,

    /// Whether this is the last update of the task's sequence.
    #[serde(rename = "final", default)]
    pub r#final: bool,

    /// Arbitrary metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl TaskStatusUpdateEvent {
    /// Create a status update for `task_id`.
    pub fn new(task_id: impl Into<String>, status: TaskStatus, r#final: bool) -> Self {
        Self {
            id: task_id.into(),
            kind: kind_status_update(),
            status,
            r#final,
            metadata: None,
        }
    }
}

impl TaskArtifactUpdateEvent {
    /// Create an artifact update for `task_id`.
    pub fn new(task_id: impl Into<String>, artifact: Artifact, r#final: bool) -> Self {
        Self {
            id: task_id.into(),
            kind: kind_artifact_update(),
            artifact,
            r#final,
            metadata: None,
        }
    }
}

fn kind_status_update() -> String {
    "status-update".to_string()
}

fn kind_artifact_update() -> String {
    "artifact-update".to_string()
}

/// One update in a task's update sequence.
///
/// Serializes FLAT (no wrapper keys); the `kind` field is the discriminator.
/// Payloads without `kind` are recognised by their `status` / `artifact` key.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskUpdateEvent {
    /// A task status change.
    Status(TaskStatusUpdateEvent),

    /// An artifact emission.
    Artifact(TaskArtifactUpdateEvent),
}

impl TaskUpdateEvent {
    /// The task this update belongs to.
    pub fn task_id(&self) -> &str {
        match self {
            TaskUpdateEvent::Status(e) => &e.id,
            TaskUpdateEvent::Artifact(e) => &e.id,
        }
    }

    /// Whether this is the last update of the sequence.
    pub fn is_final(&self) -> bool {
        match self {
            TaskUpdateEvent::Status(e) => e.r#final,
            TaskUpdateEvent::Artifact(e) => e.r#final,
        }
    }

    /// The wire discriminator of this update.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskUpdateEvent::Status(_) => "status-update",
            TaskUpdateEvent::Artifact(_) => "artifact-update",
        }
    }

    /// The carried status, for status updates.
    pub fn status(&self) -> Option<&TaskStatus> {
        match self {
            TaskUpdateEvent::Status(e) => Some(&e.status),
            TaskUpdateEvent::Artifact(_) => None,
        }
    }
}

impl Serialize for TaskUpdateEvent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TaskUpdateEvent::Status(inner) => inner.serialize(serializer),
            TaskUpdateEvent::Artifact(inner) => inner.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TaskUpdateEvent {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let kind = match value.get("kind").and_then(|v| v.as_str()) {
            Some(kind) => kind.to_string(),
            None if value.get("status").is_some() => "status-update".to_string(),
            None if value.get("artifact").is_some() => "artifact-update".to_string(),
            None => {
                return Err(serde::de::Error::custom(
                    "missing 'kind' field and no 'status' or 'artifact' payload",
                ))
            }
        };

        match kind.as_str() {
            "status-update" => {
                let event: TaskStatusUpdateEvent =
                    serde_json::from_value(value).map_err(serde::de::Error::custom)?;
                Ok(TaskUpdateEvent::Status(event))
            }
            "artifact-update" => {
                let event: TaskArtifactUpdateEvent =
                    serde_json::from_value(value).map_err(serde::de::Error::custom)?;
                Ok(TaskUpdateEvent::Artifact(event))
            }
            other => Err(serde::de::Error::custom(format!(
                "unknown kind '{}' — expected one of: status-update, artifact-update",
                other
            ))),
        }
    }
}

impl From<TaskStatusUpdateEvent> for TaskUpdateEvent {
    fn from(event: TaskStatusUpdateEvent) -> Self {
        TaskUpdateEvent::Status(event)
    }
}

impl From<TaskArtifactUpdateEvent> for TaskUpdateEvent {
    fn from(event: TaskArtifactUpdateEvent) -> Self {
        TaskUpdateEvent::Artifact(event)
    }
}

// ============================================================================
// Agent capabilities
// ============================================================================

/// Capability descriptor an agent declares up front.
///
/// The task manager reads it once to choose unary or incremental invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentCapabilities {
    /// Whether the agent produces incremental results.
    pub streaming: bool,

    /// Whether the agent supports push notifications.
    pub push_notifications: bool,

    /// Whether the agent keeps a history of state transitions.
    pub state_transition_history: bool,
}

// ============================================================================
// Push Notifications
// ============================================================================

/// Authentication details for a push-notification webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationInfo {
    /// Supported authentication schemes (e.g. `["Bearer"]`).
    pub schemes: Vec<String>,

    /// Optional credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
}

/// Where and how the agent should deliver push notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushNotificationConfig {
    /// Webhook URL.
    pub url: String,

    /// Token echoed back in each notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Authentication for the webhook.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthenticationInfo>,
}

/// Push-notification configuration bound to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPushNotificationConfig {
    /// Task ID.
    pub id: String,

    /// The configuration.
    pub push_notification_config: PushNotificationConfig,
}

// ============================================================================
// JSON-RPC 2.0
// ============================================================================

/// A JSON-RPC request identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcId {
    /// String identifier.
    String(String),
    /// Numeric identifier.
    Number(i64),
}

impl fmt::Display for JsonRpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonRpcId::String(s) => write!(f, "{}", s),
            JsonRpcId::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<String> for JsonRpcId {
    fn from(s: String) -> Self {
        JsonRpcId::String(s)
    }
}

impl From<&str> for JsonRpcId {
    fn from(s: &str) -> Self {
        JsonRpcId::String(s.to_string())
    }
}

impl From<i64> for JsonRpcId {
    fn from(n: i64) -> Self {
        JsonRpcId::Number(n)
    }
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonRpcRequest {
    /// Protocol version — always "2.0".
    pub jsonrpc: String,

    /// Request identifier. Absent for notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonRpcId>,

    /// Method name.
    pub method: String,

    /// Method parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Create a new request with the given id, method and params.
    pub fn new(
        id: impl Into<JsonRpcId>,
        method: impl Into<String>,
        params: Option<serde_json::Value>,
    ) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 response.
///
/// Exactly one of `result` or `error` will be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonRpcResponse {
    /// Protocol version — always "2.0".
    pub jsonrpc: String,

    /// Request identifier this response corresponds to.
    #[serde(default)]
    pub id: Option<JsonRpcId>,

    /// Successful result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// Error result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Create a successful JSON-RPC response.
    pub fn success(id: Option<JsonRpcId>, result: serde_json::Value) -> Self {
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error JSON-RPC response.
    pub fn error(id: Option<JsonRpcId>, error: JsonRpcError) -> Self {
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Create a JSON-RPC error response from an [`A2AError`](crate::error::A2AError).
    pub fn from_a2a_error(id: Option<JsonRpcId>, err: crate::error::A2AError) -> Self {
        Self::error(id, err.into())
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,

    /// Human-readable error message.
    pub message: String,

    /// Optional structured error data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

// ============================================================================
// Request Parameter Types
// ============================================================================

/// Parameters for `tasks/send` and `tasks/sendSubscribe`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSendParams {
    /// Caller-supplied task ID.
    pub id: String,

    /// Optional session the task belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// The message to send.
    pub message: Message,

    /// Maximum number of history messages to include in the returned task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_length: Option<usize>,

    /// Push notification configuration to register with the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_notification: Option<PushNotificationConfig>,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl TaskSendParams {
    /// Create send params for a task ID and message.
    pub fn new(id: impl Into<String>, message: Message) -> Self {
        Self {
            id: id.into(),
            session_id: None,
            message,
            history_length: None,
            push_notification: None,
            metadata: None,
        }
    }

    /// Attach a session ID (builder-style).
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Parameters for `tasks/get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQueryParams {
    /// Task ID to retrieve.
    pub id: String,

    /// Maximum number of history messages to include.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_length: Option<usize>,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Parameters for `tasks/cancel` and `tasks/pushNotification/get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskIdParams {
    /// Task ID.
    pub id: String,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl TaskIdParams {
    /// Create params for a task ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata: None,
        }
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            metadata: None,
        }
    }

    /// Create a file part referencing a URI.
    pub fn file_from_uri(uri: impl Into<String>, mime_type: Option<String>) -> Self {
        Part::File {
            file: FileContent {
                uri: Some(uri.into()),
                mime_type,
                ..FileContent::default()
            },
            metadata: None,
        }
    }

    /// Create a structured data part.
    pub fn data(data: serde_json::Value) -> Self {
        Part::Data {
            data,
            metadata: None,
        }
    }
}

impl Message {
    /// Create a user message with a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
            metadata: None,
        }
    }

    /// Create an agent message with a single text part.
    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            parts: vec![Part::text(text)],
            metadata: None,
        }
    }
}

impl TaskStatus {
    /// Create a status with the given state, stamped with the current time.
    pub fn new(state: TaskState) -> Self {
        Self {
            state,
            message: None,
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    /// Create a status carrying a message, stamped with the current time.
    pub fn with_message(state: TaskState, message: Message) -> Self {
        Self {
            message: Some(message),
            ..Self::new(state)
        }
    }
}

impl Task {
    /// Create a freshly submitted task whose history holds `message`.
    pub fn submitted(id: impl Into<String>, session_id: Option<String>, message: Message) -> Self {
        Self {
            id: id.into(),
            session_id,
            status: TaskStatus::new(TaskState::Submitted),
            history: vec![message],
            artifacts: Vec::new(),
            metadata: None,
        }
    }
}
