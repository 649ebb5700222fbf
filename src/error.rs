//! A2A error types — JSON-RPC error codes + task lifecycle errors.
//!
//! - Standard JSON-RPC 2.0 errors (-32700 through -32603)
//! - Task protocol errors (-32001 through -32009)

use crate::types::JsonRpcError;

// ---------------------------------------------------------------------------
// Standard JSON-RPC 2.0 error codes
// ---------------------------------------------------------------------------

/// Invalid JSON was received by the server.
pub const PARSE_ERROR: i64 = -32700;

/// The JSON sent is not a valid Request object.
pub const INVALID_REQUEST: i64 = -32600;

/// The method does not exist / is not available.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// Invalid method parameter(s).
pub const INVALID_PARAMS: i64 = -32602;

/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i64 = -32603;

// ---------------------------------------------------------------------------
// Task protocol error codes
// ---------------------------------------------------------------------------

/// The requested task was not found.
pub const TASK_NOT_FOUND: i64 = -32001;

/// The task cannot be canceled in its current state.
pub const TASK_NOT_CANCELABLE: i64 = -32002;

/// Push notifications are not supported by this agent.
pub const PUSH_NOTIFICATION_NOT_SUPPORTED: i64 = -32003;

/// The requested operation is not supported.
pub const UNSUPPORTED_OPERATION: i64 = -32004;

/// The task ID already denotes a task that is being processed.
pub const DUPLICATE_ACTIVE_TASK: i64 = -32005;

/// The requested state change is not an edge of the task state machine.
pub const INVALID_TRANSITION: i64 = -32006;

/// The agent produced output after its final result.
pub const PROTOCOL_VIOLATION: i64 = -32007;

/// The operation did not finish before its deadline.
pub const TIMEOUT: i64 = -32008;

/// Connection-level failure between client and agent.
pub const TRANSPORT_ERROR: i64 = -32009;

// ---------------------------------------------------------------------------
// A2AError enum
// ---------------------------------------------------------------------------

/// Unified error type for all A2A and JSON-RPC errors.
///
/// Protocol variants carry a human-readable message and an optional
/// structured `data` payload, and map onto a JSON-RPC error code via
/// [`A2AError::code`]. The client/transport variants at the bottom are
/// raised locally and only reach the wire as their mapped code.
#[derive(Debug, Clone, thiserror::Error)]
pub enum A2AError {
    /// Invalid JSON payload (code -32700).
    #[error("Parse error: {message}")]
    ParseError {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Request payload validation error (code -32600).
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Method not found (code -32601).
    #[error("Method not found: {message}")]
    MethodNotFound {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Invalid parameters (code -32602).
    #[error("Invalid params: {message}")]
    InvalidParams {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Internal error (code -32603).
    #[error("Internal error: {message}")]
    InternalError {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Task not found (code -32001).
    #[error("Task not found: {message}")]
    TaskNotFound {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Task cannot be canceled (code -32002).
    #[error("Task not cancelable: {message}")]
    TaskNotCancelable {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Push notifications not supported (code -32003).
    #[error("Push notification not supported: {message}")]
    PushNotificationNotSupported {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Operation not supported (code -32004).
    #[error("Unsupported operation: {message}")]
    UnsupportedOperation {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Task is already being processed (code -32005).
    #[error("Duplicate active task: {message}")]
    DuplicateActiveTask {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// State change not permitted by the state machine (code -32006).
    #[error("Invalid transition: {message}")]
    InvalidTransition {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Agent output arrived after the final update (code -32007).
    #[error("Protocol violation: {message}")]
    ProtocolViolation {
        /// Human-readable error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    // -- Client/transport-side errors --
    /// Transport-level error (connection failed, stream broke, etc.).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request or task run exceeded its deadline.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Non-2xx HTTP status with the response body.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// Invalid JSON received from remote (parse or deserialization failure).
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// A JSON-RPC error response with a code not known to this crate.
    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },
}

/// Convenience result type for A2A operations.
pub type A2AResult<T> = Result<T, A2AError>;

impl A2AError {
    // -- Convenience constructors (message-only, no data) --

    /// Create a `ParseError` with a message and no data.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            data: None,
        }
    }

    /// Create an `InvalidRequest` with a message and no data.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            data: None,
        }
    }

    /// Create a `MethodNotFound` with a message and no data.
    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::MethodNotFound {
            message: message.into(),
            data: None,
        }
    }

    /// Create an `InvalidParams` with a message and no data.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
            data: None,
        }
    }

    /// Create an `InternalError` with a message and no data.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            data: None,
        }
    }

    /// Create a `TaskNotFound` with a message and no data.
    pub fn task_not_found(message: impl Into<String>) -> Self {
        Self::TaskNotFound {
            message: message.into(),
            data: None,
        }
    }

    /// Create a `TaskNotCancelable` with a message and no data.
    pub fn task_not_cancelable(message: impl Into<String>) -> Self {
        Self::TaskNotCancelable {
            message: message.into(),
            data: None,
        }
    }

    /// Create a `PushNotificationNotSupported` with a message and no data.
    pub fn push_notification_not_supported(message: impl Into<String>) -> Self {
        Self::PushNotificationNotSupported {
            message: message.into(),
            data: None,
        }
    }

    /// Create an `UnsupportedOperation` with a message and no data.
    pub fn unsupported_operation(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            message: message.into(),
            data: None,
        }
    }

    /// Create a `DuplicateActiveTask` with a message and no data.
    pub fn duplicate_active_task(message: impl Into<String>) -> Self {
        Self::DuplicateActiveTask {
            message: message.into(),
            data: None,
        }
    }

    /// Create an `InvalidTransition` with a message and no data.
    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::InvalidTransition {
            message: message.into(),
            data: None,
        }
    }

    /// Create a `ProtocolViolation` with a message and no data.
    pub fn protocol_violation(message: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            message: message.into(),
            data: None,
        }
    }

    /// Rebuild a typed error from a JSON-RPC error object.
    ///
    /// Known codes map back onto their variant; anything else becomes
    /// [`A2AError::JsonRpc`].
    pub fn from_rpc(error: JsonRpcError) -> Self {
        let JsonRpcError {
            code,
            message,
            data,
        } = error;
        match code {
            PARSE_ERROR => Self::ParseError { message, data },
            INVALID_REQUEST => Self::InvalidRequest { message, data },
            METHOD_NOT_FOUND => Self::MethodNotFound { message, data },
            INVALID_PARAMS => Self::InvalidParams { message, data },
            INTERNAL_ERROR => Self::InternalError { message, data },
            TASK_NOT_FOUND => Self::TaskNotFound { message, data },
            TASK_NOT_CANCELABLE => Self::TaskNotCancelable { message, data },
            PUSH_NOTIFICATION_NOT_SUPPORTED => {
                Self::PushNotificationNotSupported { message, data }
            }
            UNSUPPORTED_OPERATION => Self::UnsupportedOperation { message, data },
            DUPLICATE_ACTIVE_TASK => Self::DuplicateActiveTask { message, data },
            INVALID_TRANSITION => Self::InvalidTransition { message, data },
            PROTOCOL_VIOLATION => Self::ProtocolViolation { message, data },
            TIMEOUT => Self::Timeout(message),
            TRANSPORT_ERROR => Self::Transport(message),
            _ => Self::JsonRpc {
                code,
                message,
                data,
            },
        }
    }

    /// Returns the JSON-RPC error code for this error variant.
    pub fn code(&self) -> i64 {
        match self {
            A2AError::ParseError { .. } | A2AError::InvalidJson(_) => PARSE_ERROR,
            A2AError::InvalidRequest { .. } => INVALID_REQUEST,
            A2AError::MethodNotFound { .. } => METHOD_NOT_FOUND,
            A2AError::InvalidParams { .. } => INVALID_PARAMS,
            A2AError::InternalError { .. } => INTERNAL_ERROR,
            A2AError::TaskNotFound { .. } => TASK_NOT_FOUND,
            A2AError::TaskNotCancelable { .. } => TASK_NOT_CANCELABLE,
            A2AError::PushNotificationNotSupported { .. } => PUSH_NOTIFICATION_NOT_SUPPORTED,
            A2AError::UnsupportedOperation { .. } => UNSUPPORTED_OPERATION,
            A2AError::DuplicateActiveTask { .. } => DUPLICATE_ACTIVE_TASK,
            A2AError::InvalidTransition { .. } => INVALID_TRANSITION,
            A2AError::ProtocolViolation { .. } => PROTOCOL_VIOLATION,
            A2AError::Timeout(_) => TIMEOUT,
            A2AError::Transport(_) | A2AError::Http { .. } => TRANSPORT_ERROR,
            A2AError::JsonRpc { code, .. } => *code,
        }
    }

    /// Whether this is a connection-level (transport kind) failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, A2AError::Transport(_) | A2AError::Http { .. })
    }

    /// Whether this is a payload decoding (decode kind) failure.
    pub fn is_decode(&self) -> bool {
        matches!(self, A2AError::InvalidJson(_) | A2AError::ParseError { .. })
    }
}

impl From<A2AError> for JsonRpcError {
    fn from(err: A2AError) -> Self {
        let code = err.code();
        let message = err.to_string();
        let data = match &err {
            A2AError::ParseError { data, .. }
            | A2AError::InvalidRequest { data, .. }
            | A2AError::MethodNotFound { data, .. }
            | A2AError::InvalidParams { data, .. }
            | A2AError::InternalError { data, .. }
            | A2AError::TaskNotFound { data, .. }
            | A2AError::TaskNotCancelable { data, .. }
            | A2AError::PushNotificationNotSupported { data, .. }
            | A2AError::UnsupportedOperation { data, .. }
            | A2AError::DuplicateActiveTask { data, .. }
            | A2AError::InvalidTransition { data, .. }
            | A2AError::ProtocolViolation { data, .. }
            | A2AError::JsonRpc { data, .. } => data.clone(),
            _ => None,
        };
        JsonRpcError {
            code,
            message,
            data,
        }
    }
}

impl From<serde_json::Error> for A2AError {
    fn from(err: serde_json::Error) -> Self {
        A2AError::ParseError {
            message: err.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_error_codes_are_distinct() {
        let codes = [
            TASK_NOT_FOUND,
            TASK_NOT_CANCELABLE,
            PUSH_NOTIFICATION_NOT_SUPPORTED,
            UNSUPPORTED_OPERATION,
            DUPLICATE_ACTIVE_TASK,
            INVALID_TRANSITION,
            PROTOCOL_VIOLATION,
            TIMEOUT,
            TRANSPORT_ERROR,
            PARSE_ERROR,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn a2a_error_to_json_rpc_error() {
        let err = A2AError::task_not_found("task-123");
        let rpc_err: JsonRpcError = err.into();
        assert_eq!(rpc_err.code, TASK_NOT_FOUND);
        assert!(rpc_err.message.contains("task-123"));
        assert!(rpc_err.data.is_none());
    }

    #[test]
    fn transport_and_decode_kinds() {
        let http = A2AError::Http {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert!(http.is_transport());
        assert_eq!(http.code(), TRANSPORT_ERROR);

        let decode = A2AError::InvalidJson("eof".to_string());
        assert!(decode.is_decode());
        assert_eq!(decode.code(), PARSE_ERROR);
    }

    #[test]
    fn from_rpc_restores_typed_variant() {
        let rpc: JsonRpcError = A2AError::duplicate_active_task("t1").into();
        match A2AError::from_rpc(rpc) {
            A2AError::DuplicateActiveTask { message, .. } => assert!(message.contains("t1")),
            other => panic!("expected DuplicateActiveTask, got {:?}", other),
        }

        let unknown = JsonRpcError {
            code: -31999,
            message: "custom".to_string(),
            data: None,
        };
        assert!(matches!(
            A2AError::from_rpc(unknown),
            A2AError::JsonRpc { code: -31999, .. }
        ));
    }

    #[test]
    fn protocol_error_data_propagates_to_json_rpc() {
        let data = serde_json::json!({"from": "completed", "to": "working"});
        let err = A2AError::InvalidTransition {
            message: "completed -> working".to_string(),
            data: Some(data.clone()),
        };
        let rpc_err: JsonRpcError = err.into();
        assert_eq!(rpc_err.code, INVALID_TRANSITION);
        assert_eq!(rpc_err.data, Some(data));
    }
}
