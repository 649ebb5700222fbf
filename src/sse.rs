//! Server-Sent Events codec for task update streams.
//!
//! Each update travels as one SSE event whose `data:` payload is a JSON-RPC
//! response wrapping the update:
//!
//! ```text
//! event: status-update
//! data: {"jsonrpc":"2.0","id":1,"result":{"id":"t1","kind":"status-update",...}}
//!
//! ```
//!
//! [`SseDecoder`] is the inverse. It is fed raw body chunks as they arrive
//! and yields one decoded item per complete event. Chunk boundaries may fall
//! anywhere, including inside a multi-byte UTF-8 sequence.

use crate::error::{A2AError, A2AResult};
use crate::types::{JsonRpcError, JsonRpcId, JsonRpcResponse, TaskUpdateEvent};

/// Event name used for error frames.
pub const ERROR_EVENT: &str = "error";

/// Wrap an update in the JSON-RPC response that forms a frame's payload.
pub fn update_response(
    request_id: Option<JsonRpcId>,
    update: &TaskUpdateEvent,
) -> A2AResult<JsonRpcResponse> {
    let result = serde_json::to_value(update)?;
    Ok(JsonRpcResponse::success(request_id, result))
}

/// Format one SSE event. Multi-line data is split over several `data:` lines.
pub fn format_frame(event: Option<&str>, data: &str) -> String {
    let mut frame = String::with_capacity(data.len() + 32);
    if let Some(event) = event {
        frame.push_str("event: ");
        frame.push_str(event);
        frame.push('\n');
    }
    for line in data.split('\n') {
        frame.push_str("data: ");
        frame.push_str(line);
        frame.push('\n');
    }
    frame.push('\n');
    frame
}

/// Encode one update as a complete SSE frame.
pub fn encode_frame(request_id: Option<JsonRpcId>, update: &TaskUpdateEvent) -> A2AResult<String> {
    let response = update_response(request_id, update)?;
    let data = serde_json::to_string(&response)?;
    Ok(format_frame(Some(update.kind()), &data))
}

/// Encode an error as a JSON-RPC error frame.
pub fn encode_error_frame(request_id: Option<JsonRpcId>, error: &A2AError) -> String {
    let response = JsonRpcResponse::from_a2a_error(request_id, error.clone());
    let data = serde_json::to_string(&response).unwrap_or_else(|_| {
        format!(
            r#"{{"jsonrpc":"2.0","id":null,"error":{{"code":{},"message":"unserializable error"}}}}"#,
            error.code()
        )
    });
    format_frame(Some(ERROR_EVENT), &data)
}

/// Decode one frame payload.
///
/// Accepts a JSON-RPC wrapped update (`result`), a JSON-RPC error
/// (`error`), or a bare update object.
pub fn decode_payload(data: &str) -> A2AResult<TaskUpdateEvent> {
    let value: serde_json::Value = serde_json::from_str(data).map_err(|e| {
        A2AError::InvalidJson(format!("failed to parse SSE event data: {e} (data: {data})"))
    })?;

    let event_value = if value.get("jsonrpc").is_some() {
        if let Some(error) = value.get("error") {
            let error: JsonRpcError = serde_json::from_value(error.clone()).map_err(|e| {
                A2AError::InvalidJson(format!("malformed JSON-RPC error in SSE event: {e}"))
            })?;
            return Err(A2AError::JsonRpc {
                code: error.code,
                message: error.message,
                data: error.data,
            });
        }
        value.get("result").cloned().ok_or_else(|| {
            A2AError::InvalidJson(format!(
                "JSON-RPC SSE response has neither 'result' nor 'error': {data}"
            ))
        })?
    } else {
        value
    };

    serde_json::from_value(event_value).map_err(|e| {
        A2AError::InvalidJson(format!(
            "failed to parse SSE event as task update: {e} (data: {data})"
        ))
    })
}

/// Incremental SSE frame decoder.
///
/// # Example
///
/// ```
/// use a2a_min::sse::{encode_frame, SseDecoder};
/// use a2a_min::types::{TaskState, TaskStatus, TaskStatusUpdateEvent, TaskUpdateEvent};
///
/// let update = TaskUpdateEvent::Status(TaskStatusUpdateEvent::new(
///     "t1",
///     TaskStatus::new(TaskState::Working),
///     false,
/// ));
/// let frame = encode_frame(None, &update).unwrap();
///
/// let mut decoder = SseDecoder::new();
/// let (head, tail) = frame.as_bytes().split_at(10);
/// assert!(decoder.push(head).is_empty());
/// let decoded = decoder.push(tail);
/// assert_eq!(decoded.len(), 1);
/// assert_eq!(decoded[0].as_ref().unwrap(), &update);
/// ```
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Bytes of the current, not yet terminated line.
    line: Vec<u8>,
    /// `data:` values of the current event.
    data: Vec<String>,
    /// Set when a line of the current event was not valid UTF-8.
    corrupt: Option<String>,
}

impl SseDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the body. Returns the items completed by this chunk.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<A2AResult<TaskUpdateEvent>> {
        let mut out = Vec::new();
        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|b| *b == b'\n') {
            self.line.extend_from_slice(&rest[..pos]);
            rest = &rest[pos + 1..];
            let line = std::mem::take(&mut self.line);
            if let Some(item) = self.process_line(line) {
                out.push(item);
            }
        }
        self.line.extend_from_slice(rest);
        out
    }

    /// Flush at end of body. An event missing its blank terminator line is
    /// still dispatched.
    pub fn finish(&mut self) -> Vec<A2AResult<TaskUpdateEvent>> {
        let mut out = Vec::new();
        if !self.line.is_empty() {
            let line = std::mem::take(&mut self.line);
            if let Some(item) = self.process_line(line) {
                out.push(item);
            }
        }
        if let Some(item) = self.dispatch() {
            out.push(item);
        }
        out
    }

    fn process_line(&mut self, mut line: Vec<u8>) -> Option<A2AResult<TaskUpdateEvent>> {
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.is_empty() {
            return self.dispatch();
        }

        let line = match String::from_utf8(line) {
            Ok(line) => line,
            Err(e) => {
                self.corrupt = Some(format!("invalid UTF-8 in SSE stream: {e}"));
                return None;
            }
        };

        // Comments are keep-alives.
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line.as_str(), ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        // event:, id:, retry: carry nothing the update itself lacks.
        None
    }

    fn dispatch(&mut self) -> Option<A2AResult<TaskUpdateEvent>> {
        let corrupt = self.corrupt.take();
        if self.data.is_empty() && corrupt.is_none() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        if let Some(message) = corrupt {
            return Some(Err(A2AError::InvalidJson(message)));
        }
        let trimmed = data.trim();
        if trimmed.is_empty() || trimmed == "[DONE]" {
            return None;
        }
        Some(decode_payload(trimmed))
    }
}
