//! Request/response middleware for the JSON-RPC endpoint.
//!
//! Stages are synchronous transforms. [`MiddlewareChain`] runs request
//! stages in registration order and response stages in reverse, so the
//! first stage registered sees the request first and the response last.
//! Streaming responses pass through the response stages once per frame.
//!
//! Every hook call of one request receives the same [`RequestContext`], so
//! stages can correlate a response with its request without relying on the
//! client-chosen JSON-RPC id.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::error::A2AResult;
use crate::types::{JsonRpcRequest, JsonRpcResponse};

static NEXT_REQUEST: AtomicU64 = AtomicU64::new(1);

/// Server-side identity of one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    seq: u64,
    received_at: Instant,
    frame: usize,
}

impl RequestContext {
    /// A context for a request that just arrived.
    pub fn new() -> Self {
        Self {
            seq: NEXT_REQUEST.fetch_add(1, Ordering::Relaxed),
            received_at: Instant::now(),
            frame: 0,
        }
    }

    /// Sequence number, unique within the process.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// When the request arrived.
    pub fn received_at(&self) -> Instant {
        self.received_at
    }

    /// Index of the response being processed. Unary responses and the
    /// first SSE frame are `0`.
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub(crate) fn advance_frame(&mut self) {
        self.frame += 1;
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// One middleware stage. Both hooks default to passing values through.
pub trait Middleware: Send + Sync {
    /// Inspect or rewrite a request. An error rejects the request.
    fn on_request(
        &self,
        _context: &RequestContext,
        request: JsonRpcRequest,
    ) -> A2AResult<JsonRpcRequest> {
        Ok(request)
    }

    /// Inspect or rewrite a response.
    fn on_response(&self, _context: &RequestContext, response: JsonRpcResponse) -> JsonRpcResponse {
        response
    }
}

/// Ordered list of middleware stages.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    stages: Vec<Arc<dyn Middleware>>,
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("stages", &self.stages.len())
            .finish()
    }
}

impl MiddlewareChain {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    pub fn push(&mut self, stage: Arc<dyn Middleware>) {
        self.stages.push(stage);
    }

    /// Append a stage (builder-style).
    pub fn with(mut self, stage: Arc<dyn Middleware>) -> Self {
        self.push(stage);
        self
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the chain has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run request stages in order, stopping at the first error.
    pub fn on_request(
        &self,
        context: &RequestContext,
        request: JsonRpcRequest,
    ) -> A2AResult<JsonRpcRequest> {
        self.stages
            .iter()
            .try_fold(request, |request, stage| stage.on_request(context, request))
    }

    /// Run response stages in reverse order.
    pub fn on_response(&self, context: &RequestContext, response: JsonRpcResponse) -> JsonRpcResponse {
        self.stages
            .iter()
            .rev()
            .fold(response, |response, stage| stage.on_response(context, response))
    }
}

/// Logs every request and response at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn on_request(
        &self,
        context: &RequestContext,
        request: JsonRpcRequest,
    ) -> A2AResult<JsonRpcRequest> {
        info!(
            seq = context.seq(),
            method = %request.method,
            id = ?request.id,
            "JSON-RPC request"
        );
        Ok(request)
    }

    fn on_response(&self, context: &RequestContext, response: JsonRpcResponse) -> JsonRpcResponse {
        info!(
            seq = context.seq(),
            frame = context.frame(),
            id = ?response.id,
            error = ?response.error.as_ref().map(|e| e.code),
            "JSON-RPC response"
        );
        response
    }
}

/// Callback receiving `(metric name, seconds)`.
pub type MetricsCallback = Arc<dyn Fn(&str, f64) + Send + Sync>;

/// Reports `request_time` once per request: the time from arrival to its
/// first response, which for a stream is the first frame.
pub struct MetricsMiddleware {
    callback: MetricsCallback,
}

impl MetricsMiddleware {
    /// Report metrics through `callback`.
    pub fn new(callback: impl Fn(&str, f64) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }
}

impl Middleware for MetricsMiddleware {
    fn on_response(&self, context: &RequestContext, response: JsonRpcResponse) -> JsonRpcResponse {
        if context.frame() == 0 {
            let elapsed = context.received_at().elapsed();
            (self.callback)("request_time", elapsed.as_secs_f64());
        }
        response
    }
}

/// Callback receiving `("request" | "response", payload)`.
pub type DebugCallback = Arc<dyn Fn(&str, &serde_json::Value) + Send + Sync>;

/// Hands every request and response to a callback as JSON.
pub struct DebugMiddleware {
    callback: DebugCallback,
}

impl DebugMiddleware {
    /// Report payloads through `callback`.
    pub fn new(callback: impl Fn(&str, &serde_json::Value) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }
}

impl Middleware for DebugMiddleware {
    fn on_request(
        &self,
        _context: &RequestContext,
        request: JsonRpcRequest,
    ) -> A2AResult<JsonRpcRequest> {
        if let Ok(value) = serde_json::to_value(&request) {
            (self.callback)("request", &value);
        }
        Ok(request)
    }

    fn on_response(&self, _context: &RequestContext, response: JsonRpcResponse) -> JsonRpcResponse {
        if let Ok(value) = serde_json::to_value(&response) {
            (self.callback)("response", &value);
        }
        response
    }
}
