//! Shared test utilities for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use a2a_min::builders::ServerBuilder;
use a2a_min::error::{A2AError, A2AResult};
use a2a_min::server::{Agent, AgentInvocationResult, TaskManager, TaskManagerConfig};
use a2a_min::types::{AgentCapabilities, Message, TaskSendParams};
use a2a_min::utils::artifact_chunk;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::Notify;

fn streaming() -> AgentCapabilities {
    AgentCapabilities {
        streaming: true,
        ..AgentCapabilities::default()
    }
}

/// Echoes the query back in one complete result.
pub struct EchoAgent;

#[async_trait]
impl Agent for EchoAgent {
    async fn invoke(&self, query: &str, _session_id: &str) -> A2AResult<AgentInvocationResult> {
        Ok(AgentInvocationResult::agent_msg(format!("Echo: {}", query), true, false))
    }
}

/// Streams three progress messages, then a complete one.
pub struct StreamingAgent;

#[async_trait]
impl Agent for StreamingAgent {
    fn capabilities(&self) -> AgentCapabilities {
        streaming()
    }

    async fn invoke(&self, query: &str, _session_id: &str) -> A2AResult<AgentInvocationResult> {
        Ok(AgentInvocationResult::agent_msg(query, true, false))
    }

    fn stream<'a>(
        &'a self,
        query: &'a str,
        _session_id: &'a str,
    ) -> BoxStream<'a, A2AResult<AgentInvocationResult>> {
        let items: Vec<A2AResult<AgentInvocationResult>> = vec![
            Ok(AgentInvocationResult::progress("one")),
            Ok(AgentInvocationResult::progress("two")),
            Ok(AgentInvocationResult::progress("three")),
            Ok(AgentInvocationResult::agent_msg(format!("done: {}", query), true, false)),
        ];
        stream::iter(items).boxed()
    }
}

/// Streams two artifact chunks of the same artifact, then completes.
pub struct ArtifactAgent;

#[async_trait]
impl Agent for ArtifactAgent {
    fn capabilities(&self) -> AgentCapabilities {
        streaming()
    }

    async fn invoke(&self, _query: &str, _session_id: &str) -> A2AResult<AgentInvocationResult> {
        Ok(AgentInvocationResult::agent_msg("done", true, false))
    }

    fn stream<'a>(
        &'a self,
        _query: &'a str,
        _session_id: &'a str,
    ) -> BoxStream<'a, A2AResult<AgentInvocationResult>> {
        let first = AgentInvocationResult::progress("chunk").with_artifact(artifact_chunk(
            0,
            vec![a2a_min::types::Part::text("Hello, ")],
            false,
            false,
        ));
        let second = AgentInvocationResult::progress("chunk").with_artifact(artifact_chunk(
            0,
            vec![a2a_min::types::Part::text("world")],
            true,
            true,
        ));
        let items: Vec<A2AResult<AgentInvocationResult>> = vec![
            Ok(first),
            Ok(second),
            Ok(AgentInvocationResult::agent_msg("done", true, false)),
        ];
        stream::iter(items).boxed()
    }
}

/// Streams one progress message, then waits for [`GatedAgent::open`]
/// before completing. Counts how many items were pulled.
#[derive(Default)]
pub struct GatedAgent {
    gate: Arc<Notify>,
    pulled: Arc<AtomicUsize>,
}

impl GatedAgent {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Let the pending run complete.
    pub fn open(&self) {
        self.gate.notify_one();
    }

    /// Items handed to the task manager so far.
    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for GatedAgent {
    fn capabilities(&self) -> AgentCapabilities {
        streaming()
    }

    async fn invoke(&self, _query: &str, _session_id: &str) -> A2AResult<AgentInvocationResult> {
        self.gate.notified().await;
        Ok(AgentInvocationResult::agent_msg("opened", true, false))
    }

    fn stream<'a>(
        &'a self,
        _query: &'a str,
        _session_id: &'a str,
    ) -> BoxStream<'a, A2AResult<AgentInvocationResult>> {
        let gate = Arc::clone(&self.gate);
        let pulled = Arc::clone(&self.pulled);
        let pulled_first = Arc::clone(&self.pulled);

        let first = stream::once(async move {
            pulled_first.fetch_add(1, Ordering::SeqCst);
            Ok::<_, A2AError>(AgentInvocationResult::progress("waiting"))
        });
        let last = stream::once(async move {
            gate.notified().await;
            pulled.fetch_add(1, Ordering::SeqCst);
            Ok::<_, A2AError>(AgentInvocationResult::agent_msg("opened", true, false))
        });
        first.chain(last).boxed()
    }
}

/// Sleeps before answering.
pub struct SlowAgent(pub Duration);

#[async_trait]
impl Agent for SlowAgent {
    async fn invoke(&self, query: &str, _session_id: &str) -> A2AResult<AgentInvocationResult> {
        tokio::time::sleep(self.0).await;
        Ok(AgentInvocationResult::agent_msg(format!("Slow: {}", query), true, false))
    }
}

/// Always fails.
pub struct FailingAgent;

#[async_trait]
impl Agent for FailingAgent {
    async fn invoke(&self, _query: &str, _session_id: &str) -> A2AResult<AgentInvocationResult> {
        Err(A2AError::internal_error("Agent intentionally failed"))
    }
}

/// Asks for a name until the query contains one.
pub struct InputAgent;

#[async_trait]
impl Agent for InputAgent {
    async fn invoke(&self, query: &str, session_id: &str) -> A2AResult<AgentInvocationResult> {
        match query.strip_prefix("my name is ") {
            Some(name) => Ok(AgentInvocationResult::agent_msg(
                format!("Hello, {} ({})", name, session_id),
                true,
                false,
            )),
            None => Ok(AgentInvocationResult::needs_input("What is your name?")),
        }
    }
}

/// Keeps yielding after its complete result.
pub struct OverrunAgent;

#[async_trait]
impl Agent for OverrunAgent {
    fn capabilities(&self) -> AgentCapabilities {
        streaming()
    }

    async fn invoke(&self, _query: &str, _session_id: &str) -> A2AResult<AgentInvocationResult> {
        Ok(AgentInvocationResult::agent_msg("done", true, false))
    }

    fn stream<'a>(
        &'a self,
        _query: &'a str,
        _session_id: &'a str,
    ) -> BoxStream<'a, A2AResult<AgentInvocationResult>> {
        let items: Vec<A2AResult<AgentInvocationResult>> = vec![
            Ok(AgentInvocationResult::agent_msg("done", true, false)),
            Ok(AgentInvocationResult::progress("too late")),
        ];
        stream::iter(items).boxed()
    }
}

/// Asks for input, then keeps its stream open for a while before ending.
///
/// Records how many of its streams are alive at the same time.
pub struct LingeringAgent {
    linger: Duration,
    live: Arc<AtomicUsize>,
    max_live: Arc<AtomicUsize>,
}

impl LingeringAgent {
    pub fn new(linger: Duration) -> Arc<Self> {
        Arc::new(Self {
            linger,
            live: Arc::new(AtomicUsize::new(0)),
            max_live: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Highest number of simultaneously open streams seen so far.
    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }
}

struct LiveStream(Arc<AtomicUsize>);

impl Drop for LiveStream {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Agent for LingeringAgent {
    fn capabilities(&self) -> AgentCapabilities {
        streaming()
    }

    async fn invoke(&self, query: &str, _session_id: &str) -> A2AResult<AgentInvocationResult> {
        Ok(AgentInvocationResult::needs_input(format!("more than {}?", query)))
    }

    fn stream<'a>(
        &'a self,
        query: &'a str,
        _session_id: &'a str,
    ) -> BoxStream<'a, A2AResult<AgentInvocationResult>> {
        Box::pin(async_stream::stream! {
            let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_live.fetch_max(now, Ordering::SeqCst);
            let _live = LiveStream(self.live.clone());

            yield Ok::<_, A2AError>(AgentInvocationResult::needs_input(format!("more than {}?", query)));
            tokio::time::sleep(self.linger).await;
        })
    }
}

/// A task manager with default settings.
pub fn manager(agent: Arc<dyn Agent>) -> TaskManager {
    TaskManager::new(agent, TaskManagerConfig::default())
}

/// Send params for `id` with a single user text message.
pub fn send_params(id: &str, text: &str) -> TaskSendParams {
    TaskSendParams::new(id, Message::user(text))
}

/// Start a test server on a random port. Returns the endpoint URL and a
/// handle to shut it down.
pub async fn start_test_server(agent: Arc<dyn Agent>) -> (String, tokio::task::JoinHandle<()>) {
    start_test_server_with(ServerBuilder::new(agent)).await
}

/// Start a test server from a configured builder.
pub async fn start_test_server_with(
    builder: ServerBuilder,
) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let url = format!("http://{}/", addr);

    let app = builder.build();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Brief wait for the server to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (url, handle)
}

/// Helper to build a JSON-RPC request body.
pub fn jsonrpc_request(
    id: serde_json::Value,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

/// Helper to build a task send body (`tasks/send` or `tasks/sendSubscribe`).
pub fn task_send_request(id: i64, method: &str, task_id: &str, text: &str) -> serde_json::Value {
    jsonrpc_request(
        serde_json::json!(id),
        method,
        serde_json::json!({
            "id": task_id,
            "sessionId": "session-1",
            "message": {
                "role": "user",
                "parts": [{"type": "text", "text": text}]
            }
        }),
    )
}

/// Split a raw SSE body into `(event, data)` pairs.
pub fn parse_sse_events(body: &str) -> Vec<(String, serde_json::Value)> {
    body.split("\n\n")
        .filter_map(|frame| {
            let mut event = String::new();
            let mut data = String::new();
            for line in frame.lines() {
                if let Some(value) = line.strip_prefix("event:") {
                    event = value.trim().to_string();
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push_str(value.trim_start());
                }
            }
            if data.is_empty() {
                return None;
            }
            Some((event, serde_json::from_str(&data).ok()?))
        })
        .collect()
}
