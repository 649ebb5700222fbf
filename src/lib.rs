//! # a2a-min — a minimal Agent-to-Agent (A2A) task runtime
//!
//! Wraps an agent behind the A2A task protocol: JSON-RPC 2.0 over HTTP,
//! with task updates streamed as Server-Sent Events.
//!
//! An agent implements [`server::Agent`] and answers queries with
//! [`server::AgentInvocationResult`]s. The [`server::TaskManager`] turns
//! those results into task state changes and update events, enforcing the
//! task lifecycle:
//!
//! ```text
//! submitted ──► working ──► completed
//!     │          │  ▲  ├──► failed
//!     │          ▼  │  └──► canceled
//!     │     input-required ─► completed | failed | canceled
//!     └──► failed | canceled
//! ```
//!
//! ## Feature flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `client` | yes     | HTTP client for calling A2A agents (reqwest + SSE) |
//! | `server` | yes     | Task manager, agent adapter and axum integration |
//! | `full`   | no      | Enable all features |
//!
//! ## Quick Start: Server
//!
//! ```rust,no_run
//! use a2a_min::server::{Agent, AgentInvocationResult};
//! use a2a_min::{A2AResult, ServerBuilder};
//! use std::sync::Arc;
//!
//! struct EchoAgent;
//!
//! #[async_trait::async_trait]
//! impl Agent for EchoAgent {
//!     async fn invoke(&self, query: &str, _session_id: &str) -> A2AResult<AgentInvocationResult> {
//!         Ok(AgentInvocationResult::agent_msg(format!("Echo: {}", query), true, false))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = ServerBuilder::new(Arc::new(EchoAgent)).build();
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Quick Start: Client
//!
//! ```no_run
//! use a2a_min::client::A2AClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = A2AClient::connect("http://localhost:8000/");
//!
//!     let task = client.send("Write a haiku about Rust").await?;
//!     println!("Task: {} (status: {})", task.id, task.status.state);
//!
//!     let mut stream = client.send_streaming("Tell me a story").await?;
//!     while let Some(update) = stream.next().await {
//!         let update = update?;
//!         if let Some(status) = update.status() {
//!             println!("Status: {}", status.state);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] — wire types (tasks, messages, parts, artifacts, JSON-RPC envelopes)
//! - [`state`] — the task state machine and how updates fold into a task
//! - [`sse`] — SSE framing of update streams, both directions
//! - [`server::adapter`] — agent output to task updates
//! - [`server::TaskManager`] — owns tasks, runs agents, cancellation, lookups
//! - [`server::JsonRpcHandler`] + [`server::a2a_router`] — the HTTP endpoint
//! - [`client::A2AClient`] — typed client for the same endpoint
//! - [`error::A2AError`] — errors with JSON-RPC error codes
//!
//! ## Examples
//!
//! See the `demos/` directory:
//! - `echo_agent.rs` — unary agent served over HTTP
//! - `streaming_agent.rs` — word-by-word streaming agent
//! - `streaming_client.rs` — client printing streamed updates

pub mod builders;
pub mod error;
pub mod sse;
pub mod state;
pub mod types;
pub mod utils;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "server")]
pub mod server;

/// Prelude module that re-exports commonly used types and traits.
///
/// ```
/// use a2a_min::prelude::*;
///
/// let message = Message::user("hello");
/// assert_eq!(message.role, Role::User);
/// ```
pub mod prelude {
    // Core types
    pub use crate::types::{
        AgentCapabilities, Artifact, FileContent, Message, Part, Role, Task,
        TaskArtifactUpdateEvent, TaskIdParams, TaskQueryParams, TaskSendParams, TaskState,
        TaskStatus, TaskStatusUpdateEvent, TaskUpdateEvent,
    };

    // Error types
    pub use crate::error::{A2AError, A2AResult};

    #[cfg(feature = "client")]
    pub use crate::builders::ClientBuilder;

    #[cfg(feature = "client")]
    pub use crate::client::{A2AClient, SseStream};

    #[cfg(feature = "server")]
    pub use crate::builders::ServerBuilder;

    #[cfg(feature = "server")]
    pub use crate::server::{
        a2a_router, Agent, AgentInvocationResult, JsonRpcHandler, Middleware, RequestContext,
        TaskManager, TaskManagerConfig,
    };
}

// Re-export core types at crate root for convenience.
pub use error::{A2AError, A2AResult};
pub use types::*;

#[cfg(feature = "client")]
pub use builders::ClientBuilder;

#[cfg(feature = "server")]
pub use builders::ServerBuilder;
