//! Echo Agent — a minimal A2A server that echoes messages back.
//!
//! Run with:
//! ```sh
//! cargo run --example echo_agent
//! ```
//!
//! Then test with curl:
//! ```sh
//! curl -X POST http://localhost:8000/ \
//!   -H "Content-Type: application/json" \
//!   -d '{
//!     "jsonrpc": "2.0",
//!     "id": 1,
//!     "method": "tasks/send",
//!     "params": {
//!       "id": "task-1",
//!       "message": {"role": "user", "parts": [{"type": "text", "text": "Hello, agent!"}]}
//!     }
//!   }'
//!
//! curl -X POST http://localhost:8000/ \
//!   -H "Content-Type: application/json" \
//!   -d '{"jsonrpc": "2.0", "id": 2, "method": "tasks/get", "params": {"id": "task-1"}}'
//! ```

use std::sync::Arc;

use a2a_min::builders::ServerBuilder;
use a2a_min::error::A2AResult;
use a2a_min::server::{
    Agent, AgentInvocationResult, InMemoryPushNotificationStore, LoggingMiddleware,
};
use a2a_min::utils::new_text_artifact;
use async_trait::async_trait;
use tracing_subscriber::EnvFilter;

/// A simple agent that echoes back whatever you send it.
struct EchoAgent;

#[async_trait]
impl Agent for EchoAgent {
    fn name(&self) -> &str {
        "echo"
    }

    async fn invoke(&self, query: &str, session_id: &str) -> A2AResult<AgentInvocationResult> {
        if query.trim().is_empty() {
            return Ok(AgentInvocationResult::needs_input("Say something and I'll echo it."));
        }
        tracing::info!(session_id = %session_id, "Echoing query");
        Ok(
            AgentInvocationResult::agent_msg(format!("Echo: {}", query), true, false)
                .with_artifact(new_text_artifact(
                    "echo-response",
                    query,
                    Some("The echoed text"),
                )),
        )
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app = ServerBuilder::new(Arc::new(EchoAgent))
        .with_push_store(Arc::new(InMemoryPushNotificationStore::new()))
        .with_middleware(Arc::new(LoggingMiddleware))
        .with_cors(true)
        .build();

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
    tracing::info!("Echo agent listening on http://localhost:8000/");
    axum::serve(listener, app).await?;

    Ok(())
}
