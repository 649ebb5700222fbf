//! Streaming Agent — answers word by word over SSE.
//!
//! Run with:
//! ```sh
//! cargo run --example streaming_agent
//! ```
//!
//! Then stream a task with curl:
//! ```sh
//! curl -N -X POST http://localhost:8000/ \
//!   -H "Content-Type: application/json" \
//!   -d '{
//!     "jsonrpc": "2.0",
//!     "id": 1,
//!     "method": "tasks/sendSubscribe",
//!     "params": {
//!       "id": "task-1",
//!       "message": {"role": "user", "parts": [{"type": "text", "text": "What is Rust?"}]}
//!     }
//!   }'
//! ```
//!
//! Or use the `streaming_client` demo.

use std::sync::Arc;
use std::time::Duration;

use a2a_min::builders::ServerBuilder;
use a2a_min::error::{A2AError, A2AResult};
use a2a_min::server::{Agent, AgentInvocationResult, MetricsMiddleware};
use a2a_min::types::AgentCapabilities;
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use tracing_subscriber::EnvFilter;

/// Streams its answer one word at a time, then sends the full text.
struct StreamingAgent {
    delay: Duration,
}

impl StreamingAgent {
    fn words(query: &str) -> Vec<String> {
        format!(
            "You asked: {}. This is a streaming response that comes word by word.",
            query
        )
        .split_whitespace()
        .map(str::to_string)
        .collect()
    }
}

#[async_trait]
impl Agent for StreamingAgent {
    fn name(&self) -> &str {
        "streaming"
    }

    fn capabilities(&self) -> AgentCapabilities {
        AgentCapabilities {
            streaming: true,
            ..AgentCapabilities::default()
        }
    }

    async fn invoke(&self, query: &str, _session_id: &str) -> A2AResult<AgentInvocationResult> {
        Ok(AgentInvocationResult::agent_msg(
            format!("You asked: {}. This is a non-streaming response.", query),
            true,
            false,
        ))
    }

    fn stream<'a>(
        &'a self,
        query: &'a str,
        _session_id: &'a str,
    ) -> BoxStream<'a, A2AResult<AgentInvocationResult>> {
        let words = Self::words(query);
        let full = words.join(" ");
        let delay = self.delay;

        let partials = futures::stream::iter(words).then(move |word| async move {
            tokio::time::sleep(delay).await;
            Ok::<_, A2AError>(AgentInvocationResult::progress(format!("{} ", word)))
        });
        let last = futures::stream::once(async move {
            Ok::<_, A2AError>(AgentInvocationResult::agent_msg(full, true, false))
        });
        partials.chain(last).boxed()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let agent = StreamingAgent {
        delay: Duration::from_millis(200),
    };
    let metrics = MetricsMiddleware::new(|name, seconds| {
        tracing::info!(metric = %name, seconds, "Request metric");
    });

    let app = ServerBuilder::new(Arc::new(agent))
        .with_middleware(Arc::new(metrics))
        .with_cors(true)
        .build();

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
    tracing::info!("Streaming agent listening on http://localhost:8000/");
    axum::serve(listener, app).await?;

    Ok(())
}
