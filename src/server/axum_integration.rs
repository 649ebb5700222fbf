//! Axum integration — the HTTP endpoint for a [`JsonRpcHandler`].
//!
//! [`a2a_router`] mounts a single route, `POST /`. Unary methods answer
//! with a JSON body; `tasks/sendSubscribe` answers with an SSE stream that
//! carries one frame per update and closes right after the final one.
//!
//! # Example
//!
//! ```rust,no_run
//! use a2a_min::server::{a2a_router, Agent, AgentInvocationResult, JsonRpcHandler, TaskManager, TaskManagerConfig};
//! use a2a_min::A2AResult;
//! use std::sync::Arc;
//!
//! struct Echo;
//!
//! #[async_trait::async_trait]
//! impl Agent for Echo {
//!     async fn invoke(&self, query: &str, _: &str) -> A2AResult<AgentInvocationResult> {
//!         Ok(AgentInvocationResult::agent_msg(query, true, false))
//!     }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = Arc::new(TaskManager::new(Arc::new(Echo), TaskManagerConfig::default()));
//! let app = a2a_router(Arc::new(JsonRpcHandler::new(manager)));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use futures::stream::{Stream, StreamExt};
use tracing::{debug, error};

use crate::sse::ERROR_EVENT;
use crate::types::JsonRpcId;
use crate::utils::DEFAULT_RPC_URL;

use super::middleware::RequestContext;
use super::request_handler::{HandlerResponse, JsonRpcHandler};
use super::task_manager::UpdateReceiver;

/// Create an axum Router serving the JSON-RPC endpoint at `POST /`.
pub fn a2a_router(handler: Arc<JsonRpcHandler>) -> Router {
    Router::new()
        .route(DEFAULT_RPC_URL, post(handle_jsonrpc))
        .with_state(handler)
}

/// Main JSON-RPC entry point.
///
/// The body is taken raw so that malformed JSON is answered with a
/// JSON-RPC parse error instead of an HTTP rejection.
async fn handle_jsonrpc(State(handler): State<Arc<JsonRpcHandler>>, body: Bytes) -> Response {
    match handler.handle_bytes(&body).await {
        HandlerResponse::Json(response) => Json(response).into_response(),
        HandlerResponse::Stream {
            id,
            context,
            updates,
        } => {
            debug!(task_id = %updates.task_id(), seq = context.seq(), "Opening SSE stream");
            Sse::new(make_sse_stream(handler, id, context, updates))
                .keep_alive(KeepAlive::default())
                .into_response()
        }
    }
}

/// Turn an update sequence into SSE events.
///
/// Every update is wrapped in a JSON-RPC response and passed through the
/// response middleware. The stream ends after the final update or the
/// first error.
fn make_sse_stream(
    handler: Arc<JsonRpcHandler>,
    request_id: Option<JsonRpcId>,
    mut context: RequestContext,
    mut updates: UpdateReceiver,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        while let Some(item) = updates.next().await {
            let (event_type, last) = match &item {
                Ok(update) => (update.kind(), update.is_final()),
                Err(_) => (ERROR_EVENT, true),
            };

            let response = handler.frame_response(&mut context, request_id.clone(), item);
            match serde_json::to_string(&response) {
                Ok(json) => yield Ok(Event::default().event(event_type).data(json)),
                Err(e) => error!(error = %e, "Failed to serialize SSE frame"),
            }

            if last {
                break;
            }
        }
        debug!(task_id = %updates.task_id(), "SSE stream closed");
    }
}
