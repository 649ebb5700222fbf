//! A2A server — task lifecycle management and the HTTP endpoint.
//!
//! - [`Agent`] trait — implement your agent logic
//! - [`adapt_result`] / [`adapt_stream`] — agent output to task updates
//! - [`TaskManager`] — owns tasks, drives runs, handles cancel and lookups
//! - [`TaskRegistry`] — per-task locked storage behind the manager
//! - [`PushNotificationStore`] trait + [`InMemoryPushNotificationStore`]
//! - [`Middleware`] trait + [`MiddlewareChain`] — request/response stages
//! - [`JsonRpcHandler`] — JSON-RPC dispatch
//! - [`a2a_router`] — ready-made axum route
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use a2a_min::server::*;
//!
//! struct MyAgent;
//!
//! #[async_trait::async_trait]
//! impl Agent for MyAgent {
//!     async fn invoke(&self, query: &str, session_id: &str) -> a2a_min::A2AResult<AgentInvocationResult> {
//!         Ok(AgentInvocationResult::agent_msg(format!("You said: {}", query), true, false))
//!     }
//! }
//!
//! let manager = Arc::new(TaskManager::new(Arc::new(MyAgent), TaskManagerConfig::default()));
//! let app = a2a_router(Arc::new(JsonRpcHandler::new(manager)));
//! ```

pub mod adapter;
pub mod agent;
pub mod axum_integration;
pub mod middleware;
pub mod push_notification;
pub mod request_handler;
pub mod task_manager;
pub mod task_registry;

pub use adapter::{adapt_result, adapt_stream, UpdateStream};
pub use agent::{Agent, AgentInvocationResult};
pub use axum_integration::a2a_router;
pub use middleware::{
    DebugMiddleware, LoggingMiddleware, MetricsMiddleware, Middleware, MiddlewareChain,
    RequestContext,
};
pub use push_notification::{InMemoryPushNotificationStore, PushNotificationStore};
pub use request_handler::{HandlerResponse, JsonRpcHandler};
pub use task_manager::{TaskManager, TaskManagerConfig, UpdateReceiver};
pub use task_registry::{RunGuard, TaskEntry, TaskRegistry};
