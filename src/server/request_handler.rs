//! JSON-RPC dispatch onto the [`TaskManager`].
//!
//! Transport-agnostic: [`JsonRpcHandler::handle_bytes`] takes a raw request
//! body and returns either a complete response or an update stream that the
//! HTTP layer turns into SSE frames.
//!
//! | Method | Result |
//! |--------|--------|
//! | `tasks/send` | `Task` |
//! | `tasks/sendSubscribe` | stream of `TaskUpdateEvent` |
//! | `tasks/get` | `Task` |
//! | `tasks/cancel` | `Task` |
//! | `tasks/pushNotification/set` | `TaskPushNotificationConfig` |
//! | `tasks/pushNotification/get` | `TaskPushNotificationConfig` or `null` |

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::{A2AError, A2AResult};
use crate::types::{
    JsonRpcId, JsonRpcRequest, JsonRpcResponse, TaskIdParams, TaskPushNotificationConfig,
    TaskQueryParams, TaskSendParams, TaskUpdateEvent,
};
use crate::utils::constants::*;

use super::middleware::{MiddlewareChain, RequestContext};
use super::task_manager::{TaskManager, UpdateReceiver};

/// Outcome of handling one request.
#[derive(Debug)]
pub enum HandlerResponse {
    /// A complete JSON-RPC response, middleware already applied.
    Json(JsonRpcResponse),

    /// An update stream for `tasks/sendSubscribe`. Each update still has to
    /// pass through [`JsonRpcHandler::frame_response`].
    Stream {
        /// Id of the originating request, echoed on every frame.
        id: Option<JsonRpcId>,
        /// Context of the originating request, handed to response middleware.
        context: RequestContext,
        /// The updates.
        updates: UpdateReceiver,
    },
}

impl HandlerResponse {
    /// The JSON response, if this is not a stream.
    pub fn into_json(self) -> Option<JsonRpcResponse> {
        match self {
            HandlerResponse::Json(response) => Some(response),
            HandlerResponse::Stream { .. } => None,
        }
    }
}

/// Routes JSON-RPC requests to a [`TaskManager`] through a middleware chain.
#[derive(Debug, Clone)]
pub struct JsonRpcHandler {
    manager: Arc<TaskManager>,
    middleware: MiddlewareChain,
}

impl JsonRpcHandler {
    /// Create a handler without middleware.
    pub fn new(manager: Arc<TaskManager>) -> Self {
        Self::with_middleware(manager, MiddlewareChain::new())
    }

    /// Create a handler with a middleware chain.
    pub fn with_middleware(manager: Arc<TaskManager>, middleware: MiddlewareChain) -> Self {
        Self {
            manager,
            middleware,
        }
    }

    /// The task manager requests are dispatched to.
    pub fn manager(&self) -> &Arc<TaskManager> {
        &self.manager
    }

    /// Handle a raw request body.
    ///
    /// Unparsable JSON yields `-32700`, a body that is not a request
    /// object `-32600`.
    pub async fn handle_bytes(&self, body: &[u8]) -> HandlerResponse {
        let context = RequestContext::new();
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Unparsable JSON-RPC body");
                return self.respond(&context, JsonRpcResponse::from_a2a_error(
                    None,
                    A2AError::parse_error(e.to_string()),
                ));
            }
        };
        let id = value
            .get("id")
            .and_then(|id| serde_json::from_value::<JsonRpcId>(id.clone()).ok());
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.dispatch(context, request).await,
            Err(e) => self.respond(
                &context,
                JsonRpcResponse::from_a2a_error(id, A2AError::invalid_request(e.to_string())),
            ),
        }
    }

    /// Handle a decoded request.
    pub async fn handle(&self, request: JsonRpcRequest) -> HandlerResponse {
        self.dispatch(RequestContext::new(), request).await
    }

    async fn dispatch(&self, context: RequestContext, request: JsonRpcRequest) -> HandlerResponse {
        let id = request.id.clone();
        if request.jsonrpc != "2.0" {
            return self.respond(&context, JsonRpcResponse::from_a2a_error(
                id,
                A2AError::invalid_request("Invalid JSON-RPC version — must be \"2.0\""),
            ));
        }

        let request = match self.middleware.on_request(&context, request) {
            Ok(request) => request,
            Err(e) => {
                warn!(seq = context.seq(), error = %e, "Request rejected by middleware");
                return self.respond(&context, JsonRpcResponse::from_a2a_error(id, e));
            }
        };

        debug!(seq = context.seq(), method = %request.method, "JSON-RPC request received");
        let params = request.params.unwrap_or(Value::Null);
        let result = match request.method.as_str() {
            METHOD_TASKS_SEND => match parse_params::<TaskSendParams>(params) {
                Ok(params) => to_result(self.manager.submit(params).await),
                Err(e) => Err(e),
            },
            METHOD_TASKS_SEND_SUBSCRIBE => {
                return self.handle_send_subscribe(context, id, params).await;
            }
            METHOD_TASKS_GET => match parse_params::<TaskQueryParams>(params) {
                Ok(params) => to_result(self.manager.get(&params.id, params.history_length).await),
                Err(e) => Err(e),
            },
            METHOD_TASKS_CANCEL => match parse_params::<TaskIdParams>(params) {
                Ok(params) => to_result(self.manager.cancel(&params.id).await),
                Err(e) => Err(e),
            },
            METHOD_PUSH_NOTIFICATION_SET => {
                match parse_params::<TaskPushNotificationConfig>(params) {
                    Ok(config) => to_result(self.manager.set_push_config(config).await),
                    Err(e) => Err(e),
                }
            }
            METHOD_PUSH_NOTIFICATION_GET => match parse_params::<TaskIdParams>(params) {
                Ok(params) => to_result(self.manager.get_push_config(&params.id).await),
                Err(e) => Err(e),
            },
            method => {
                warn!(method = %method, "Unknown JSON-RPC method");
                Err(A2AError::method_not_found(method))
            }
        };

        let response = match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::from_a2a_error(id, e),
        };
        self.respond(&context, response)
    }

    /// Build the response carried by one SSE frame, middleware applied.
    ///
    /// `context` is the one returned in [`HandlerResponse::Stream`]; it
    /// counts the frames passed through.
    pub fn frame_response(
        &self,
        context: &mut RequestContext,
        id: Option<JsonRpcId>,
        update: A2AResult<TaskUpdateEvent>,
    ) -> JsonRpcResponse {
        let response = match update.and_then(|update| crate::sse::update_response(id.clone(), &update)) {
            Ok(response) => response,
            Err(e) => JsonRpcResponse::from_a2a_error(id, e),
        };
        let response = self.middleware.on_response(context, response);
        context.advance_frame();
        response
    }

    async fn handle_send_subscribe(
        &self,
        context: RequestContext,
        id: Option<JsonRpcId>,
        params: Value,
    ) -> HandlerResponse {
        if !self.manager.capabilities().streaming {
            return self.respond(
                &context,
                JsonRpcResponse::from_a2a_error(
                    id,
                    A2AError::unsupported_operation("Streaming is not supported by the agent"),
                ),
            );
        }
        let params = match parse_params::<TaskSendParams>(params) {
            Ok(params) => params,
            Err(e) => return self.respond(&context, JsonRpcResponse::from_a2a_error(id, e)),
        };
        match self.manager.subscribe(params).await {
            Ok(updates) => HandlerResponse::Stream {
                id,
                context,
                updates,
            },
            Err(e) => self.respond(&context, JsonRpcResponse::from_a2a_error(id, e)),
        }
    }

    fn respond(&self, context: &RequestContext, response: JsonRpcResponse) -> HandlerResponse {
        HandlerResponse::Json(self.middleware.on_response(context, response))
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> A2AResult<T> {
    serde_json::from_value(params).map_err(|e| A2AError::invalid_params(e.to_string()))
}

fn to_result<T: serde::Serialize>(result: A2AResult<T>) -> A2AResult<Value> {
    let value = result?;
    serde_json::to_value(&value).map_err(|e| {
        error!(error = %e, "Failed to serialize response");
        A2AError::internal_error(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error;
    use crate::server::agent::{Agent, AgentInvocationResult};
    use crate::server::task_manager::TaskManagerConfig;
    use async_trait::async_trait;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Agent for Echo {
        async fn invoke(&self, query: &str, _session_id: &str) -> A2AResult<AgentInvocationResult> {
            Ok(AgentInvocationResult::agent_msg(format!("Echo: {}", query), true, false))
        }
    }

    fn handler() -> JsonRpcHandler {
        JsonRpcHandler::new(Arc::new(TaskManager::new(
            Arc::new(Echo),
            TaskManagerConfig::default(),
        )))
    }

    async fn call(handler: &JsonRpcHandler, body: Value) -> JsonRpcResponse {
        handler
            .handle_bytes(body.to_string().as_bytes())
            .await
            .into_json()
            .expect("json response")
    }

    fn error_code(response: &JsonRpcResponse) -> i64 {
        response.error.as_ref().expect("error response").code
    }

    #[tokio::test]
    async fn parse_error_for_garbage() {
        let response = handler().handle_bytes(b"{oops").await.into_json().unwrap();
        assert_eq!(error_code(&response), error::PARSE_ERROR);
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn invalid_request_for_wrong_version_or_shape() {
        let handler = handler();
        let response = call(&handler, json!({"jsonrpc": "1.0", "id": 1, "method": "tasks/get"})).await;
        assert_eq!(error_code(&response), error::INVALID_REQUEST);
        assert_eq!(response.id, Some(JsonRpcId::Number(1)));

        let response = call(&handler, json!({"jsonrpc": "2.0", "id": 2})).await;
        assert_eq!(error_code(&response), error::INVALID_REQUEST);
        assert_eq!(response.id, Some(JsonRpcId::Number(2)));
    }

    #[tokio::test]
    async fn unknown_method_and_bad_params() {
        let handler = handler();
        let response = call(&handler, json!({"jsonrpc": "2.0", "id": 1, "method": "tasks/list"})).await;
        assert_eq!(error_code(&response), error::METHOD_NOT_FOUND);

        let response = call(
            &handler,
            json!({"jsonrpc": "2.0", "id": 1, "method": "tasks/send", "params": {"id": 5}}),
        )
        .await;
        assert_eq!(error_code(&response), error::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn send_subscribe_requires_streaming_agent() {
        let response = call(
            &handler(),
            json!({
                "jsonrpc": "2.0", "id": 1, "method": "tasks/sendSubscribe",
                "params": {"id": "t1", "message": {"role": "user", "parts": [{"type": "text", "text": "hi"}]}}
            }),
        )
        .await;
        assert_eq!(error_code(&response), error::UNSUPPORTED_OPERATION);
    }

    #[tokio::test]
    async fn send_then_get() {
        let handler = handler();
        let response = call(
            &handler,
            json!({
                "jsonrpc": "2.0", "id": "a", "method": "tasks/send",
                "params": {"id": "t1", "message": {"role": "user", "parts": [{"type": "text", "text": "hi"}]}}
            }),
        )
        .await;
        let result = response.result.expect("result");
        assert_eq!(result["status"]["state"], "completed");

        let response = call(
            &handler,
            json!({"jsonrpc": "2.0", "id": "b", "method": "tasks/get", "params": {"id": "t1", "historyLength": 1}}),
        )
        .await;
        let result = response.result.expect("result");
        assert_eq!(result["history"].as_array().unwrap().len(), 1);
        assert_eq!(result["history"][0]["parts"][0]["text"], "Echo: hi");
    }

    #[tokio::test]
    async fn push_config_without_store_is_not_supported() {
        let response = call(
            &handler(),
            json!({"jsonrpc": "2.0", "id": 1, "method": "tasks/pushNotification/get", "params": {"id": "t1"}}),
        )
        .await;
        assert_eq!(error_code(&response), error::PUSH_NOTIFICATION_NOT_SUPPORTED);
    }
}
