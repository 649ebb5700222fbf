//! HTTP-level tests for the JSON-RPC endpoint and its SSE responses.

mod common;

use std::sync::{Arc, Mutex};

use a2a_min::builders::ServerBuilder;
use a2a_min::error;
use a2a_min::server::{
    DebugMiddleware, InMemoryPushNotificationStore, MetricsMiddleware, Middleware, RequestContext,
};
use a2a_min::types::{JsonRpcRequest, JsonRpcResponse};
use a2a_min::A2AResult;
use common::{
    jsonrpc_request, parse_sse_events, start_test_server, start_test_server_with,
    task_send_request, EchoAgent, GatedAgent, StreamingAgent,
};
use serde_json::{json, Value};

async fn post(url: &str, body: &Value) -> Value {
    reqwest::Client::new()
        .post(url)
        .json(body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn tasks_send_then_get() {
    let (url, _handle) = start_test_server(Arc::new(EchoAgent)).await;

    let response = post(&url, &task_send_request(1, "tasks/send", "t1", "Hello")).await;
    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["id"], "t1");
    assert_eq!(response["result"]["sessionId"], "session-1");
    assert_eq!(response["result"]["status"]["state"], "completed");
    assert_eq!(
        response["result"]["status"]["message"]["parts"][0],
        json!({"type": "text", "text": "Echo: Hello"})
    );

    let response = post(
        &url,
        &jsonrpc_request(json!("g"), "tasks/get", json!({"id": "t1", "historyLength": 1})),
    )
    .await;
    assert_eq!(response["id"], "g");
    assert_eq!(response["result"]["history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn send_subscribe_streams_frames_in_order() {
    let (url, _handle) = start_test_server(Arc::new(StreamingAgent)).await;

    let resp = reqwest::Client::new()
        .post(&url)
        .json(&task_send_request(7, "tasks/sendSubscribe", "t2", "go"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let content_type = resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(
        content_type.contains("text/event-stream"),
        "Expected text/event-stream, got: {}",
        content_type
    );

    // The body ends because the server closes after the final frame.
    let body = resp.text().await.unwrap();
    let events = parse_sse_events(&body);
    assert_eq!(events.len(), 4, "body: {}", body);

    for (event, data) in &events {
        assert_eq!(event, "status-update");
        assert_eq!(data["jsonrpc"], "2.0");
        assert_eq!(data["id"], 7);
        assert_eq!(data["result"]["id"], "t2");
        assert_eq!(data["result"]["kind"], "status-update");
    }
    let finals: Vec<bool> = events
        .iter()
        .map(|(_, data)| data["result"]["final"].as_bool().unwrap())
        .collect();
    assert_eq!(finals, vec![false, false, false, true]);
    assert_eq!(events[3].1["result"]["status"]["state"], "completed");
}

#[tokio::test]
async fn send_subscribe_to_unary_agent_is_unsupported() {
    let (url, _handle) = start_test_server(Arc::new(EchoAgent)).await;
    let response = post(&url, &task_send_request(1, "tasks/sendSubscribe", "t1", "hi")).await;
    assert_eq!(response["error"]["code"], error::UNSUPPORTED_OPERATION);
}

#[tokio::test]
async fn protocol_errors_have_standard_codes() {
    let (url, _handle) = start_test_server(Arc::new(EchoAgent)).await;
    let client = reqwest::Client::new();

    let response: Value = client
        .post(&url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(response["error"]["code"], error::PARSE_ERROR);
    assert_eq!(response["id"], Value::Null);

    let response = post(&url, &jsonrpc_request(json!(2), "tasks/list", json!({}))).await;
    assert_eq!(response["error"]["code"], error::METHOD_NOT_FOUND);
    assert_eq!(response["id"], 2);

    let response = post(&url, &jsonrpc_request(json!(3), "tasks/get", json!({"nope": 1}))).await;
    assert_eq!(response["error"]["code"], error::INVALID_PARAMS);

    let response = post(
        &url,
        &json!({"jsonrpc": "1.0", "id": 4, "method": "tasks/get", "params": {"id": "x"}}),
    )
    .await;
    assert_eq!(response["error"]["code"], error::INVALID_REQUEST);

    let response = post(&url, &jsonrpc_request(json!(5), "tasks/get", json!({"id": "missing"}))).await;
    assert_eq!(response["error"]["code"], error::TASK_NOT_FOUND);
}

#[tokio::test]
async fn cancel_completed_task_over_http() {
    let (url, _handle) = start_test_server(Arc::new(EchoAgent)).await;
    post(&url, &task_send_request(1, "tasks/send", "t3", "hi")).await;

    let response = post(&url, &jsonrpc_request(json!(2), "tasks/cancel", json!({"id": "t3"}))).await;
    assert_eq!(response["error"]["code"], error::TASK_NOT_CANCELABLE);
}

#[tokio::test]
async fn cancel_mid_stream_over_http() {
    let agent = GatedAgent::new();
    let (url, _handle) = start_test_server(agent.clone()).await;

    let stream_url = url.clone();
    let reader = tokio::spawn(async move {
        reqwest::Client::new()
            .post(&stream_url)
            .json(&task_send_request(1, "tasks/sendSubscribe", "t1", "go"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap()
    });

    // Wait until the run is underway.
    for _ in 0..50 {
        if agent.pulled() > 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    let response = post(&url, &jsonrpc_request(json!(2), "tasks/cancel", json!({"id": "t1"}))).await;
    assert_eq!(response["result"]["status"]["state"], "canceled");

    let body = reader.await.unwrap();
    let events = parse_sse_events(&body);
    let last = &events.last().expect("frames").1;
    assert_eq!(last["result"]["final"], true);
    assert_eq!(last["result"]["status"]["state"], "canceled");
}

#[tokio::test]
async fn push_notification_methods() {
    let builder = ServerBuilder::new(Arc::new(EchoAgent))
        .with_push_store(Arc::new(InMemoryPushNotificationStore::new()));
    let (url, _handle) = start_test_server_with(builder).await;
    post(&url, &task_send_request(1, "tasks/send", "t1", "hi")).await;

    let response = post(
        &url,
        &jsonrpc_request(json!(2), "tasks/pushNotification/get", json!({"id": "t1"})),
    )
    .await;
    assert_eq!(response["result"], Value::Null);
    assert!(response.get("error").is_none());

    let config = json!({
        "id": "t1",
        "pushNotificationConfig": {
            "url": "https://example.com/hook",
            "authentication": {"schemes": ["Bearer"]}
        }
    });
    let response = post(&url, &jsonrpc_request(json!(3), "tasks/pushNotification/set", config.clone())).await;
    assert_eq!(response["result"], config);

    let response = post(
        &url,
        &jsonrpc_request(json!(4), "tasks/pushNotification/get", json!({"id": "t1"})),
    )
    .await;
    assert_eq!(response["result"], config);
}

#[tokio::test]
async fn push_notification_without_store_is_unsupported() {
    let (url, _handle) = start_test_server(Arc::new(EchoAgent)).await;
    post(&url, &task_send_request(1, "tasks/send", "t1", "hi")).await;
    let response = post(
        &url,
        &jsonrpc_request(json!(2), "tasks/pushNotification/get", json!({"id": "t1"})),
    )
    .await;
    assert_eq!(response["error"]["code"], error::PUSH_NOTIFICATION_NOT_SUPPORTED);
}

/// Rejects every request for one method.
struct Deny(&'static str);

impl Middleware for Deny {
    fn on_request(
        &self,
        _context: &RequestContext,
        request: JsonRpcRequest,
    ) -> A2AResult<JsonRpcRequest> {
        if request.method == self.0 {
            return Err(a2a_min::A2AError::invalid_request("denied"));
        }
        Ok(request)
    }
}

#[tokio::test]
async fn middleware_sees_requests_and_every_stream_frame() {
    let seen = Arc::new(Mutex::new(Vec::<(String, Value)>::new()));
    let sink = seen.clone();
    let debug = DebugMiddleware::new(move |event, value| {
        sink.lock().unwrap().push((event.to_string(), value.clone()));
    });

    let builder = ServerBuilder::new(Arc::new(StreamingAgent))
        .with_middleware(Arc::new(debug))
        .with_middleware(Arc::new(Deny("tasks/cancel")));
    let (url, _handle) = start_test_server_with(builder).await;

    let body = reqwest::Client::new()
        .post(&url)
        .json(&task_send_request(1, "tasks/sendSubscribe", "t1", "go"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(parse_sse_events(&body).len(), 4);

    {
        let seen = seen.lock().unwrap();
        let requests = seen.iter().filter(|(e, _)| e == "request").count();
        let responses = seen.iter().filter(|(e, _)| e == "response").count();
        assert_eq!(requests, 1);
        assert_eq!(responses, 4);
    }

    let response = post(&url, &jsonrpc_request(json!(2), "tasks/cancel", json!({"id": "t1"}))).await;
    assert_eq!(response["error"]["code"], error::INVALID_REQUEST);
    let parsed: JsonRpcResponse = serde_json::from_value(response).unwrap();
    assert!(parsed.error.unwrap().message.contains("denied"));
}

#[tokio::test]
async fn metrics_time_every_request_once_even_with_shared_ids() {
    let timings = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = timings.clone();
    let metrics = MetricsMiddleware::new(move |name, _seconds| {
        sink.lock().unwrap().push(name.to_string());
    });
    let builder = ServerBuilder::new(Arc::new(StreamingAgent)).with_middleware(Arc::new(metrics));
    let (url, _handle) = start_test_server_with(builder).await;

    // Two callers that both picked JSON-RPC id 1.
    let req_a = task_send_request(1, "tasks/send", "a", "x");
    let req_b = task_send_request(1, "tasks/send", "b", "y");
    let (a, b) = tokio::join!(post(&url, &req_a), post(&url, &req_b));
    assert_eq!(a["result"]["status"]["state"], "completed");
    assert_eq!(b["result"]["status"]["state"], "completed");
    assert_eq!(timings.lock().unwrap().len(), 2);

    let body = reqwest::Client::new()
        .post(&url)
        .json(&task_send_request(1, "tasks/sendSubscribe", "c", "z"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(parse_sse_events(&body).len(), 4);

    let timings = timings.lock().unwrap();
    assert_eq!(timings.len(), 3);
    assert!(timings.iter().all(|name| name == "request_time"));
}

#[tokio::test]
async fn cors_layer_answers_preflight() {
    let builder = ServerBuilder::new(Arc::new(EchoAgent)).with_cors(true);
    let (url, _handle) = start_test_server_with(builder).await;

    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, &url)
        .header("origin", "http://example.com")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .unwrap();
    assert!(resp.headers().contains_key("access-control-allow-origin"));
}
