//! Transport layer for the A2A client.
//!
//! [`Transport`] abstracts how JSON-RPC requests reach an agent;
//! [`JsonRpcTransport`] is the HTTP binding: `POST` a JSON body, read back a
//! JSON-RPC response or, for `tasks/sendSubscribe`, an SSE body.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use tracing::{debug, warn};

use crate::error::{A2AError, A2AResult};
use crate::types::{JsonRpcRequest, JsonRpcResponse};
use crate::utils::EVENT_STREAM_CONTENT_TYPE;

use super::sse::SseStream;

/// Carries JSON-RPC requests to an agent.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for its response.
    async fn send(&self, request: &JsonRpcRequest) -> A2AResult<JsonRpcResponse>;

    /// Send a request whose response is an SSE stream of task updates.
    async fn send_stream(&self, request: &JsonRpcRequest) -> A2AResult<SseStream>;

    /// Release held resources. The default is a no-op.
    async fn close(&self) -> A2AResult<()> {
        Ok(())
    }
}

/// Configuration for [`JsonRpcTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Request timeout. Defaults to 60 seconds.
    ///
    /// For streaming requests this bounds the whole stream, so long-running
    /// subscriptions need a generous value.
    pub timeout: Duration,
    /// Additional HTTP headers sent with every request.
    pub headers: HashMap<String, String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            headers: HashMap::new(),
        }
    }
}

/// JSON-RPC over HTTP using `reqwest`.
///
/// # Example
///
/// ```no_run
/// use a2a_min::client::JsonRpcTransport;
/// use std::time::Duration;
///
/// let transport = JsonRpcTransport::new("http://localhost:8000/")
///     .with_timeout(Duration::from_secs(10))
///     .with_header("x-api-key", "secret");
/// ```
#[derive(Debug, Clone)]
pub struct JsonRpcTransport {
    client: reqwest::Client,
    url: String,
    config: TransportConfig,
}

impl JsonRpcTransport {
    /// Target `url` with the default configuration.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_config(url, TransportConfig::default())
    }

    /// Target `url` with a custom configuration.
    pub fn with_config(url: impl Into<String>, config: TransportConfig) -> Self {
        let client = build_client(&config);
        Self {
            client,
            url: url.into(),
            config,
        }
    }

    /// Use an existing `reqwest::Client`, e.g. to share a connection pool.
    /// Its own timeout and headers apply.
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            url: url.into(),
            config: TransportConfig::default(),
        }
    }

    /// The endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The active configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Replace the timeout, keeping other settings (builder-style).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        Self::with_config(self.url, self.config)
    }

    /// Add a header, keeping other settings (builder-style).
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.config
            .headers
            .insert(key.to_string(), value.to_string());
        Self::with_config(self.url, self.config)
    }

    async fn post(&self, request: &JsonRpcRequest, stream: bool) -> A2AResult<reqwest::Response> {
        let body = serde_json::to_vec(request).map_err(|e| {
            A2AError::Transport(format!("failed to serialize JSON-RPC request: {e}"))
        })?;

        let mut builder = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if stream {
            builder = builder.header(ACCEPT, EVENT_STREAM_CONTENT_TYPE);
        }

        debug!(method = %request.method, url = %self.url, "Sending JSON-RPC request");
        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Agent answered with HTTP error");
            return Err(A2AError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

fn build_client(config: &TransportConfig) -> reqwest::Client {
    let mut default_headers = HeaderMap::new();
    for (key, value) in &config.headers {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                default_headers.insert(name, value);
            }
            _ => warn!(header = %key, "Skipping invalid header"),
        }
    }

    reqwest::Client::builder()
        .timeout(config.timeout)
        .default_headers(default_headers)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

fn map_reqwest_error(e: reqwest::Error) -> A2AError {
    if e.is_timeout() {
        A2AError::Timeout(format!("request timed out: {e}"))
    } else if e.is_connect() {
        A2AError::Transport(format!("connection failed: {e}"))
    } else {
        A2AError::Transport(format!("HTTP request failed: {e}"))
    }
}

#[async_trait]
impl Transport for JsonRpcTransport {
    async fn send(&self, request: &JsonRpcRequest) -> A2AResult<JsonRpcResponse> {
        let response = self.post(request, false).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| A2AError::Transport(format!("failed to read response body: {e}")))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            A2AError::InvalidJson(format!("failed to parse JSON-RPC response: {e}"))
        })
    }

    async fn send_stream(&self, request: &JsonRpcRequest) -> A2AResult<SseStream> {
        let response = self.post(request, true).await?;

        // A unary error response is possible, e.g. an unknown task or an
        // agent without streaming.
        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with(EVENT_STREAM_CONTENT_TYPE))
            .unwrap_or(false);
        if !is_event_stream {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| A2AError::Transport(format!("failed to read response body: {e}")))?;
            let rpc: JsonRpcResponse = serde_json::from_slice(&bytes).map_err(|e| {
                A2AError::InvalidJson(format!("expected an event stream or JSON-RPC error: {e}"))
            })?;
            return Err(match rpc.error {
                Some(error) => A2AError::from_rpc(error),
                None => A2AError::InvalidJson("expected an event stream, got a JSON result".into()),
            });
        }

        Ok(SseStream::from_response(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods_keep_earlier_settings() {
        let transport = JsonRpcTransport::new("http://localhost:1/")
            .with_header("x-one", "1")
            .with_timeout(Duration::from_secs(3))
            .with_header("x-two", "2");

        let config = transport.config();
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.headers.get("x-one").map(String::as_str), Some("1"));
        assert_eq!(config.headers.get("x-two").map(String::as_str), Some("2"));
        assert_eq!(transport.url(), "http://localhost:1/");
    }
}
