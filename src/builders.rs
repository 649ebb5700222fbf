//! Builders for configuring a client or a server in one expression.

#[cfg(feature = "client")]
use std::collections::HashMap;
#[cfg(any(feature = "client", feature = "server"))]
use std::time::Duration;

/// Builder for an [`A2AClient`](crate::client::A2AClient) with custom
/// transport settings.
///
/// # Example
///
/// ```no_run
/// use a2a_min::builders::ClientBuilder;
/// use std::time::Duration;
///
/// let client = ClientBuilder::new("http://localhost:8000/")
///     .with_timeout(Duration::from_secs(30))
///     .with_bearer_token("secret")
///     .build();
/// ```
#[cfg(feature = "client")]
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    url: String,
    timeout: Option<Duration>,
    headers: HashMap<String, String>,
}

#[cfg(feature = "client")]
impl ClientBuilder {
    /// Create a builder for the JSON-RPC endpoint at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: None,
            headers: HashMap::new(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a custom HTTP header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add an Authorization header with a bearer token.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", token.into()),
        );
        self
    }

    /// Add an API key header.
    pub fn with_api_key(
        mut self,
        header_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        self.headers.insert(header_name.into(), api_key.into());
        self
    }

    /// The transport configuration this builder produces.
    pub fn transport_config(&self) -> crate::client::TransportConfig {
        let mut config = crate::client::TransportConfig::default();
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        config.headers = self.headers.clone();
        config
    }

    /// Build the client.
    pub fn build(self) -> crate::client::A2AClient {
        use crate::client::{A2AClient, JsonRpcTransport};

        let config = self.transport_config();
        let transport = JsonRpcTransport::with_config(self.url, config);
        A2AClient::with_transport(Box::new(transport))
    }
}

/// Builder for an axum [`Router`](axum::Router) serving one agent.
///
/// # Example
///
/// ```rust,no_run
/// use a2a_min::builders::ServerBuilder;
/// use a2a_min::server::{Agent, AgentInvocationResult, InMemoryPushNotificationStore, LoggingMiddleware};
/// use a2a_min::A2AResult;
/// use std::sync::Arc;
///
/// struct Echo;
///
/// #[async_trait::async_trait]
/// impl Agent for Echo {
///     async fn invoke(&self, query: &str, _: &str) -> A2AResult<AgentInvocationResult> {
///         Ok(AgentInvocationResult::agent_msg(query, true, false))
///     }
/// }
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let app = ServerBuilder::new(Arc::new(Echo))
///     .with_push_store(Arc::new(InMemoryPushNotificationStore::new()))
///     .with_middleware(Arc::new(LoggingMiddleware))
///     .with_cors(true)
///     .build();
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "server")]
pub struct ServerBuilder {
    agent: std::sync::Arc<dyn crate::server::Agent>,
    config: crate::server::TaskManagerConfig,
    push_store: Option<std::sync::Arc<dyn crate::server::PushNotificationStore>>,
    middleware: crate::server::MiddlewareChain,
    cors_enabled: bool,
}

#[cfg(feature = "server")]
impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("agent", &self.agent.name())
            .field("config", &self.config)
            .field("push_store", &self.push_store.is_some())
            .field("middleware", &self.middleware)
            .field("cors_enabled", &self.cors_enabled)
            .finish()
    }
}

#[cfg(feature = "server")]
impl ServerBuilder {
    /// Create a builder serving `agent`.
    pub fn new(agent: std::sync::Arc<dyn crate::server::Agent>) -> Self {
        Self {
            agent,
            config: crate::server::TaskManagerConfig::default(),
            push_store: None,
            middleware: crate::server::MiddlewareChain::new(),
            cors_enabled: false,
        }
    }

    /// Replace the task manager configuration.
    pub fn with_config(mut self, config: crate::server::TaskManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Deadline for `tasks/send`. `None` waits indefinitely.
    pub fn with_unary_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.unary_timeout = timeout;
        self
    }

    /// Enable push-notification configs, kept in `store`.
    pub fn with_push_store(
        mut self,
        store: std::sync::Arc<dyn crate::server::PushNotificationStore>,
    ) -> Self {
        self.push_store = Some(store);
        self
    }

    /// Append a middleware stage.
    pub fn with_middleware(mut self, stage: std::sync::Arc<dyn crate::server::Middleware>) -> Self {
        self.middleware.push(stage);
        self
    }

    /// Enable or disable a permissive CORS layer.
    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.cors_enabled = enabled;
        self
    }

    /// Build the JSON-RPC handler without an HTTP layer.
    pub fn build_handler(self) -> std::sync::Arc<crate::server::JsonRpcHandler> {
        self.into_parts().0
    }

    /// Build the axum router.
    pub fn build(self) -> axum::Router {
        use crate::server::a2a_router;

        let (handler, cors_enabled) = self.into_parts();
        let mut router = a2a_router(handler);

        if cors_enabled {
            use tower_http::cors::CorsLayer;
            router = router.layer(CorsLayer::permissive());
        }

        router
    }

    fn into_parts(self) -> (std::sync::Arc<crate::server::JsonRpcHandler>, bool) {
        use crate::server::{JsonRpcHandler, TaskManager};
        use std::sync::Arc;

        let mut manager = TaskManager::new(self.agent, self.config);
        if let Some(store) = self.push_store {
            manager = manager.with_push_store(store);
        }
        let handler = JsonRpcHandler::with_middleware(Arc::new(manager), self.middleware);
        (Arc::new(handler), self.cors_enabled)
    }
}
