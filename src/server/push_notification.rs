//! Push-notification configuration storage.
//!
//! Only the configuration is kept here. Delivering notifications to the
//! registered webhooks is left to the host.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{A2AError, A2AResult};
use crate::types::PushNotificationConfig;

/// Storage for per-task push-notification configs.
#[async_trait]
pub trait PushNotificationStore: Send + Sync {
    /// Register (or replace) the config for a task.
    async fn set(&self, task_id: &str, config: PushNotificationConfig) -> A2AResult<()>;

    /// Fetch the config for a task, if one is registered.
    async fn get(&self, task_id: &str) -> A2AResult<Option<PushNotificationConfig>>;

    /// Drop the config for a task.
    async fn remove(&self, task_id: &str) -> A2AResult<()>;
}

/// Process-local [`PushNotificationStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryPushNotificationStore {
    configs: Arc<RwLock<HashMap<String, PushNotificationConfig>>>,
}

impl InMemoryPushNotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reject configs whose URL is not an absolute http(s) URL.
pub fn validate_push_config(config: &PushNotificationConfig) -> A2AResult<()> {
    if config.url.starts_with("http://") || config.url.starts_with("https://") {
        Ok(())
    } else {
        Err(A2AError::invalid_params(format!(
            "push notification url must be http(s): {}",
            config.url
        )))
    }
}

#[async_trait]
impl PushNotificationStore for InMemoryPushNotificationStore {
    async fn set(&self, task_id: &str, config: PushNotificationConfig) -> A2AResult<()> {
        validate_push_config(&config)?;
        let mut configs = self.configs.write().await;
        let replaced = configs.insert(task_id.to_string(), config).is_some();
        debug!(task_id = %task_id, replaced = replaced, "Push notification config stored");
        Ok(())
    }

    async fn get(&self, task_id: &str) -> A2AResult<Option<PushNotificationConfig>> {
        Ok(self.configs.read().await.get(task_id).cloned())
    }

    async fn remove(&self, task_id: &str) -> A2AResult<()> {
        self.configs.write().await.remove(task_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> PushNotificationConfig {
        PushNotificationConfig {
            url: url.to_string(),
            token: Some("tok".to_string()),
            authentication: None,
        }
    }

    #[tokio::test]
    async fn set_get_remove() {
        let store = InMemoryPushNotificationStore::new();
        assert!(store.get("t1").await.unwrap().is_none());

        store.set("t1", config("https://hooks.example.com/a")).await.unwrap();
        let stored = store.get("t1").await.unwrap().unwrap();
        assert_eq!(stored.token.as_deref(), Some("tok"));

        store.remove("t1").await.unwrap();
        assert!(store.get("t1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_non_http_url() {
        let store = InMemoryPushNotificationStore::new();
        let err = store.set("t1", config("ftp://example.com")).await.unwrap_err();
        assert!(matches!(err, A2AError::InvalidParams { .. }));
    }
}
