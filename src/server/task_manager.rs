//! Task manager — owns every in-flight task and drives it against the agent.
//!
//! A submission either creates a task or continues one that is waiting in
//! `input-required`. Each run is a spawned driver that pulls updates from
//! the adapter, folds them into the task under its entry lock, and forwards
//! them to the subscriber. Unary callers are subscribers that wait for the
//! final update and then read the task back.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::{A2AError, A2AResult};
use crate::state;
use crate::types::{
    AgentCapabilities, Task, TaskPushNotificationConfig, TaskSendParams, TaskState, TaskStatus,
    TaskStatusUpdateEvent, TaskUpdateEvent,
};
use crate::utils::{apply_history_length, get_message_text, validate_message};

use super::adapter::{adapt_result, adapt_stream, UpdateStream};
use super::agent::Agent;
use super::push_notification::{validate_push_config, PushNotificationStore};
use super::task_registry::{RunGuard, TaskEntry, TaskRegistry};

/// Tuning knobs for [`TaskManager`].
#[derive(Debug, Clone)]
pub struct TaskManagerConfig {
    /// Deadline for unary submissions. `None` waits indefinitely.
    pub unary_timeout: Option<Duration>,

    /// Buffered updates per subscriber before the driver waits.
    pub stream_capacity: usize,

    /// How long the agent is given to end its stream after the final update.
    pub drain_timeout: Duration,
}

impl Default for TaskManagerConfig {
    fn default() -> Self {
        Self {
            unary_timeout: Some(Duration::from_secs(60)),
            stream_capacity: 64,
            drain_timeout: Duration::from_secs(5),
        }
    }
}

/// The update sequence of one run.
///
/// The final update is followed by at most one trailing
/// [`A2AError::ProtocolViolation`], reported when the agent kept producing
/// output. The sequence ends once the run has released the task, so a
/// continuation submitted after `None` never races the previous run.
///
/// Implements [`Stream`]; [`UpdateReceiver::recv`] is the pull-style
/// equivalent.
#[derive(Debug)]
pub struct UpdateReceiver {
    task_id: String,
    receiver: mpsc::Receiver<A2AResult<TaskUpdateEvent>>,
    final_seen: bool,
    done: bool,
}

impl UpdateReceiver {
    fn new(task_id: String, receiver: mpsc::Receiver<A2AResult<TaskUpdateEvent>>) -> Self {
        Self {
            task_id,
            receiver,
            final_seen: false,
            done: false,
        }
    }

    /// The task these updates belong to.
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Next update, or `None` once the sequence is over.
    pub async fn recv(&mut self) -> Option<A2AResult<TaskUpdateEvent>> {
        self.next().await
    }
}

impl Stream for UpdateReceiver {
    type Item = A2AResult<TaskUpdateEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }
        match self.receiver.poll_recv(cx) {
            Poll::Ready(Some(item)) => {
                if self.final_seen {
                    self.done = true;
                } else if matches!(&item, Ok(update) if update.is_final()) {
                    self.final_seen = true;
                }
                Poll::Ready(Some(item))
            }
            Poll::Ready(None) => {
                self.done = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Owns tasks and runs them against an [`Agent`].
///
/// # Example
///
/// ```
/// # use a2a_min::server::{Agent, AgentInvocationResult, TaskManager, TaskManagerConfig};
/// # use a2a_min::types::{Message, TaskSendParams, TaskState};
/// # use a2a_min::A2AResult;
/// # use std::sync::Arc;
/// # struct Echo;
/// # #[async_trait::async_trait]
/// # impl Agent for Echo {
/// #     async fn invoke(&self, query: &str, _: &str) -> A2AResult<AgentInvocationResult> {
/// #         Ok(AgentInvocationResult::agent_msg(query, true, false))
/// #     }
/// # }
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> A2AResult<()> {
/// let manager = TaskManager::new(Arc::new(Echo), TaskManagerConfig::default());
/// let task = manager.submit(TaskSendParams::new("t1", Message::user("Hello"))).await?;
/// assert_eq!(task.status.state, TaskState::Completed);
/// # Ok(())
/// # }
/// ```
pub struct TaskManager {
    agent: Arc<dyn Agent>,
    capabilities: AgentCapabilities,
    config: TaskManagerConfig,
    registry: TaskRegistry,
    push_store: Option<Arc<dyn PushNotificationStore>>,
}

impl std::fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskManager")
            .field("agent", &self.agent.name())
            .field("capabilities", &self.capabilities)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TaskManager {
    /// Create a manager for `agent`. Capabilities are read once, here.
    pub fn new(agent: Arc<dyn Agent>, config: TaskManagerConfig) -> Self {
        let capabilities = agent.capabilities();
        debug!(
            agent = %agent.name(),
            streaming = capabilities.streaming,
            "TaskManager initialized"
        );
        Self {
            agent,
            capabilities,
            config,
            registry: TaskRegistry::new(),
            push_store: None,
        }
    }

    /// Enable push-notification configs backed by `store` (builder-style).
    pub fn with_push_store(mut self, store: Arc<dyn PushNotificationStore>) -> Self {
        self.push_store = Some(store);
        self
    }

    /// The agent's declared capabilities.
    pub fn capabilities(&self) -> AgentCapabilities {
        AgentCapabilities {
            push_notifications: self.push_store.is_some(),
            ..self.capabilities
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &TaskManagerConfig {
        &self.config
    }

    /// Submit a task and wait for it to finish or ask for input.
    ///
    /// Waits at most `config.unary_timeout`.
    pub async fn submit(&self, params: TaskSendParams) -> A2AResult<Task> {
        self.run_unary(params, self.config.unary_timeout).await
    }

    /// Like [`TaskManager::submit`] with an explicit deadline.
    ///
    /// On expiry the caller gets [`A2AError::Timeout`]; the run carries on
    /// and its outcome is visible through [`TaskManager::get`].
    pub async fn submit_with_timeout(
        &self,
        params: TaskSendParams,
        deadline: Duration,
    ) -> A2AResult<Task> {
        self.run_unary(params, Some(deadline)).await
    }

    /// Submit a task and receive its updates as they happen.
    pub async fn subscribe(&self, params: TaskSendParams) -> A2AResult<UpdateReceiver> {
        let (_, updates) = self.start(params).await?;
        Ok(updates)
    }

    /// Read a task, keeping at most `history_length` history messages.
    pub async fn get(&self, task_id: &str, history_length: Option<usize>) -> A2AResult<Task> {
        let entry = self.entry(task_id).await?;
        Ok(apply_history_length(entry.snapshot().await, history_length))
    }

    /// Cancel a task that has not reached a terminal state.
    ///
    /// A running driver notices at its next suspension point, sends a final
    /// `canceled` update and stops pulling the agent.
    pub async fn cancel(&self, task_id: &str) -> A2AResult<Task> {
        let entry = self.entry(task_id).await?;
        let mut task = entry.lock().await;
        if task.status.state.is_terminal() {
            warn!(task_id = %task_id, state = %task.status.state, "Cancel rejected");
            return Err(A2AError::task_not_cancelable(format!(
                "task {} is already {}",
                task_id, task.status.state
            )));
        }
        state::apply_status(&mut task, TaskStatus::new(TaskState::Canceled))?;
        entry.request_cancel();
        info!(task_id = %task_id, "Task canceled");
        Ok(task.clone())
    }

    /// Register the push-notification config of an existing task.
    pub async fn set_push_config(
        &self,
        config: TaskPushNotificationConfig,
    ) -> A2AResult<TaskPushNotificationConfig> {
        let store = self.push_store()?;
        self.entry(&config.id).await?;
        store
            .set(&config.id, config.push_notification_config.clone())
            .await?;
        debug!(task_id = %config.id, url = %config.push_notification_config.url, "Push config set");
        Ok(config)
    }

    /// Read back the push-notification config of an existing task.
    pub async fn get_push_config(
        &self,
        task_id: &str,
    ) -> A2AResult<Option<TaskPushNotificationConfig>> {
        let store = self.push_store()?;
        self.entry(task_id).await?;
        Ok(store
            .get(task_id)
            .await?
            .map(|push_notification_config| TaskPushNotificationConfig {
                id: task_id.to_string(),
                push_notification_config,
            }))
    }

    /// Drop a finished task from memory.
    pub async fn evict(&self, task_id: &str) -> A2AResult<Task> {
        let entry = self.entry(task_id).await?;
        let task = entry.snapshot().await;
        if !task.status.state.is_terminal() {
            return Err(A2AError::invalid_params(format!(
                "task {} is still {}",
                task_id, task.status.state
            )));
        }
        self.registry.remove(task_id).await;
        if let Some(store) = &self.push_store {
            store.remove(task_id).await?;
        }
        debug!(task_id = %task_id, "Task evicted");
        Ok(task)
    }

    /// Number of tasks currently held.
    pub async fn task_count(&self) -> usize {
        self.registry.len().await
    }

    async fn entry(&self, task_id: &str) -> A2AResult<Arc<TaskEntry>> {
        self.registry
            .get(task_id)
            .await
            .ok_or_else(|| A2AError::task_not_found(task_id))
    }

    fn push_store(&self) -> A2AResult<&Arc<dyn PushNotificationStore>> {
        self.push_store.as_ref().ok_or_else(|| {
            A2AError::push_notification_not_supported("no push notification store configured")
        })
    }

    async fn run_unary(
        &self,
        params: TaskSendParams,
        deadline: Option<Duration>,
    ) -> A2AResult<Task> {
        let history_length = params.history_length;
        let (entry, mut updates) = self.start(params).await?;
        let wait = async { while updates.recv().await.is_some() {} };

        match deadline {
            Some(deadline) => {
                if tokio::time::timeout(deadline, wait).await.is_err() {
                    warn!(task_id = %entry.id(), ?deadline, "Unary submission timed out");
                    return Err(A2AError::Timeout(format!(
                        "task {} did not finish within {:?}",
                        entry.id(),
                        deadline
                    )));
                }
            }
            None => wait.await,
        }

        Ok(apply_history_length(entry.snapshot().await, history_length))
    }

    /// Validate, claim the run slot and spawn the driver.
    async fn start(&self, params: TaskSendParams) -> A2AResult<(Arc<TaskEntry>, UpdateReceiver)> {
        validate_message(&params.message)?;
        if let Some(config) = &params.push_notification {
            self.push_store()?;
            validate_push_config(config)?;
        }

        let TaskSendParams {
            id,
            session_id,
            message,
            push_notification,
            metadata,
            ..
        } = params;
        let query = get_message_text(&message, "\n");

        let mut task = Task::submitted(id.clone(), session_id.clone(), message.clone());
        task.metadata = metadata;
        let guard = match self.registry.insert_new(task).await {
            Ok(guard) => {
                info!(task_id = %id, "Task created");
                guard
            }
            Err(existing) => continue_task(existing, message).await?,
        };
        let entry = Arc::clone(guard.entry());

        let session_id = match session_id {
            Some(session_id) => session_id,
            None => entry
                .lock()
                .await
                .session_id
                .clone()
                .unwrap_or_else(|| id.clone()),
        };

        if let (Some(store), Some(config)) = (&self.push_store, push_notification) {
            store.set(&id, config).await?;
        }

        let (tx, rx) = mpsc::channel(self.config.stream_capacity.max(1));
        let driver = Driver {
            slot: Some(guard),
            agent: Arc::clone(&self.agent),
            streaming: self.capabilities.streaming,
            query,
            session_id,
            tx,
            drain_timeout: self.config.drain_timeout,
        };
        tokio::spawn(driver.run());

        Ok((entry, UpdateReceiver::new(id, rx)))
    }
}

/// Claim an existing task for another run.
async fn continue_task(
    entry: Arc<TaskEntry>,
    message: crate::types::Message,
) -> A2AResult<RunGuard> {
    let duplicate = || {
        warn!(task_id = %entry.id(), "Submission rejected: task is active");
        A2AError::duplicate_active_task(format!("task {} is already being processed", entry.id()))
    };

    let guard = entry.try_claim().ok_or_else(duplicate)?;
    let mut task = entry.lock().await;
    match task.status.state {
        TaskState::InputRequired => {
            task.history.push(message);
            state::apply_status(&mut task, TaskStatus::new(TaskState::Working))?;
            info!(task_id = %entry.id(), "Task continued with new input");
        }
        TaskState::Submitted | TaskState::Working => return Err(duplicate()),
        terminal => {
            warn!(task_id = %entry.id(), state = %terminal, "Submission rejected: task is finished");
            return Err(A2AError::invalid_transition(format!(
                "task {} is {} and accepts no further messages",
                entry.id(),
                terminal
            )));
        }
    }
    drop(task);
    Ok(guard)
}

/// One run of a task against the agent.
struct Driver {
    slot: Option<RunGuard>,
    agent: Arc<dyn Agent>,
    streaming: bool,
    query: String,
    session_id: String,
    tx: mpsc::Sender<A2AResult<TaskUpdateEvent>>,
    drain_timeout: Duration,
}

impl Driver {
    async fn run(mut self) {
        let Some(entry) = self.slot.as_ref().map(|slot| Arc::clone(slot.entry())) else {
            return;
        };
        let task_id = entry.id().to_string();

        {
            let mut task = entry.lock().await;
            if task.status.state == TaskState::Submitted {
                if let Err(e) = state::apply_status(&mut task, TaskStatus::new(TaskState::Working)) {
                    warn!(task_id = %task_id, error = %e, "Could not start task");
                }
            }
        }
        if entry.cancel_requested() {
            self.finish_canceled(&entry).await;
            return;
        }

        debug!(task_id = %task_id, streaming = self.streaming, "Driver started");
        let agent = Arc::clone(&self.agent);
        let query = std::mem::take(&mut self.query);
        let session_id = std::mem::take(&mut self.session_id);
        let mut updates: UpdateStream<'_> = if self.streaming {
            adapt_stream(task_id.clone(), agent.stream(&query, &session_id))
        } else {
            Box::pin(stream::once(async {
                Ok(adapt_result(&task_id, agent.invoke(&query, &session_id).await))
            }))
        };

        let mut emitted_final = false;
        loop {
            let item = tokio::select! {
                biased;
                _ = entry.cancelled() => {
                    self.finish_canceled(&entry).await;
                    break;
                }
                item = updates.next() => item,
            };

            let update = match item {
                Some(Ok(update)) => update,
                Some(Err(e)) => {
                    warn!(task_id = %task_id, error = %e, "Adapter error before final update");
                    break;
                }
                None => break,
            };

            let is_final = update.is_final();
            let applied = {
                let mut task = entry.lock().await;
                apply_update(&mut task, &update)
            };
            if let Err(e) = applied {
                if entry.cancel_requested() {
                    self.finish_canceled(&entry).await;
                } else {
                    warn!(task_id = %task_id, error = %e, "Update rejected; ending run");
                }
                break;
            }

            if is_final {
                log_outcome(&task_id, &update);
                emitted_final = true;
            }
            let _ = self.tx.send(Ok(update)).await;
            if is_final {
                break;
            }
        }

        // The agent stream stays alive until drained, so the slot is held
        // until then.
        if emitted_final {
            match tokio::time::timeout(self.drain_timeout, updates.next()).await {
                Ok(Some(Err(e))) => {
                    warn!(task_id = %task_id, error = %e, "Agent output after final update discarded");
                    let _ = self.tx.send(Err(e)).await;
                }
                Ok(_) => {}
                Err(_) => warn!(task_id = %task_id, "Agent stream did not end after final update"),
            }
        }
        drop(updates);

        self.slot.take();
        drop(self);
        debug!(task_id = %task_id, "Driver finished");
    }

    /// Send the final `canceled` update.
    async fn finish_canceled(&self, entry: &TaskEntry) {
        let status = entry.lock().await.status.clone();
        info!(task_id = %entry.id(), "Run stopped by cancellation");
        let update = TaskStatusUpdateEvent::new(entry.id(), status, true);
        let _ = self.tx.send(Ok(TaskUpdateEvent::Status(update))).await;
    }
}

fn apply_update(task: &mut Task, update: &TaskUpdateEvent) -> A2AResult<()> {
    match update {
        TaskUpdateEvent::Status(event) => state::apply_status(task, event.status.clone()),
        TaskUpdateEvent::Artifact(event) => state::apply_artifact(task, event.artifact.clone()),
    }
}

fn log_outcome(task_id: &str, update: &TaskUpdateEvent) {
    match update.status().map(|status| status.state) {
        Some(TaskState::Failed) => error!(task_id = %task_id, "Task failed"),
        Some(state) => info!(task_id = %task_id, state = %state, "Task run finished"),
        None => debug!(task_id = %task_id, "Final update without status"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::agent::AgentInvocationResult;
    use crate::types::Message;
    use async_trait::async_trait;

    struct Upper;

    #[async_trait]
    impl Agent for Upper {
        async fn invoke(&self, query: &str, _session_id: &str) -> A2AResult<AgentInvocationResult> {
            Ok(AgentInvocationResult::agent_msg(query.to_uppercase(), true, false))
        }
    }

    fn manager() -> TaskManager {
        TaskManager::new(Arc::new(Upper), TaskManagerConfig::default())
    }

    #[tokio::test]
    async fn query_joins_text_parts_with_newline() {
        let message = Message {
            role: crate::types::Role::User,
            parts: vec![
                crate::types::Part::text("a"),
                crate::types::Part::data(serde_json::json!({})),
                crate::types::Part::text("b"),
            ],
            metadata: None,
        };
        let task = manager()
            .submit(TaskSendParams::new("t1", message))
            .await
            .unwrap();
        assert_eq!(task.history.last().unwrap(), &Message::agent("A\nB"));
    }

    #[tokio::test]
    async fn empty_message_is_rejected_without_creating_a_task() {
        let manager = manager();
        let message = Message {
            role: crate::types::Role::User,
            parts: vec![],
            metadata: None,
        };
        let err = manager
            .submit(TaskSendParams::new("t1", message))
            .await
            .unwrap_err();
        assert!(matches!(err, A2AError::InvalidParams { .. }));
        assert_eq!(manager.task_count().await, 0);
    }

    #[tokio::test]
    async fn update_receiver_stops_after_final() {
        let manager = manager();
        let mut updates = manager
            .subscribe(TaskSendParams::new("t1", Message::user("x")))
            .await
            .unwrap();
        assert_eq!(updates.task_id(), "t1");
        let first = updates.recv().await.unwrap().unwrap();
        assert!(first.is_final());
        assert!(updates.recv().await.is_none());
    }
}
