//! Turns agent output into task update events.
//!
//! [`adapt_result`] covers agents that answer once, [`adapt_stream`] agents
//! that answer incrementally. Both are deterministic: the same agent output
//! always produces the same update sequence, timestamps aside.

use std::pin::Pin;

use futures::stream::{BoxStream, Stream, StreamExt};

use crate::error::{A2AError, A2AResult};
use crate::server::agent::AgentInvocationResult;
use crate::types::{
    Message, TaskArtifactUpdateEvent, TaskState, TaskStatus, TaskStatusUpdateEvent,
    TaskUpdateEvent,
};

/// An ordered sequence of task updates.
pub type UpdateStream<'a> = Pin<Box<dyn Stream<Item = A2AResult<TaskUpdateEvent>> + Send + 'a>>;

/// Map a single agent result onto the final update of a task.
///
/// - `Ok` with `requires_input` → `input-required`
/// - `Ok` otherwise → `completed`
/// - `Err` → `failed`, with the error text as the status message
///
/// The update is always marked final.
pub fn adapt_result(task_id: &str, result: A2AResult<AgentInvocationResult>) -> TaskUpdateEvent {
    match result {
        Ok(result) => terminal_update(task_id, result),
        Err(e) => failed_update(task_id, e.to_string()),
    }
}

/// Map an agent's incremental output onto an update sequence.
///
/// Items are pulled lazily and in order. Intermediate items become
/// `working` updates, or artifact updates when they carry an artifact. The
/// first complete item becomes the final update. The agent is then pulled
/// once more; anything it still yields is reported as a single
/// [`A2AError::ProtocolViolation`] and the rest is discarded.
pub fn adapt_stream<'a>(
    task_id: impl Into<String>,
    results: BoxStream<'a, A2AResult<AgentInvocationResult>>,
) -> UpdateStream<'a> {
    let task_id = task_id.into();
    Box::pin(async_stream::stream! {
        let mut results = results;
        loop {
            match results.next().await {
                None => {
                    yield Ok(failed_update(&task_id, "agent stream ended before completion".to_string()));
                    return;
                }
                Some(Err(e)) => {
                    yield Ok(failed_update(&task_id, e.to_string()));
                    return;
                }
                Some(Ok(result)) if !result.is_complete => {
                    yield Ok(intermediate_update(&task_id, result));
                }
                Some(Ok(mut result)) => {
                    if let Some(artifact) = result.artifact.take() {
                        yield Ok(TaskUpdateEvent::Artifact(TaskArtifactUpdateEvent::new(
                            task_id.as_str(),
                            artifact,
                            false,
                        )));
                    }
                    yield Ok(terminal_update(&task_id, result));
                    break;
                }
            }
        }

        if results.next().await.is_some() {
            yield Err(A2AError::protocol_violation(format!(
                "agent produced output for task {} after its final result",
                task_id
            )));
        }
    })
}

fn intermediate_update(task_id: &str, result: AgentInvocationResult) -> TaskUpdateEvent {
    match result.artifact {
        Some(artifact) => {
            let mut event = TaskArtifactUpdateEvent::new(task_id, artifact, false);
            event.metadata = result.metadata;
            TaskUpdateEvent::Artifact(event)
        }
        None => {
            let status = TaskStatus::with_message(TaskState::Working, result.message);
            let mut event = TaskStatusUpdateEvent::new(task_id, status, false);
            event.metadata = result.metadata;
            TaskUpdateEvent::Status(event)
        }
    }
}

fn terminal_update(task_id: &str, result: AgentInvocationResult) -> TaskUpdateEvent {
    let state = if result.requires_input {
        TaskState::InputRequired
    } else {
        TaskState::Completed
    };
    let mut event =
        TaskStatusUpdateEvent::new(task_id, TaskStatus::with_message(state, result.message), true);
    event.metadata = result.metadata;
    TaskUpdateEvent::Status(event)
}

fn failed_update(task_id: &str, reason: String) -> TaskUpdateEvent {
    let status = TaskStatus::with_message(TaskState::Failed, Message::agent(reason));
    TaskUpdateEvent::Status(TaskStatusUpdateEvent::new(task_id, status, true))
}
