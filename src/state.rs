//! Task state machine.
//!
//! Pure functions over [`Task`] values: which state changes are legal, and
//! how status and artifact updates fold into a task. Nothing here performs
//! I/O or takes locks; callers hold whatever lock guards the task.
//!
//! ```text
//! submitted      -> working | failed | canceled
//! working        -> working | input-required | completed | failed | canceled
//! input-required -> working | completed | failed | canceled
//! completed, failed, canceled: terminal
//! ```

use crate::error::{A2AError, A2AResult};
use crate::types::{Artifact, Task, TaskState, TaskStatus};

impl TaskState {
    /// Whether no further transitions are possible from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Canceled
        )
    }

    /// Whether `self -> next` is an edge of the state machine.
    ///
    /// `working -> working` is allowed and records intermediate progress.
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        use TaskState::*;
        match self {
            Submitted => matches!(next, Working | Failed | Canceled),
            Working => matches!(
                next,
                Working | InputRequired | Completed | Failed | Canceled
            ),
            InputRequired => matches!(next, Working | Completed | Failed | Canceled),
            Completed | Failed | Canceled => false,
        }
    }
}

/// Validate a single state change.
///
/// Returns `next` when the edge exists, `InvalidTransition` otherwise.
pub fn transition(current: TaskState, next: TaskState) -> A2AResult<TaskState> {
    if current.can_transition_to(next) {
        Ok(next)
    } else {
        Err(A2AError::InvalidTransition {
            message: format!("{} -> {}", current, next),
            data: Some(serde_json::json!({
                "from": current.to_string(),
                "to": next.to_string(),
            })),
        })
    }
}

/// Apply a status update to `task`.
///
/// The edge is checked before anything is written, so a rejected update
/// leaves the task untouched. On success the status is replaced and the
/// status message, if any, is appended to the history.
pub fn apply_status(task: &mut Task, status: TaskStatus) -> A2AResult<()> {
    transition(task.status.state, status.state)?;
    if let Some(message) = &status.message {
        task.history.push(message.clone());
    }
    task.status = status;
    Ok(())
}

/// Fold an artifact chunk into `task.artifacts`.
///
/// - `append` with an existing artifact at `index`: parts are extended and
///   `lastChunk` is taken from the chunk.
/// - existing `index` without `append`: the artifact is replaced.
/// - otherwise the artifact is pushed.
///
/// Terminal tasks reject artifacts. The list never shrinks.
pub fn apply_artifact(task: &mut Task, artifact: Artifact) -> A2AResult<()> {
    if task.status.state.is_terminal() {
        return Err(A2AError::invalid_transition(format!(
            "task {} is {}; artifacts are no longer accepted",
            task.id, task.status.state
        )));
    }

    let position = artifact.index as usize;
    match task.artifacts.get_mut(position) {
        Some(existing) if artifact.append.unwrap_or(false) => {
            existing.parts.extend(artifact.parts);
            existing.last_chunk = artifact.last_chunk;
            if artifact.metadata.is_some() {
                existing.metadata = artifact.metadata;
            }
        }
        Some(existing) => *existing = artifact,
        None => task.artifacts.push(artifact),
    }
    Ok(())
}
