//! Utility functions for creating A2A Task objects.

use crate::error::A2AResult;
use crate::types::{Message, Task};
use crate::utils::message::validate_message;

/// Creates a new `submitted` Task whose history holds the initial message.
///
/// # Errors
///
/// Returns `InvalidParams` if the message has no parts.
///
/// # Example
///
/// ```
/// use a2a_min::types::{Message, TaskState};
/// use a2a_min::utils::new_task;
///
/// let task = new_task("task-1", None, Message::user("Hello")).unwrap();
/// assert_eq!(task.status.state, TaskState::Submitted);
/// assert_eq!(task.history.len(), 1);
/// ```
pub fn new_task(
    id: impl Into<String>,
    session_id: Option<String>,
    message: Message,
) -> A2AResult<Task> {
    validate_message(&message)?;
    Ok(Task::submitted(id, session_id, message))
}

/// Applies a history length limit to a task.
///
/// Keeps the most recent `history_length` messages. `None` or `Some(0)`
/// leaves the history untouched.
///
/// # Example
///
/// ```
/// use a2a_min::types::Message;
/// use a2a_min::utils::{apply_history_length, new_task};
///
/// let mut task = new_task("task-1", None, Message::user("first")).unwrap();
/// task.history.push(Message::agent("second"));
/// task.history.push(Message::user("third"));
///
/// let limited = apply_history_length(task, Some(2));
/// assert_eq!(limited.history.len(), 2);
/// assert_eq!(limited.history[1], Message::user("third"));
/// ```
pub fn apply_history_length(mut task: Task, history_length: Option<usize>) -> Task {
    if let Some(length) = history_length {
        let total = task.history.len();
        if length > 0 && total > length {
            task.history = task.history.split_off(total - length);
        }
    }
    task
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Role, TaskState};

    #[test]
    fn test_new_task_rejects_empty_message() {
        let message = Message {
            role: Role::User,
            parts: vec![],
            metadata: None,
        };
        assert!(new_task("t1", None, message).is_err());
    }

    #[test]
    fn test_new_task_keeps_session() {
        let task = new_task("t1", Some("s1".to_string()), Message::user("hi")).unwrap();
        assert_eq!(task.session_id.as_deref(), Some("s1"));
        assert_eq!(task.status.state, TaskState::Submitted);
    }

    #[test]
    fn test_apply_history_length() {
        let mut task = new_task("t1", None, Message::user("0")).unwrap();
        for i in 1..10 {
            task.history.push(Message::user(i.to_string()));
        }

        let limited = apply_history_length(task.clone(), Some(5));
        assert_eq!(limited.history.len(), 5);
        assert_eq!(limited.history[0], Message::user("5"));

        assert_eq!(apply_history_length(task.clone(), Some(0)).history.len(), 10);
        assert_eq!(apply_history_length(task.clone(), Some(50)).history.len(), 10);
        assert_eq!(apply_history_length(task, None).history.len(), 10);
    }
}
