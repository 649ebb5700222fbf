//! JSON-RPC method names and well-known paths.

/// Submit a task and wait for its result.
pub const METHOD_TASKS_SEND: &str = "tasks/send";

/// Submit a task and stream its updates over SSE.
pub const METHOD_TASKS_SEND_SUBSCRIBE: &str = "tasks/sendSubscribe";

/// Fetch a task snapshot.
pub const METHOD_TASKS_GET: &str = "tasks/get";

/// Cancel a task.
pub const METHOD_TASKS_CANCEL: &str = "tasks/cancel";

/// Register a push-notification config for a task.
pub const METHOD_PUSH_NOTIFICATION_SET: &str = "tasks/pushNotification/set";

/// Read back a task's push-notification config.
pub const METHOD_PUSH_NOTIFICATION_GET: &str = "tasks/pushNotification/get";

/// The default RPC URL path
pub const DEFAULT_RPC_URL: &str = "/";

/// Content type of streaming responses.
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_method_names() {
        assert_eq!(METHOD_TASKS_SEND_SUBSCRIBE, "tasks/sendSubscribe");
        assert!(METHOD_PUSH_NOTIFICATION_SET.starts_with("tasks/"));
        assert!(METHOD_PUSH_NOTIFICATION_GET.starts_with("tasks/"));
    }
}
