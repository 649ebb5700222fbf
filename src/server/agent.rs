//! Agent contract — the capability the task manager drives.
//!
//! An agent receives the query text of a task plus a session key and
//! answers either once ([`Agent::invoke`]) or incrementally
//! ([`Agent::stream`]). Which of the two the task manager uses is decided
//! up front from [`Agent::capabilities`].

use async_trait::async_trait;
use futures::stream::{self, BoxStream};

use crate::error::A2AResult;
use crate::types::{AgentCapabilities, Artifact, Message};

/// One result produced by an agent.
///
/// A result with `is_complete = false` is intermediate progress. A complete
/// result ends the agent's work on the task; with `requires_input = true`
/// the task pauses in `input-required` instead of completing.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentInvocationResult {
    /// Message to report to the caller.
    pub message: Message,

    /// Whether the agent is done with the current turn.
    pub is_complete: bool,

    /// Whether the agent needs more input from the caller.
    pub requires_input: bool,

    /// Arbitrary metadata, copied onto the emitted update.
    pub metadata: Option<serde_json::Value>,

    /// Artifact content carried by this result.
    pub artifact: Option<Artifact>,
}

impl AgentInvocationResult {
    /// A complete result carrying `message`.
    pub fn new(message: Message) -> Self {
        Self {
            message,
            is_complete: true,
            requires_input: false,
            metadata: None,
            artifact: None,
        }
    }

    /// Result with a single-text agent message and explicit flags.
    pub fn agent_msg(text: impl Into<String>, is_complete: bool, requires_input: bool) -> Self {
        Self {
            is_complete,
            requires_input,
            ..Self::new(Message::agent(text))
        }
    }

    /// Intermediate progress.
    pub fn progress(text: impl Into<String>) -> Self {
        Self::agent_msg(text, false, false)
    }

    /// Complete result that pauses the task until the caller answers.
    pub fn needs_input(text: impl Into<String>) -> Self {
        Self::agent_msg(text, true, true)
    }

    /// Attach artifact content (builder-style).
    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifact = Some(artifact);
        self
    }

    /// Attach metadata (builder-style).
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// An agent the task manager can run tasks against.
///
/// # Example
///
/// ```
/// use a2a_min::server::{Agent, AgentInvocationResult};
/// use a2a_min::A2AResult;
/// use async_trait::async_trait;
///
/// struct Echo;
///
/// #[async_trait]
/// impl Agent for Echo {
///     async fn invoke(&self, query: &str, _session_id: &str) -> A2AResult<AgentInvocationResult> {
///         Ok(AgentInvocationResult::agent_msg(format!("Echo: {}", query), true, false))
///     }
/// }
/// ```
#[async_trait]
pub trait Agent: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        "agent"
    }

    /// Declared capabilities. Agents that produce incremental output must
    /// report `streaming: true` to be driven through [`Agent::stream`].
    fn capabilities(&self) -> AgentCapabilities {
        AgentCapabilities::default()
    }

    /// Answer a query in one step.
    async fn invoke(&self, query: &str, session_id: &str) -> A2AResult<AgentInvocationResult>;

    /// Answer a query incrementally.
    ///
    /// Defaults to a single item holding the [`Agent::invoke`] result.
    fn stream<'a>(
        &'a self,
        query: &'a str,
        session_id: &'a str,
    ) -> BoxStream<'a, A2AResult<AgentInvocationResult>> {
        Box::pin(stream::once(self.invoke(query, session_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    struct Fixed;

    #[async_trait]
    impl Agent for Fixed {
        async fn invoke(&self, query: &str, session_id: &str) -> A2AResult<AgentInvocationResult> {
            Ok(AgentInvocationResult::agent_msg(
                format!("{}@{}", query, session_id),
                true,
                false,
            ))
        }
    }

    #[tokio::test]
    async fn default_stream_yields_invoke_result() {
        let agent = Fixed;
        let items: Vec<_> = agent.stream("q", "s").collect().await;
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].as_ref().unwrap().message,
            Message::agent("q@s")
        );
        assert!(!agent.capabilities().streaming);
    }

    #[test]
    fn result_constructors() {
        let progress = AgentInvocationResult::progress("step");
        assert!(!progress.is_complete);
        assert!(!progress.requires_input);

        let ask = AgentInvocationResult::needs_input("which one?");
        assert!(ask.is_complete);
        assert!(ask.requires_input);

        assert!(AgentInvocationResult::new(Message::agent("x")).is_complete);
    }
}
