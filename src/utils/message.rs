//! Utility functions for creating and handling A2A Message objects.

use crate::error::{A2AError, A2AResult};
use crate::types::{Message, Part, Role};
use crate::utils::parts::get_text_parts;

/// Creates a new agent message containing a single text Part.
///
/// # Example
///
/// ```
/// use a2a_min::utils::new_agent_text_message;
///
/// let message = new_agent_text_message("Hello, I'm an agent");
/// assert_eq!(message.role, a2a_min::types::Role::Agent);
/// ```
pub fn new_agent_text_message(text: impl Into<String>) -> Message {
    Message::agent(text)
}

/// Creates a new agent message containing a list of Parts.
pub fn new_agent_parts_message(parts: Vec<Part>) -> Message {
    Message {
        role: Role::Agent,
        parts,
        metadata: None,
    }
}

/// Creates a new user message containing a single text Part.
pub fn new_user_text_message(text: impl Into<String>) -> Message {
    Message::user(text)
}

/// Extracts and joins all text content from a Message's parts.
///
/// Returns an empty string if there are no text parts.
///
/// # Example
///
/// ```
/// use a2a_min::types::{Message, Part, Role};
/// use a2a_min::utils::get_message_text;
///
/// let message = Message {
///     role: Role::User,
///     parts: vec![Part::text("line one"), Part::text("line two")],
///     metadata: None,
/// };
/// assert_eq!(get_message_text(&message, "\n"), "line one\nline two");
/// ```
pub fn get_message_text(message: &Message, delimiter: &str) -> String {
    get_text_parts(&message.parts).join(delimiter)
}

/// Rejects messages that carry no parts.
pub fn validate_message(message: &Message) -> A2AResult<()> {
    if message.parts.is_empty() {
        return Err(A2AError::invalid_params("Message parts cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_agent_parts_message() {
        let message = new_agent_parts_message(vec![Part::text("a"), Part::text("b")]);
        assert_eq!(message.role, Role::Agent);
        assert_eq!(message.parts.len(), 2);
    }

    #[test]
    fn test_get_message_text_without_text_parts() {
        let message = new_agent_parts_message(vec![Part::data(serde_json::json!({}))]);
        assert_eq!(get_message_text(&message, "\n"), "");
    }

    #[test]
    fn test_validate_message() {
        assert!(validate_message(&new_user_text_message("hi")).is_ok());

        let empty = new_agent_parts_message(vec![]);
        let err = validate_message(&empty).unwrap_err();
        assert!(matches!(err, A2AError::InvalidParams { .. }));
    }
}
