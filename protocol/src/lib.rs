//! Shared chat model for the relay endpoint and its clients.
//!
//! This crate owns the request body shape used by both `support-relay` and
//! `chat`: a JSON array of `{role, content}` objects in conversation order.
//! The response side has no framing at all (raw UTF-8 bytes), so nothing
//! about it lives here beyond the endpoint path.

use serde::{Deserialize, Serialize};

/// HTTP path of the relay endpoint.
pub const CHAT_PATH: &str = "/api/chat";

/// Error returned by [`validate_conversation`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversationError {
    /// The request carried no messages at all.
    #[error("conversation is empty")]
    Empty,
    /// A client tried to supply its own system instruction.
    #[error("message {index} has role `system`; only the relay may add one")]
    SystemMessage { index: usize },
}

/// Author of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instruction text prepended by the relay. Never shown to users.
    System,
    /// Text typed by the person using the widget.
    User,
    /// Text generated by the provider.
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single conversation entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Check a client-supplied conversation before it is forwarded upstream.
///
/// # Errors
///
/// Returns [`ConversationError::Empty`] for an empty slice and
/// [`ConversationError::SystemMessage`] for the first `system` entry found.
pub fn validate_conversation(messages: &[Message]) -> Result<(), ConversationError> {
    if messages.is_empty() {
        return Err(ConversationError::Empty);
    }
    if let Some(index) = messages.iter().position(|m| m.role == Role::System) {
        return Err(ConversationError::SystemMessage { index });
    }
    Ok(())
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
