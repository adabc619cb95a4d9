//! LLM types: provider-neutral stream type, trait, and errors.
//!
//! Messages themselves come from the shared `protocol` crate so the relay
//! forwards exactly what the client sent, plus the persona.

use std::pin::Pin;

use futures::Stream;
use protocol::Message;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the LLM provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The LLM provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// A streamed event payload could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The provider reported an error after streaming had started.
    #[error("provider stream error: {0}")]
    Stream(String),
}

// =============================================================================
// STREAM
// =============================================================================

/// Text fragments in provider order. Items are never empty strings when
/// produced by the bundled adapters.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// What a single provider event contributes to the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A non-empty text delta.
    Text(String),
    /// Keep-alive, role-only delta, or other event without text.
    Skip,
    /// Provider signalled end of the reply.
    Stop,
}

// =============================================================================
// LLM STREAM TRAIT
// =============================================================================

/// Provider-neutral async trait for streamed chat. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LlmStream: Send + Sync {
    /// Open a streamed completion for `messages` (system entries included).
    ///
    /// Resolves once the provider has accepted the request, so connection
    /// and status failures surface here rather than inside the stream.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request cannot be sent or the provider
    /// answers with a non-success status.
    async fn stream_chat(&self, messages: &[Message]) -> Result<TextStream, LlmError>;
}
