//! Relay service: client conversation in, provider text out as body bytes.
//!
//! DESIGN
//! ======
//! The persona is prepended as a `system` message, the provider stream is
//! opened, and each non-empty text fragment is re-emitted as UTF-8 bytes the
//! moment it arrives. Opening the provider stream is awaited before any body
//! exists, so connect and status failures fail the whole request. After
//! that, a provider error ends the body with an error item, which the HTTP
//! layer turns into an aborted response.

use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use protocol::{ConversationError, Message, validate_conversation};
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm::types::{LlmError, TextStream};
use crate::state::AppState;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("LLM not configured")]
    LlmNotConfigured,
    #[error("invalid conversation: {0}")]
    InvalidConversation(#[from] ConversationError),
    #[error("provider request failed: {0}")]
    Provider(#[source] LlmError),
    #[error("provider stream failed: {0}")]
    Stream(#[source] LlmError),
}

/// Response body: encoded fragments in provider order.
pub type RelayBody = Pin<Box<dyn Stream<Item = Result<Bytes, RelayError>> + Send>>;

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Validate `conversation`, open the provider stream, and return the body.
///
/// # Errors
///
/// Returns [`RelayError::LlmNotConfigured`] without a provider,
/// [`RelayError::InvalidConversation`] for a rejected conversation, and
/// [`RelayError::Provider`] when the provider refuses the request.
pub async fn open_relay(state: &AppState, conversation: Vec<Message>) -> Result<RelayBody, RelayError> {
    let llm = state.llm.as_ref().ok_or(RelayError::LlmNotConfigured)?;
    validate_conversation(&conversation)?;

    let request_id = Uuid::new_v4();
    let turns = conversation.len();
    let messages = build_provider_messages(&state.persona, conversation);
    info!(%request_id, turns, "relay: opening provider stream");

    let upstream = llm.stream_chat(&messages).await.map_err(|e| {
        warn!(%request_id, error = %e, "relay: provider rejected request");
        RelayError::Provider(e)
    })?;

    Ok(forward(request_id, upstream))
}

/// `[persona] + conversation`, in that order.
#[must_use]
pub fn build_provider_messages(persona: &str, conversation: Vec<Message>) -> Vec<Message> {
    let mut messages = Vec::with_capacity(conversation.len() + 1);
    messages.push(Message::system(persona));
    messages.extend(conversation);
    messages
}

fn forward(request_id: Uuid, mut upstream: TextStream) -> RelayBody {
    Box::pin(async_stream::stream! {
        let mut chunks = 0usize;
        let mut bytes = 0usize;

        while let Some(item) = upstream.next().await {
            match item {
                Ok(text) if text.is_empty() => {}
                Ok(text) => {
                    chunks += 1;
                    bytes += text.len();
                    yield Ok(Bytes::from(text));
                }
                Err(e) => {
                    warn!(%request_id, chunks, bytes, error = %e, "relay: provider stream failed");
                    yield Err(RelayError::Stream(e));
                    return;
                }
            }
        }

        info!(%request_id, chunks, bytes, "relay: stream complete");
    })
}

#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;
