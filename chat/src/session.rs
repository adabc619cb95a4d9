//! The send action: one user turn in, one streamed assistant reply out.

use futures_util::StreamExt;
use tracing::{debug, info, warn};

use crate::net::decode::Utf8StreamDecoder;
use crate::net::relay::RelayClient;
use crate::render::Render;
use crate::state::conversation::{Conversation, RequestToken, SendError};

/// How a started send ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The reply body ended cleanly.
    Completed { bytes: usize },
    /// The request failed or the body was cut off. Whatever text arrived
    /// before that stays in the conversation.
    Interrupted { reason: String },
}

pub struct ChatSession<R> {
    conversation: Conversation,
    relay: RelayClient,
    renderer: R,
    input: String,
}

impl<R: Render> ChatSession<R> {
    pub fn new(conversation: Conversation, relay: RelayClient, renderer: R) -> Self {
        Self { conversation, relay, renderer, input: String::new() }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Render the current conversation.
    pub fn redraw(&mut self) {
        if let Err(e) = self.renderer.render(&self.conversation) {
            warn!(error = %e, "render failed");
        }
    }

    /// Send the input buffer and stream the reply into the conversation.
    ///
    /// The input buffer is cleared up front. Transport failures do not make
    /// this return `Err`; they end the send early and are reported as
    /// [`SendOutcome::Interrupted`].
    ///
    /// # Errors
    ///
    /// Returns the [`SendError`] from the conversation when the send could
    /// not start. The conversation is unchanged in that case.
    pub async fn send(&mut self) -> Result<SendOutcome, SendError> {
        let input = std::mem::take(&mut self.input);
        let pending = match self.conversation.begin_send(&input) {
            Ok(pending) => pending,
            Err(e) => {
                if e == SendError::Busy {
                    self.input = input;
                }
                return Err(e);
            }
        };
        self.redraw();

        info!(endpoint = self.relay.endpoint(), turns = pending.history.len(), "sending message");
        let outcome = self.stream_reply(pending.token, &pending.history).await;
        self.conversation.finish_send(pending.token);
        self.redraw();

        match &outcome {
            SendOutcome::Completed { bytes } => info!(bytes, "reply complete"),
            SendOutcome::Interrupted { reason } => warn!(%reason, "reply interrupted"),
        }
        Ok(outcome)
    }

    /// Give up on a send whose future was dropped before it finished.
    ///
    /// The partial reply stays in the conversation and the next send can
    /// start. Returns `false` when nothing was in flight.
    pub fn cancel(&mut self) -> bool {
        let Some(token) = self.conversation.abandon_send() else {
            return false;
        };
        debug!(?token, "send abandoned");
        self.redraw();
        true
    }

    async fn stream_reply(&mut self, token: RequestToken, history: &[protocol::Message]) -> SendOutcome {
        let mut body = match self.relay.open(history).await {
            Ok(body) => body,
            Err(e) => return SendOutcome::Interrupted { reason: e.to_string() },
        };

        let mut decoder = Utf8StreamDecoder::new();
        let mut bytes = 0;
        while let Some(item) = body.next().await {
            let chunk = match item {
                Ok(chunk) => chunk,
                Err(e) => {
                    if decoder.pending_len() > 0 {
                        debug!(bytes = decoder.pending_len(), "dropping partial character");
                    }
                    return SendOutcome::Interrupted { reason: e.to_string() };
                }
            };
            bytes += chunk.len();

            let text = decoder.decode(&chunk);
            if !text.is_empty() && self.conversation.apply_chunk(token, &text) {
                self.redraw();
            }
        }

        let tail = decoder.finish();
        if !tail.is_empty() && self.conversation.apply_chunk(token, &tail) {
            self.redraw();
        }
        SendOutcome::Completed { bytes }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
