use protocol::Message;

/// Identifies one send. Chunks carrying any other token are stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

/// Why a send could not start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("message is empty")]
    EmptyInput,
    #[error("a reply is still streaming")]
    Busy,
}

/// What the caller needs to issue the relay request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub token: RequestToken,
    /// Conversation up to and including the new user turn. The assistant
    /// placeholder is not part of it.
    pub history: Vec<Message>,
}

/// Ordered conversation plus the single in-flight send, if any.
///
/// All mutation goes through the methods below; the last entry is only ever
/// replaced, never edited in place.
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    in_flight: Option<RequestToken>,
    next_token: u64,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an assistant greeting already on screen.
    #[must_use]
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let mut conversation = Self::new();
        conversation.append_message(Message::assistant(greeting));
        conversation
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    #[must_use]
    pub fn is_sending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Replace the last entry with a copy whose content has `text` appended.
    pub fn append_to_last(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.messages.pop() {
            let content = last.content + text;
            self.messages.push(Message { content, ..last });
        }
    }

    /// Append the user turn and an empty assistant placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::EmptyInput`] for empty or whitespace-only input
    /// and [`SendError::Busy`] while another send is in flight. Neither case
    /// changes the conversation.
    pub fn begin_send(&mut self, input: &str) -> Result<PendingSend, SendError> {
        if input.trim().is_empty() {
            return Err(SendError::EmptyInput);
        }
        if self.in_flight.is_some() {
            return Err(SendError::Busy);
        }

        self.messages.push(Message::user(input));
        let history = self.messages.clone();
        self.messages.push(Message::assistant(""));

        let token = RequestToken(self.next_token);
        self.next_token += 1;
        self.in_flight = Some(token);

        Ok(PendingSend { token, history })
    }

    /// Apply a decoded chunk if it belongs to the in-flight send.
    ///
    /// Returns `false` when the chunk was discarded as stale.
    pub fn apply_chunk(&mut self, token: RequestToken, text: &str) -> bool {
        if self.in_flight != Some(token) {
            return false;
        }
        self.append_to_last(text);
        true
    }

    /// Mark the send as finished. Returns `false` for a stale token.
    pub fn finish_send(&mut self, token: RequestToken) -> bool {
        if self.in_flight != Some(token) {
            return false;
        }
        self.in_flight = None;
        true
    }

    /// Give up on the in-flight send without waiting for its stream.
    ///
    /// Chunks that still arrive for it will be discarded by
    /// [`Conversation::apply_chunk`].
    pub fn abandon_send(&mut self) -> Option<RequestToken> {
        self.in_flight.take()
    }
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
