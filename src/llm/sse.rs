//! Incremental `text/event-stream` decoding shared by the provider adapters.
//!
//! Network chunks carry no relation to event boundaries, so bytes are
//! buffered until a full line is available. Lines are only decoded as UTF-8
//! once complete, which keeps multi-byte characters intact when a chunk
//! splits them.

use bytes::Bytes;
use futures::{Stream, StreamExt};

use super::types::{LlmError, StreamEvent, TextStream};

/// One dispatched server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// Value of the last `event:` field, if any.
    pub event: Option<String>,
    /// All `data:` lines joined with `\n`.
    pub data: String,
}

/// Line-oriented SSE parser that can be fed arbitrary byte chunks.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every event it completes.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ApiParse`] if a complete line is not valid UTF-8.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>, LlmError> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8(line).map_err(|e| LlmError::ApiParse(format!("event line: {e}")))?;
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Flush whatever is left once the body has ended.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ApiParse`] if the unterminated tail is not UTF-8.
    pub fn finish(&mut self) -> Result<Option<SseEvent>, LlmError> {
        if !self.buffer.is_empty() {
            let rest = String::from_utf8(std::mem::take(&mut self.buffer))
                .map_err(|e| LlmError::ApiParse(format!("event line: {e}")))?;
            if let Some(event) = self.process_line(&rest) {
                return Ok(Some(event));
            }
        }
        Ok(self.dispatch())
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            // id, retry
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if self.data_lines.is_empty() {
            self.event = None;
            return None;
        }
        let data = self.data_lines.join("\n");
        self.data_lines.clear();
        Some(SseEvent { event: self.event.take(), data })
    }
}

/// Turn a provider response body into a stream of text fragments.
///
/// `parse` maps each event to text, nothing, or end of reply. The returned
/// stream ends after the first error it yields.
pub fn text_stream<S, E>(body: S, parse: fn(&SseEvent) -> Result<StreamEvent, LlmError>) -> TextStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut body = std::pin::pin!(body);
        let mut decoder = SseDecoder::new();

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(LlmError::Stream(e.to_string()));
                    return;
                }
            };
            let events = match decoder.push(&chunk) {
                Ok(events) => events,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            for event in events {
                match parse(&event) {
                    Ok(StreamEvent::Text(text)) => yield Ok(text),
                    Ok(StreamEvent::Skip) => {}
                    Ok(StreamEvent::Stop) => return,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        }

        match decoder.finish() {
            Ok(Some(event)) => match parse(&event) {
                Ok(StreamEvent::Text(text)) => yield Ok(text),
                Ok(StreamEvent::Skip | StreamEvent::Stop) => {}
                Err(e) => yield Err(e),
            },
            Ok(None) => {}
            Err(e) => yield Err(e),
        }
    })
}

#[cfg(test)]
#[path = "sse_test.rs"]
mod tests;
