//! OpenAI-compatible chat completions client, streaming mode only.
//!
//! Sends `stream: true` to `/chat/completions` and reads the reply as
//! server-sent events. Each event carries `choices[0].delta`; only
//! `delta.content` matters here. Pure parsing in `parse_chunk_event` for
//! testability.

use std::time::Duration;

use protocol::Message;
use serde::Serialize;
use serde_json::Value;

use super::config::LlmTimeouts;
use super::sse::{self, SseEvent};
use super::types::{LlmError, StreamEvent, TextStream};

// =============================================================================
// CLIENT
// =============================================================================

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .read_timeout(Duration::from_secs(timeouts.read_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub async fn stream_chat(&self, model: &str, max_tokens: u32, messages: &[Message]) -> Result<TextStream, LlmError> {
        let msgs: Vec<CcMessage<'_>> = messages.iter().map(CcMessage::from).collect();
        let body = CcRequest { model, max_tokens, messages: &msgs, stream: true };
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiResponse { status, body });
        }

        Ok(sse::text_stream(response.bytes_stream(), parse_chunk_event))
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [CcMessage<'a>],
    stream: bool,
}

#[derive(Serialize)]
struct CcMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for CcMessage<'a> {
    fn from(message: &'a Message) -> Self {
        Self { role: message.role.as_str(), content: &message.content }
    }
}

// =============================================================================
// EVENT PARSING
// =============================================================================

/// Map one `chat.completion.chunk` event to its contribution.
pub(crate) fn parse_chunk_event(event: &SseEvent) -> Result<StreamEvent, LlmError> {
    let data = event.data.trim();
    if data == "[DONE]" {
        return Ok(StreamEvent::Stop);
    }
    if data.is_empty() {
        return Ok(StreamEvent::Skip);
    }

    let root: Value = serde_json::from_str(data).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    if let Some(error) = root.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_owned);
        return Err(LlmError::Stream(message));
    }

    let text = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(Value::as_str)
        .unwrap_or("");

    if text.is_empty() {
        Ok(StreamEvent::Skip)
    } else {
        Ok(StreamEvent::Text(text.to_string()))
    }
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
