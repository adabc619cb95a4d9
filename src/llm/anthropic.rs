//! Anthropic Messages API client, streaming mode only.
//!
//! Thin HTTP wrapper for `/v1/messages` with `stream: true`. The Messages API
//! takes the system instruction as a top-level field, so `system` entries
//! are lifted out of the message list here. Pure parsing in `parse_event`.

use std::time::Duration;

use protocol::{Message, Role};
use serde::Deserialize;

use super::config::LlmTimeouts;
use super::sse::{self, SseEvent};
use super::types::{LlmError, StreamEvent, TextStream};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .read_timeout(Duration::from_secs(timeouts.read_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key })
    }

    pub async fn stream_chat(&self, model: &str, max_tokens: u32, messages: &[Message]) -> Result<TextStream, LlmError> {
        let (system, turns) = split_system(messages);
        let body = ApiRequest { model, max_tokens, system: &system, messages: &turns, stream: true };

        let response = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiResponse { status, body });
        }

        Ok(sse::text_stream(response.bytes_stream(), parse_event))
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    messages: &'a [&'a Message],
    stream: bool,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ApiEvent {
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { delta: Delta },
    #[serde(rename = "message_stop")]
    MessageStop,
    #[serde(rename = "error")]
    Error { error: ApiErrorBody },
    // message_start, content_block_start/stop, message_delta, ping
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Delta {
    #[serde(rename = "text_delta")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Join every `system` entry into one instruction and keep the rest in order.
///
/// The Messages API wants the first turn to come from the user, so assistant
/// turns before it (a canned greeting) are dropped.
fn split_system(messages: &[Message]) -> (String, Vec<&Message>) {
    let mut system = Vec::new();
    let mut turns = Vec::with_capacity(messages.len());
    for message in messages {
        match message.role {
            Role::System => system.push(message.content.trim()),
            Role::Assistant if turns.is_empty() => {}
            Role::User | Role::Assistant => turns.push(message),
        }
    }
    (system.join("\n\n"), turns)
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_event(event: &SseEvent) -> Result<StreamEvent, LlmError> {
    if event.data.trim().is_empty() {
        return Ok(StreamEvent::Skip);
    }
    let api: ApiEvent = serde_json::from_str(&event.data).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    match api {
        ApiEvent::ContentBlockDelta { delta: Delta::Text { text } } if !text.is_empty() => Ok(StreamEvent::Text(text)),
        ApiEvent::MessageStop => Ok(StreamEvent::Stop),
        ApiEvent::Error { error } => Err(LlmError::Stream(format!("{}: {}", error.kind, error.message))),
        ApiEvent::ContentBlockDelta { .. } | ApiEvent::Other => Ok(StreamEvent::Skip),
    }
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
