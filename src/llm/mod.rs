//! LLM: streaming provider adapter behind the relay endpoint.
//!
//! DESIGN
//! ======
//! Configured from environment variables. The `LlmClient` dispatches to an
//! OpenAI-compatible chat completions endpoint or to Anthropic based on
//! `LLM_PROVIDER`. Both adapters decode server-sent events into the same
//! `TextStream` of non-empty text fragments.

pub mod anthropic;
pub mod config;
pub mod openai;
pub mod sse;
pub mod types;

use config::{LlmConfig, LlmProviderKind};
use protocol::Message;
pub use types::LlmStream;
use types::{LlmError, TextStream};

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete LLM client that dispatches to either `OpenAI` or Anthropic.
///
/// Configured from environment variables by [`LlmClient::from_env`].
pub struct LlmClient {
    inner: LlmProvider,
    model: String,
    max_tokens: u32,
}

enum LlmProvider {
    OpenAi(openai::OpenAiClient),
    Anthropic(anthropic::AnthropicClient),
}

impl LlmClient {
    /// Build an LLM client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let inner = match config.provider {
            LlmProviderKind::OpenAi => {
                LlmProvider::OpenAi(openai::OpenAiClient::new(config.api_key, config.openai_base_url, config.timeouts)?)
            }
            LlmProviderKind::Anthropic => {
                LlmProvider::Anthropic(anthropic::AnthropicClient::new(config.api_key, config.timeouts)?)
            }
        };
        Ok(Self { inner, model: config.model, max_tokens: config.max_tokens })
    }

    /// Return the configured model name (e.g. `"gpt-4o-mini"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmStream for LlmClient {
    async fn stream_chat(&self, messages: &[Message]) -> Result<TextStream, LlmError> {
        match &self.inner {
            LlmProvider::OpenAi(c) => {
                c.stream_chat(&self.model, self.max_tokens, messages)
                    .await
            }
            LlmProvider::Anthropic(c) => {
                c.stream_chat(&self.model, self.max_tokens, messages)
                    .await
            }
        }
    }
}
