//! HTTP client for the relay endpoint.
//!
//! ERROR HANDLING
//! ==============
//! Everything that can fail before the first body byte (bad URL, connect
//! failure, non-200 status) is an error from [`RelayClient::open`]. Failures
//! after that arrive as error items inside the returned stream.

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use protocol::Message;
use reqwest::Url;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid relay URL: {0}")]
    InvalidUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("relay returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Response body of one relay call, chunk by chunk as received.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ClientError>> + Send>>;

#[derive(Clone, Debug)]
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl RelayClient {
    /// Build a client for the relay at `endpoint` (full URL, path included).
    ///
    /// Only the connect phase is bounded by `connect_timeout`; a reply may
    /// stream for as long as the provider keeps producing text.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] for an unparsable or non-HTTP URL
    /// and [`ClientError::Http`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str, connect_timeout: Duration) -> Result<Self, ClientError> {
        let endpoint = Url::parse(endpoint).map_err(|e| ClientError::InvalidUrl(format!("{endpoint}: {e}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!("{endpoint}: expected http or https")));
        }
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self { http, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// POST `history` as JSON and return the streamed reply body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the request cannot be sent and
    /// [`ClientError::Status`] for a non-200 answer.
    pub async fn open(&self, history: &[Message]) -> Result<ByteStream, ClientError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(history)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        Ok(Box::pin(response.bytes_stream().map(|chunk| chunk.map_err(ClientError::from))))
    }
}

#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;
