//! Relay endpoint route.

use axum::body::Body;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use protocol::Message;

use crate::services::relay::{self, RelayError};
use crate::state::AppState;

pub(crate) fn relay_error_to_status(err: &RelayError) -> StatusCode {
    match err {
        RelayError::LlmNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        RelayError::InvalidConversation(_) => StatusCode::BAD_REQUEST,
        RelayError::Provider(_) | RelayError::Stream(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (relay_error_to_status(&self), self.to_string()).into_response()
    }
}

/// `POST /api/chat`: stream the provider's reply to `conversation`.
///
/// The body is raw UTF-8 text with no framing and no content length. A
/// provider failure after the first byte aborts the response instead of
/// closing it cleanly.
pub async fn relay_chat(
    State(state): State<AppState>,
    Json(conversation): Json<Vec<Message>>,
) -> Result<Response, RelayError> {
    let body = relay::open_relay(&state, conversation).await?;

    Ok((
        [(CONTENT_TYPE, "text/plain; charset=utf-8"), (CACHE_CONTROL, "no-cache")],
        Body::from_stream(body),
    )
        .into_response())
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
