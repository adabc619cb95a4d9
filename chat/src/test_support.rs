//! Stub relay endpoint for client tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use futures_util::StreamExt;
use protocol::{CHAT_PATH, Message};

/// How the stub answers every request.
#[derive(Clone, Debug)]
pub enum Reply {
    /// Stream these chunks, then end cleanly.
    Chunks(Vec<Bytes>),
    /// Stream these chunks, then abort the body.
    ChunksThenAbort(Vec<Bytes>),
    /// Answer with a status and a short text body, no stream.
    Status(u16, &'static str),
}

/// One chunk per string.
pub fn chunks(parts: &[&'static str]) -> Vec<Bytes> {
    parts.iter().map(|p| Bytes::from_static(p.as_bytes())).collect()
}

struct StubState {
    reply: Reply,
    received: Mutex<Vec<Vec<Message>>>,
}

pub struct StubRelay {
    pub url: String,
    state: Arc<StubState>,
}

impl StubRelay {
    /// Request bodies received so far, in arrival order.
    pub fn received(&self) -> Vec<Vec<Message>> {
        self.state.received.lock().unwrap().clone()
    }
}

pub async fn spawn(reply: Reply) -> StubRelay {
    let state = Arc::new(StubState { reply, received: Mutex::new(Vec::new()) });
    let app = Router::new()
        .route(CHAT_PATH, post(handle))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubRelay { url: format!("http://{addr}{CHAT_PATH}"), state }
}

async fn handle(State(state): State<Arc<StubState>>, Json(history): Json<Vec<Message>>) -> Response {
    state.received.lock().unwrap().push(history);

    let (chunks, abort) = match &state.reply {
        Reply::Status(code, text) => {
            let status = StatusCode::from_u16(*code).unwrap();
            return (status, *text).into_response();
        }
        Reply::Chunks(chunks) => (chunks.clone(), false),
        Reply::ChunksThenAbort(chunks) => (chunks.clone(), true),
    };

    let mut items: Vec<Result<Bytes, std::io::Error>> = chunks.into_iter().map(Ok).collect();
    if abort {
        items.push(Err(std::io::Error::other("provider stream failed")));
    }

    // Pace the items so each chunk is flushed on its own.
    let body = futures_util::stream::iter(items).then(|item| async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        item
    });
    Body::from_stream(body).into_response()
}
