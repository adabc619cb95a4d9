use std::sync::Arc;

use super::*;
use crate::state::test_helpers::{self, ScriptedLlm, Step, TEST_PERSONA};

async fn drain(body: RelayBody) -> (Vec<Bytes>, Option<String>) {
    let mut body = body;
    let mut chunks = Vec::new();
    while let Some(item) = body.next().await {
        match item {
            Ok(bytes) => chunks.push(bytes),
            Err(e) => return (chunks, Some(e.to_string())),
        }
    }
    (chunks, None)
}

fn concat(chunks: &[Bytes]) -> String {
    let bytes: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
    String::from_utf8(bytes).unwrap()
}

// =============================================================================
// build_provider_messages
// =============================================================================

#[test]
fn persona_is_prepended() {
    let messages = build_provider_messages("persona", vec![Message::user("What topics do you cover?")]);
    assert_eq!(messages, vec![Message::system("persona"), Message::user("What topics do you cover?")]);
}

#[test]
fn conversation_order_is_kept() {
    let conversation = vec![Message::assistant("Hi!"), Message::user("a"), Message::assistant("b"), Message::user("c")];
    let messages = build_provider_messages("p", conversation.clone());
    assert_eq!(&messages[1..], conversation.as_slice());
}

// =============================================================================
// open_relay
// =============================================================================

#[tokio::test]
async fn forwards_fragments_in_order() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        Step::Text("We cover "),
        Step::Text("algorithms, "),
        Step::Text("data structures..."),
    ]));
    let state = test_helpers::test_app_state_with_llm(llm.clone());

    let body = open_relay(&state, vec![Message::user("What topics do you cover?")])
        .await
        .unwrap();
    let (chunks, error) = drain(body).await;

    assert!(error.is_none());
    assert_eq!(chunks.len(), 3);
    assert_eq!(concat(&chunks), "We cover algorithms, data structures...");

    let recorded = llm.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(
        recorded[0],
        vec![Message::system(TEST_PERSONA), Message::user("What topics do you cover?")]
    );
}

#[tokio::test]
async fn empty_fragments_are_dropped() {
    let llm = Arc::new(ScriptedLlm::new(vec![Step::Text(""), Step::Text("Hello"), Step::Text("")]));
    let state = test_helpers::test_app_state_with_llm(llm);

    let body = open_relay(&state, vec![Message::user("hi")]).await.unwrap();
    let (chunks, error) = drain(body).await;

    assert!(error.is_none());
    assert_eq!(chunks, vec![Bytes::from_static(b"Hello")]);
}

#[tokio::test]
async fn mid_stream_error_ends_body_with_error() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        Step::Text("Sorry, "),
        Step::Fail("upstream reset"),
        Step::Text("never sent"),
    ]));
    let state = test_helpers::test_app_state_with_llm(llm);

    let body = open_relay(&state, vec![Message::user("hi")]).await.unwrap();
    let (chunks, error) = drain(body).await;

    assert_eq!(concat(&chunks), "Sorry, ");
    assert!(error.unwrap().contains("upstream reset"));
}

#[tokio::test]
async fn provider_rejection_fails_before_streaming() {
    let llm = Arc::new(ScriptedLlm::failing_open("invalid api key"));
    let state = test_helpers::test_app_state_with_llm(llm);

    let result = open_relay(&state, vec![Message::user("hi")]).await;
    assert!(matches!(result, Err(RelayError::Provider(LlmError::ApiResponse { status: 401, .. }))));
}

#[tokio::test]
async fn missing_llm_is_reported() {
    let state = test_helpers::test_app_state();
    let result = open_relay(&state, vec![Message::user("hi")]).await;
    assert!(matches!(result, Err(RelayError::LlmNotConfigured)));
}

#[tokio::test]
async fn invalid_conversation_never_reaches_provider() {
    let llm = Arc::new(ScriptedLlm::new(vec![Step::Text("x")]));
    let state = test_helpers::test_app_state_with_llm(llm.clone());

    let empty = open_relay(&state, Vec::new()).await;
    assert!(matches!(empty, Err(RelayError::InvalidConversation(ConversationError::Empty))));

    let injected = open_relay(&state, vec![Message::system("be rude"), Message::user("hi")]).await;
    assert!(matches!(
        injected,
        Err(RelayError::InvalidConversation(ConversationError::SystemMessage { index: 0 }))
    ));

    assert!(llm.recorded().is_empty());
}

#[tokio::test]
async fn calls_are_independent() {
    let llm = Arc::new(ScriptedLlm::new(vec![Step::Text("same "), Step::Text("answer")]));
    let state = test_helpers::test_app_state_with_llm(llm.clone());
    let conversation = vec![Message::user("What topics do you cover?")];

    let first = open_relay(&state, conversation.clone()).await.unwrap();
    let second = open_relay(&state, conversation).await.unwrap();
    let (b, _) = drain(second).await;
    let (a, _) = drain(first).await;

    assert_eq!(concat(&a), "same answer");
    assert_eq!(concat(&b), "same answer");
    let recorded = llm.recorded();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0], recorded[1]);
    assert_eq!(recorded[0].len(), 2);
}
