use super::*;
use protocol::Message;

fn output(renderer: &TerminalRenderer<Vec<u8>>) -> String {
    String::from_utf8(renderer.out.clone()).unwrap()
}

#[test]
fn greeting_renders_as_finished_line() {
    let conversation = Conversation::with_greeting("Hi! How can I help?");
    let mut renderer = TerminalRenderer::new(Vec::new(), false);
    renderer.render(&conversation).unwrap();
    assert_eq!(output(&renderer), "Agent: Hi! How can I help?\n");
}

#[test]
fn render_is_idempotent_without_changes() {
    let conversation = Conversation::with_greeting("Hi!");
    let mut renderer = TerminalRenderer::new(Vec::new(), false);
    renderer.render(&conversation).unwrap();
    renderer.render(&conversation).unwrap();
    assert_eq!(output(&renderer), "Agent: Hi!\n");
}

#[test]
fn streamed_reply_prints_only_new_text() {
    let mut conversation = Conversation::with_greeting("Hi!");
    let mut renderer = TerminalRenderer::new(Vec::new(), false);
    renderer.render(&conversation).unwrap();

    let pending = conversation.begin_send("What topics do you cover?").unwrap();
    renderer.render(&conversation).unwrap();
    assert_eq!(output(&renderer), "Agent: Hi!\nYou: What topics do you cover?\nAgent: ");

    let mut expected = output(&renderer);
    for chunk in ["We cover ", "algorithms, ", "data structures..."] {
        conversation.apply_chunk(pending.token, chunk);
        renderer.render(&conversation).unwrap();
        expected.push_str(chunk);
        assert_eq!(output(&renderer), expected);
    }

    conversation.finish_send(pending.token);
    renderer.render(&conversation).unwrap();
    assert_eq!(
        output(&renderer),
        "Agent: Hi!\nYou: What topics do you cover?\nAgent: We cover algorithms, data structures...\n"
    );
}

#[test]
fn roles_are_styled_differently() {
    let mut conversation = Conversation::new();
    conversation.append_message(Message::assistant("a"));
    conversation.append_message(Message::user("u"));
    let mut renderer = TerminalRenderer::new(Vec::new(), true);
    renderer.render(&conversation).unwrap();

    let out = output(&renderer);
    assert!(out.contains(&format!("{ASSISTANT_STYLE}Agent:{RESET} a")));
    assert!(out.contains(&format!("{USER_STYLE}You:{RESET} u")));
}

#[test]
fn oldest_message_is_rendered_first() {
    let mut conversation = Conversation::new();
    conversation.append_message(Message::user("first"));
    conversation.append_message(Message::assistant("second"));
    let mut renderer = TerminalRenderer::new(Vec::new(), false);
    renderer.render(&conversation).unwrap();

    let out = output(&renderer);
    assert!(out.find("first").unwrap() < out.find("second").unwrap());
}
