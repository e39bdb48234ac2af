//! End-to-end command dispatch through the controller against a mock backend.

mod common;

use assistant_chat::config::{KeyValueStore, MemoryStore, KEY_VOICE_ENABLED};
use assistant_chat::dispatch::FAILURE_TEXT;
use assistant_chat::ui::chat::Sender;
use assistant_chat::ui::notifications::NotificationKind;
use common::{next_event, unreachable_url, TestAppBuilder};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_reply(server: &MockServer, command: &str, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/process_command"))
        .and(body_json(json!({ "command": command })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn texts(messages: &[&assistant_chat::ui::chat::ChatMessage]) -> Vec<String> {
    messages.iter().map(|m| m.text.clone()).collect()
}

#[tokio::test]
async fn user_message_is_rendered_before_the_reply() {
    let server = MockServer::start().await;
    mount_reply(&server, "hello", json!({ "response": "Hi there" })).await;

    let mut app = TestAppBuilder::new(&server.uri()).build();
    let request = app.controller.submit("  hello  ");
    assert!(request.is_some());

    let log = app.controller.messages();
    assert_eq!(texts(&log.from_sender(Sender::User)), vec!["hello"]);
    assert!(log.from_sender(Sender::Assistant).is_empty());
    assert_eq!(log.pending_count(), 1);

    next_event(&mut app.controller).await;

    let log = app.controller.messages();
    assert_eq!(log.pending_count(), 0);
    assert_eq!(texts(&log.from_sender(Sender::Assistant)), vec!["Hi there"]);
    assert_eq!(log.len(), 2);
}

#[tokio::test]
async fn blank_input_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process_command"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "x" })))
        .expect(0)
        .mount(&server)
        .await;

    let mut app = TestAppBuilder::new(&server.uri()).build();
    assert_eq!(app.controller.submit(""), None);
    assert_eq!(app.controller.submit(" \t\n "), None);
    assert!(app.controller.messages().is_empty());
    assert!(app.controller.history().entries().is_empty());
}

#[tokio::test]
async fn error_field_renders_as_error_message() {
    let server = MockServer::start().await;
    mount_reply(&server, "do the impossible", json!({ "error": "Unknown command" })).await;

    let mut app = TestAppBuilder::new(&server.uri()).build();
    app.controller.submit("do the impossible");
    next_event(&mut app.controller).await;

    let assistant = app.controller.messages().from_sender(Sender::Assistant);
    assert_eq!(texts(&assistant), vec!["Error: Unknown command"]);

    let toast = app.controller.notifications().active().unwrap();
    assert_eq!(toast.kind, NotificationKind::Error);
    assert!(app.synthesizer.spoken().is_empty());
}

#[tokio::test]
async fn error_wins_over_response() {
    let server = MockServer::start().await;
    mount_reply(&server, "both", json!({ "response": "ignored", "error": "bad" })).await;

    let mut app = TestAppBuilder::new(&server.uri()).build();
    app.controller.submit("both");
    next_event(&mut app.controller).await;

    let assistant = app.controller.messages().from_sender(Sender::Assistant);
    assert_eq!(texts(&assistant), vec!["Error: bad"]);
}

#[tokio::test]
async fn unreachable_backend_shows_generic_failure() {
    let mut app = TestAppBuilder::new(&unreachable_url()).build();
    app.controller.submit("hello");
    next_event(&mut app.controller).await;

    let log = app.controller.messages();
    assert_eq!(log.pending_count(), 0);
    assert_eq!(texts(&log.from_sender(Sender::Assistant)), vec![FAILURE_TEXT]);
    assert_eq!(
        app.controller.notifications().active().map(|n| n.kind),
        Some(NotificationKind::Error)
    );
}

#[tokio::test]
async fn server_error_and_empty_body_fail_the_same_way() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process_command"))
        .and(body_json(json!({ "command": "crash" })))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    mount_reply(&server, "nothing", json!({})).await;

    let mut app = TestAppBuilder::new(&server.uri()).build();
    app.controller.submit("crash");
    next_event(&mut app.controller).await;
    app.controller.submit("nothing");
    next_event(&mut app.controller).await;

    let assistant = app.controller.messages().from_sender(Sender::Assistant);
    assert_eq!(texts(&assistant), vec![FAILURE_TEXT, FAILURE_TEXT]);
    assert_eq!(app.controller.messages().pending_count(), 0);
}

#[tokio::test]
async fn history_from_backend_replaces_local_history() {
    let server = MockServer::start().await;
    mount_reply(
        &server,
        "what time is it",
        json!({
            "response": "It is noon",
            "history": [
                { "command": "what time is it", "timestamp": "12:00:00" },
                { "command": "hello", "timestamp": "11:59:00" }
            ]
        }),
    )
    .await;

    let mut app = TestAppBuilder::new(&server.uri()).build();
    app.controller.submit("what time is it");
    assert_eq!(app.controller.history().entries().len(), 1);

    next_event(&mut app.controller).await;

    let commands: Vec<_> = app
        .controller
        .history()
        .entries()
        .iter()
        .map(|e| (e.command.as_str(), e.timestamp.as_str()))
        .collect();
    assert_eq!(
        commands,
        vec![("what time is it", "12:00:00"), ("hello", "11:59:00")]
    );
}

#[tokio::test]
async fn replies_are_spoken_only_when_voice_is_enabled() {
    let server = MockServer::start().await;
    mount_reply(&server, "hello", json!({ "response": "Hi" })).await;

    let mut app = TestAppBuilder::new(&server.uri()).build();
    app.controller.submit("hello");
    next_event(&mut app.controller).await;
    assert_eq!(app.synthesizer.spoken(), vec![("Hi".to_string(), 1.0)]);

    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    store.set(KEY_VOICE_ENABLED, "false").unwrap();
    let mut muted = TestAppBuilder::new(&server.uri()).store(store).build();
    muted.controller.submit("hello");
    next_event(&mut muted.controller).await;

    assert_eq!(
        texts(&muted.controller.messages().from_sender(Sender::Assistant)),
        vec!["Hi"]
    );
    assert!(muted.synthesizer.spoken().is_empty());
}

#[tokio::test]
async fn concurrent_requests_each_clear_their_placeholder() {
    let server = MockServer::start().await;
    mount_reply(&server, "first", json!({ "response": "one" })).await;
    mount_reply(&server, "second", json!({ "response": "two" })).await;

    let mut app = TestAppBuilder::new(&server.uri()).build();
    app.controller.submit("first");
    app.controller.submit("second");
    assert_eq!(app.controller.messages().pending_count(), 2);

    next_event(&mut app.controller).await;
    next_event(&mut app.controller).await;

    let mut replies = texts(&app.controller.messages().from_sender(Sender::Assistant));
    replies.sort();
    assert_eq!(replies, vec!["one", "two"]);
    assert_eq!(app.controller.messages().pending_count(), 0);
    assert_eq!(app.controller.messages().from_sender(Sender::User).len(), 2);
}

#[tokio::test]
async fn stale_reply_is_dropped_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process_command"))
        .and(body_json(json!({ "command": "slow" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": "old" }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    mount_reply(&server, "fast", json!({ "response": "new" })).await;

    let mut app = TestAppBuilder::new(&server.uri())
        .discard_stale_responses()
        .build();
    app.controller.submit("slow");
    app.controller.submit("fast");

    next_event(&mut app.controller).await;
    next_event(&mut app.controller).await;

    let log = app.controller.messages();
    assert_eq!(texts(&log.from_sender(Sender::User)), vec!["slow", "fast"]);
    assert_eq!(texts(&log.from_sender(Sender::Assistant)), vec!["new"]);
    assert_eq!(log.pending_count(), 0);
}
