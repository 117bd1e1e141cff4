//! Integration tests for publishing through the bound bus.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::TestComponent;
use mebus_core::{BusError, Completion};
use mebus_hooks::EventCallbacks;
use mebus_test::{CHAT, COUNT, ChatMessage, PING, Recorder, chat_schema, ping_schema};
use serde_json::json;
use tokio::sync::oneshot;

#[test]
fn test_typed_payloads_reach_matching_handlers() {
    let pings = Recorder::<String>::new();
    let chats = Recorder::<ChatMessage>::new();
    let callbacks = EventCallbacks::new()
        .on(&PING, pings.handler())
        .on(&CHAT, chats.handler());
    let mut component = TestComponent::new(chat_schema(), Some(callbacks));

    let publish = component.render().unwrap();
    publish.publish(&CHAT, ChatMessage::new("ada", "hello")).unwrap();
    publish.publish(&PING, "x".to_string()).unwrap();
    publish.publish(&COUNT, 7_u32).unwrap();

    assert_eq!(chats.calls(), vec![ChatMessage::new("ada", "hello")]);
    assert_eq!(pings.calls(), vec!["x".to_string()]);

    let published = component.factory.last().unwrap().published();
    assert_eq!(published.len(), 3);
    assert_eq!(published[0].payload, json!({"user": "ada", "text": "hello"}));
    assert_eq!(published[2].event, "count");
}

#[test]
fn test_invalid_payload_never_reaches_handler() {
    let pings = Recorder::<String>::new();
    let mut component = TestComponent::new(
        ping_schema(),
        Some(EventCallbacks::new().on(&PING, pings.handler())),
    );

    let publish = component.render().unwrap();
    let err = publish.publish_raw("ping", json!({"not": "a string"})).unwrap_err();

    assert!(matches!(err, BusError::InvalidPayload { .. }));
    assert_eq!(pings.count(), 0);
}

#[test]
fn test_handler_error_propagates_to_publisher() {
    let mut component = TestComponent::new(
        ping_schema(),
        Some(EventCallbacks::new().on(&PING, |text: String| {
            if text.is_empty() {
                Err(BusError::handler("ping", "empty ping"))
            } else {
                Ok(())
            }
        })),
    );

    let publish = component.render().unwrap();
    publish.publish(&PING, "x".to_string()).unwrap();

    let err = publish.publish(&PING, String::new()).unwrap_err();
    assert!(matches!(err, BusError::Handler { .. }));
    assert_eq!(err.event(), Some("ping"));
}

#[test]
fn test_publisher_survives_clone_and_rerender() {
    let pings = Recorder::<String>::new();
    let mut component = TestComponent::new(
        ping_schema(),
        Some(EventCallbacks::new().on(&PING, pings.handler())),
    );

    let first = component.render().unwrap();
    let copy = first.clone();
    component.render().unwrap();
    copy.publish(&PING, "x".to_string()).unwrap();

    assert_eq!(pings.count(), 1);
}

#[tokio::test]
async fn test_deferred_completions_settle() {
    let done = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&done);
    let mut component = TestComponent::new(
        ping_schema(),
        Some(EventCallbacks::new().on(&PING, move |_: String| {
            let counter = Arc::clone(&counter);
            Completion::deferred(async move {
                tokio::task::yield_now().await;
                counter.fetch_add(1, Ordering::SeqCst);
            })
        })),
    );

    let publish = component.render().unwrap();
    publish.publish(&PING, "a".to_string()).unwrap();
    publish.publish(&PING, "b".to_string()).unwrap();

    let bus = component.factory.last().unwrap();
    assert_eq!(bus.pending_count(), 2);
    assert_eq!(done.load(Ordering::SeqCst), 0);

    bus.settle().await;
    assert_eq!(bus.pending_count(), 0);
    assert_eq!(done.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_deferred_completion_waits_on_external_signal() {
    let (tx, rx) = oneshot::channel::<String>();
    let rx = Arc::new(std::sync::Mutex::new(Some(rx)));
    let received = Recorder::<String>::new();
    let sink = received.clone();

    let mut component = TestComponent::new(
        ping_schema(),
        Some(EventCallbacks::new().on(&PING, move |_: String| {
            let rx = rx.lock().ok().and_then(|mut g| g.take());
            let sink = sink.clone();
            Completion::deferred(async move {
                if let Some(rx) = rx
                    && let Ok(reply) = rx.await
                {
                    sink.handler()(reply);
                }
            })
        })),
    );

    let publish = component.render().unwrap();
    publish.publish(&PING, "question".to_string()).unwrap();

    let bus = component.factory.last().unwrap();
    let settle = tokio::spawn(async move { bus.settle().await });
    tx.send("answer".to_string()).unwrap();
    settle.await.unwrap();

    assert_eq!(received.calls(), vec!["answer".to_string()]);
}
