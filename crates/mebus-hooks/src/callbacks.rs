//! Callback maps.

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;

use mebus_core::{EventKey, Identity, IntoCompletion, RawHandler, typed_handler};

#[derive(Clone)]
struct Entry {
    /// Payload type the handler decodes; `None` for raw handlers.
    payload_type: Option<&'static str>,
    handler: RawHandler,
}

/// Partial mapping from event name to handler.
///
/// Every change produces a new [`EventCallbacks::id`], which is how a host
/// notices that the subscriptions need refreshing. Clones keep the identity.
#[derive(Clone)]
pub struct EventCallbacks {
    id: Identity,
    handlers: HashMap<&'static str, Entry>,
}

impl EventCallbacks {
    /// An empty callback map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Identity::fresh(),
            handlers: HashMap::new(),
        }
    }

    /// Handle the event named by `key`. Replaces any previous handler.
    #[must_use]
    pub fn on<P, F, R>(self, key: &EventKey<P>, handler: F) -> Self
    where
        P: DeserializeOwned + 'static,
        F: Fn(P) -> R + Send + Sync + 'static,
        R: IntoCompletion,
    {
        self.insert(
            key.name(),
            Some(type_name::<P>()),
            typed_handler(*key, handler),
        )
    }

    /// Handle `event` with an untyped handler.
    ///
    /// Raw handlers receive the JSON payload as validated by the bus, so no
    /// payload type is checked against the schema when they subscribe.
    #[must_use]
    pub fn on_raw(self, event: &'static str, handler: RawHandler) -> Self {
        self.insert(event, None, handler)
    }

    fn insert(
        mut self,
        event: &'static str,
        payload_type: Option<&'static str>,
        handler: RawHandler,
    ) -> Self {
        self.handlers.insert(
            event,
            Entry {
                payload_type,
                handler,
            },
        );
        self.id = Identity::fresh();
        self
    }

    /// Identity of this callback map.
    #[must_use]
    pub fn id(&self) -> Identity {
        self.id
    }

    /// The handler for `event`, if any.
    #[must_use]
    pub fn get(&self, event: &str) -> Option<&RawHandler> {
        self.handlers.get(event).map(|entry| &entry.handler)
    }

    /// Payload type the handler for `event` decodes, if it is typed.
    #[must_use]
    pub fn payload_type(&self, event: &str) -> Option<&'static str> {
        self.handlers.get(event).and_then(|entry| entry.payload_type)
    }

    /// Whether a handler exists for `event`.
    #[must_use]
    pub fn contains(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    /// Event names with a handler, in no particular order.
    pub fn events(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    /// Number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether there are no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for EventCallbacks {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut events: Vec<_> = self.events().collect();
        events.sort_unstable();
        f.debug_struct("EventCallbacks")
            .field("id", &self.id)
            .field("events", &events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mebus_core::{BusResult, Completion};
    use mebus_test::{CHAT, ChatMessage, PING, Recorder};
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[test]
    fn test_on_registers_typed_handler() {
        let recorder = Recorder::<String>::new();
        let callbacks = EventCallbacks::new().on(&PING, recorder.handler());

        assert!(callbacks.contains("ping"));
        assert!(!callbacks.contains("chat"));
        assert_eq!(callbacks.len(), 1);

        let handler = callbacks.get("ping").unwrap();
        handler(&json!("x")).unwrap();
        assert_eq!(recorder.calls(), vec!["x".to_string()]);
    }

    #[test]
    fn test_every_change_gets_new_identity() {
        let empty = EventCallbacks::new();
        let first = empty.id();
        let with_ping = empty.on(&PING, |_: String| {});
        let second = with_ping.id();
        let with_chat = with_ping.on(&CHAT, |_: ChatMessage| {});

        assert_ne!(first, second);
        assert_ne!(second, with_chat.id());
        assert_eq!(with_chat.clone().id(), with_chat.id());
    }

    #[test]
    fn test_replacing_handler_keeps_one_entry() {
        let callbacks = EventCallbacks::new()
            .on(&PING, |_: String| {})
            .on(&PING, |_: String| {});
        assert_eq!(callbacks.len(), 1);
    }

    #[test]
    fn test_payload_type_recorded_for_typed_handlers() {
        let raw: RawHandler = Arc::new(|_: &Value| -> BusResult<Completion> { Ok(Completion::Done) });
        let callbacks = EventCallbacks::new()
            .on(&CHAT, |_: ChatMessage| {})
            .on_raw("ping", raw);

        assert_eq!(
            callbacks.payload_type("chat"),
            Some(type_name::<ChatMessage>())
        );
        assert_eq!(callbacks.payload_type("ping"), None);
        assert_eq!(callbacks.payload_type("count"), None);
    }

    #[test]
    fn test_debug_lists_events_sorted() {
        let callbacks = EventCallbacks::new()
            .on(&PING, |_: String| {})
            .on(&CHAT, |_: ChatMessage| {});
        let debug = format!("{callbacks:?}");
        assert!(debug.contains(r#"["chat", "ping"]"#));
    }
}
