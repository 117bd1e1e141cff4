//! Event schemas and typed event keys.
//!
//! A schema maps event names to payload decoders. Payload types are plain
//! `serde` types: a payload is valid for an event when it deserializes into
//! that event's payload type.
//!
//! ```rust
//! use mebus_core::{EventKey, EventSchema};
//!
//! const PING: EventKey<String> = EventKey::new("ping");
//!
//! let schema = EventSchema::builder().event(&PING).build().unwrap();
//! assert!(schema.contains("ping"));
//! assert!(schema.validate("ping", &serde_json::json!("x")).is_ok());
//! assert!(schema.validate("ping", &serde_json::json!(42)).is_err());
//! ```

use std::any::type_name;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::{Deserialize, DeserializeOwned};
use serde_json::Value;

use crate::error::{BusError, BusResult};
use crate::identity::Identity;

/// Typed name of one event in a schema.
///
/// The payload type `P` travels with the key, so publishing and subscribing
/// through a key are checked at compile time.
pub struct EventKey<P> {
    name: &'static str,
    _payload: PhantomData<fn() -> P>,
}

impl<P> EventKey<P> {
    /// Create a key for the event called `name`.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _payload: PhantomData,
        }
    }

    /// The event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<P: Serialize> EventKey<P> {
    /// Encode a payload for this event.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::InvalidPayload`] if the payload cannot be
    /// represented as JSON.
    pub fn encode(&self, payload: &P) -> BusResult<Value> {
        serde_json::to_value(payload).map_err(|source| BusError::InvalidPayload {
            event: self.name.to_owned(),
            source,
        })
    }
}

impl<P: DeserializeOwned> EventKey<P> {
    /// Decode a payload delivered for this event.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::InvalidPayload`] if the payload does not match `P`.
    pub fn decode(&self, payload: &Value) -> BusResult<P> {
        <P as Deserialize>::deserialize(payload).map_err(|source| {
            BusError::InvalidPayload {
                event: self.name.to_owned(),
                source,
            }
        })
    }
}

impl<P> Clone for EventKey<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for EventKey<P> {}

impl<P> fmt::Debug for EventKey<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventKey")
            .field("name", &self.name)
            .field("payload", &type_name::<P>())
            .finish()
    }
}

type Check = Arc<dyn Fn(&Value) -> Result<(), serde_json::Error> + Send + Sync>;

struct EventSpec {
    name: &'static str,
    payload_type: &'static str,
    check: Check,
}

impl fmt::Debug for EventSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSpec")
            .field("name", &self.name)
            .field("payload_type", &self.payload_type)
            .finish_non_exhaustive()
    }
}

/// Immutable mapping from event name to payload decoder.
///
/// Cloning is cheap and preserves [`EventSchema::id`]. Building a second
/// schema with identical events still produces a different identity, which
/// is what reactive hosts key bus instances on.
#[derive(Clone)]
pub struct EventSchema {
    id: Identity,
    events: Arc<[EventSpec]>,
}

impl EventSchema {
    /// Start building a schema.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Identity of this schema instance.
    #[must_use]
    pub fn id(&self) -> Identity {
        self.id
    }

    /// Whether `other` is the same schema instance (or a clone of it).
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.id == other.id
    }

    /// Number of declared events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the schema declares no events. Built schemas never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.events.iter().map(|spec| spec.name)
    }

    /// Whether `event` is declared.
    #[must_use]
    pub fn contains(&self, event: &str) -> bool {
        self.spec(event).is_some()
    }

    /// Rust type name of the payload declared for `event`.
    #[must_use]
    pub fn payload_type(&self, event: &str) -> Option<&'static str> {
        self.spec(event).map(|spec| spec.payload_type)
    }

    /// Check that `payload` is valid for `event`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::UnknownEvent`] if the event is not declared, or
    /// [`BusError::InvalidPayload`] if the payload does not decode.
    pub fn validate(&self, event: &str, payload: &Value) -> BusResult<()> {
        let spec = self
            .spec(event)
            .ok_or_else(|| BusError::unknown_event(event))?;
        (spec.check)(payload).map_err(|source| BusError::InvalidPayload {
            event: event.to_owned(),
            source,
        })
    }

    fn spec(&self, event: &str) -> Option<&EventSpec> {
        self.events.iter().find(|spec| spec.name == event)
    }
}

impl fmt::Debug for EventSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSchema")
            .field("id", &self.id)
            .field("events", &self.events)
            .finish()
    }
}

/// Builder for [`EventSchema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    events: Vec<EventSpec>,
}

impl SchemaBuilder {
    /// Declare the event named by `key` with its payload type.
    #[must_use]
    pub fn event<P>(mut self, key: &EventKey<P>) -> Self
    where
        P: DeserializeOwned + 'static,
    {
        self.events.push(EventSpec {
            name: key.name(),
            payload_type: type_name::<P>(),
            check: Arc::new(|payload: &Value| {
                <P as Deserialize>::deserialize(payload).map(drop)
            }),
        });
        self
    }

    /// Finish the schema.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Schema`] if no events were declared or an event
    /// name was declared twice.
    pub fn build(self) -> BusResult<EventSchema> {
        if self.events.is_empty() {
            return Err(BusError::Schema("schema declares no events".to_owned()));
        }

        let mut seen = HashSet::with_capacity(self.events.len());
        for spec in &self.events {
            if !seen.insert(spec.name) {
                return Err(BusError::Schema(format!(
                    "event `{}` declared more than once",
                    spec.name
                )));
            }
        }

        Ok(EventSchema {
            id: Identity::fresh(),
            events: Arc::from(self.events),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Chat {
        user: String,
        text: String,
    }

    const PING: EventKey<String> = EventKey::new("ping");
    const CHAT: EventKey<Chat> = EventKey::new("chat");

    fn schema() -> EventSchema {
        EventSchema::builder()
            .event(&PING)
            .event(&CHAT)
            .build()
            .unwrap()
    }

    #[test]
    fn test_names_keep_declaration_order() {
        let names: Vec<_> = schema().names().collect();
        assert_eq!(names, vec!["ping", "chat"]);
    }

    #[test]
    fn test_empty_schema_rejected() {
        let err = EventSchema::builder().build().unwrap_err();
        assert!(matches!(err, BusError::Schema(_)));
    }

    #[test]
    fn test_duplicate_event_rejected() {
        let other: EventKey<u32> = EventKey::new("ping");
        let err = EventSchema::builder()
            .event(&PING)
            .event(&other)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("`ping`"));
    }

    #[test]
    fn test_validate() {
        let schema = schema();
        assert!(schema.validate("ping", &json!("x")).is_ok());
        assert!(
            schema
                .validate("chat", &json!({"user": "a", "text": "hi"}))
                .is_ok()
        );
        assert!(matches!(
            schema.validate("chat", &json!({"user": "a"})),
            Err(BusError::InvalidPayload { .. })
        ));
        assert!(matches!(
            schema.validate("pong", &json!("x")),
            Err(BusError::UnknownEvent { .. })
        ));
    }

    #[test]
    fn test_identity_shared_by_clones_only() {
        let a = schema();
        let b = a.clone();
        let c = schema();
        assert!(a.same_identity(&b));
        assert_eq!(a.id(), b.id());
        assert!(!a.same_identity(&c));
    }

    #[test]
    fn test_payload_type() {
        let schema = schema();
        assert_eq!(schema.payload_type("ping"), Some(type_name::<String>()));
        assert_eq!(schema.payload_type("nope"), None);
        assert_eq!(schema.len(), 2);
        assert!(!schema.is_empty());
    }

    #[test]
    fn test_key_encode_decode() {
        let value = CHAT
            .encode(&Chat {
                user: "a".into(),
                text: "hi".into(),
            })
            .unwrap();
        assert_eq!(value, json!({"user": "a", "text": "hi"}));

        let chat = CHAT.decode(&value).unwrap();
        assert_eq!(chat.text, "hi");

        assert!(PING.decode(&json!(1)).is_err());
    }
}
