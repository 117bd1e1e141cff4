//! Test fixtures for common schemas and payloads.

use serde::{Deserialize, Serialize};

use mebus_core::{EventKey, EventSchema};

/// Payload of the `chat` fixture event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author.
    pub user: String,
    /// Message body.
    pub text: String,
}

impl ChatMessage {
    /// Create a chat message.
    #[must_use]
    pub fn new(user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            text: text.into(),
        }
    }
}

/// `ping` event carrying a string.
pub const PING: EventKey<String> = EventKey::new("ping");

/// `chat` event carrying a [`ChatMessage`].
pub const CHAT: EventKey<ChatMessage> = EventKey::new("chat");

/// `count` event carrying a number.
pub const COUNT: EventKey<u32> = EventKey::new("count");

/// Schema with the single event `ping: String`.
///
/// # Panics
///
/// Never; the fixture schema is statically valid.
#[must_use]
pub fn ping_schema() -> EventSchema {
    EventSchema::builder()
        .event(&PING)
        .build()
        .expect("ping fixture schema is valid")
}

/// Schema with `ping`, `chat` and `count`, in that order.
///
/// # Panics
///
/// Never; the fixture schema is statically valid.
#[must_use]
pub fn chat_schema() -> EventSchema {
    EventSchema::builder()
        .event(&PING)
        .event(&CHAT)
        .event(&COUNT)
        .build()
        .expect("chat fixture schema is valid")
}
