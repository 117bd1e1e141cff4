//! Error types shared by the event bus and its bindings.

use thiserror::Error;

/// Errors raised by schemas, event buses and their handlers.
///
/// Bindings never recover from these; every variant reaches the caller
/// exactly as the bus or schema produced it.
#[derive(Debug, Error)]
pub enum BusError {
    /// The schema itself is malformed (empty, duplicate event names).
    #[error("invalid schema: {0}")]
    Schema(String),

    /// An event name that the schema does not declare.
    #[error("unknown event: {event}")]
    UnknownEvent {
        /// The offending event name
        event: String,
    },

    /// A payload that does not decode into the event's payload type.
    #[error("invalid payload for {event}: {source}")]
    InvalidPayload {
        /// The event the payload was published or delivered for
        event: String,
        /// Decoder error
        #[source]
        source: serde_json::Error,
    },

    /// A subscribed handler reported failure.
    #[error("handler for {event} failed: {reason}")]
    Handler {
        /// The event being dispatched
        event: String,
        /// Failure description from the handler
        reason: String,
    },

    /// The bus could not be constructed from the schema.
    #[error("bus construction failed: {0}")]
    Construction(String),
}

impl BusError {
    /// Build a handler failure for `event`.
    pub fn handler(event: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Handler {
            event: event.into(),
            reason: reason.into(),
        }
    }

    /// Build an unknown-event error.
    pub fn unknown_event(event: impl Into<String>) -> Self {
        Self::UnknownEvent {
            event: event.into(),
        }
    }

    /// The event name this error is about, if any.
    #[must_use]
    pub fn event(&self) -> Option<&str> {
        match self {
            Self::UnknownEvent { event }
            | Self::InvalidPayload { event, .. }
            | Self::Handler { event, .. } => Some(event),
            Self::Schema(_) | Self::Construction(_) => None,
        }
    }
}

/// Result type for bus operations.
pub type BusResult<T> = Result<T, BusError>;
