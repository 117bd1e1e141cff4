//! Event bus interface consumed by the bindings.
//!
//! The bindings never implement a bus themselves. They construct one through
//! a [`BusFactory`], subscribe handlers on it and forward publishes to it.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::error::BusResult;
use crate::handler::RawHandler;
use crate::schema::EventSchema;

/// A schema-validated publish/subscribe bus.
///
/// Implementations dispatch synchronously: every handler subscribed to
/// `event` has run (or handed back its deferred completion) by the time
/// [`EventBus::publish`] returns.
pub trait EventBus: Send + Sync {
    /// The schema this bus was constructed from.
    fn schema(&self) -> &EventSchema;

    /// Publish `payload` to every handler subscribed to `event`.
    ///
    /// # Errors
    ///
    /// Returns the bus's validation error for unknown events or invalid
    /// payloads, or the first handler error encountered.
    fn publish(&self, event: &str, payload: Value) -> BusResult<()>;

    /// Register `handler` for `event`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus refuses the subscription, e.g. for an
    /// event its schema does not declare.
    fn subscribe(&self, event: &str, handler: RawHandler) -> BusResult<Unsubscribe>;
}

impl<B: EventBus + ?Sized> EventBus for Arc<B> {
    fn schema(&self) -> &EventSchema {
        (**self).schema()
    }

    fn publish(&self, event: &str, payload: Value) -> BusResult<()> {
        (**self).publish(event, payload)
    }

    fn subscribe(&self, event: &str, handler: RawHandler) -> BusResult<Unsubscribe> {
        (**self).subscribe(event, handler)
    }
}

/// Constructs bus instances from schemas.
pub trait BusFactory {
    /// The bus type produced.
    type Bus: EventBus + 'static;

    /// Construct a bus for `schema`.
    ///
    /// # Errors
    ///
    /// Returns the bus's own construction error, e.g. for a schema it
    /// cannot serve.
    fn create(&self, schema: &EventSchema) -> BusResult<Self::Bus>;
}

impl<F: BusFactory + ?Sized> BusFactory for &F {
    type Bus = F::Bus;

    fn create(&self, schema: &EventSchema) -> BusResult<Self::Bus> {
        (**self).create(schema)
    }
}

/// [`BusFactory`] backed by a closure.
pub struct FnFactory<F>(F);

/// Use a closure as a [`BusFactory`].
pub fn factory_fn<F, B>(create: F) -> FnFactory<F>
where
    F: Fn(&EventSchema) -> BusResult<B>,
    B: EventBus + 'static,
{
    FnFactory(create)
}

impl<F, B> BusFactory for FnFactory<F>
where
    F: Fn(&EventSchema) -> BusResult<B>,
    B: EventBus + 'static,
{
    type Bus = B;

    fn create(&self, schema: &EventSchema) -> BusResult<B> {
        (self.0)(schema)
    }
}

impl<F> fmt::Debug for FnFactory<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFactory").finish_non_exhaustive()
    }
}

/// Capability to deregister one handler.
///
/// Releasing is idempotent: the deregistration runs on the first
/// [`Unsubscribe::release`] call and never again. Dropping an unreleased
/// handle does not deregister; hold handles in a scoped set that releases
/// them.
#[must_use = "dropping an Unsubscribe leaves the handler registered"]
pub struct Unsubscribe {
    event: String,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Unsubscribe {
    /// Wrap the deregistration for a handler subscribed to `event`.
    pub fn new<F>(event: impl Into<String>, release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            event: event.into(),
            release: Some(Box::new(release)),
        }
    }

    /// The event this handle deregisters from.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Whether the handle has already been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }

    /// Deregister the handler. Returns `false` if it was already released.
    pub fn release(&mut self) -> bool {
        let Some(release) = self.release.take() else {
            return false;
        };
        trace!(event = %self.event, "Releasing subscription");
        release();
        true
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("event", &self.event)
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BusError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_unsubscribe_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut handle = Unsubscribe::new("ping", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(handle.event(), "ping");
        assert!(!handle.is_released());
        assert!(handle.release());
        assert!(handle.is_released());
        assert!(!handle.release());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_does_not_release() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handle = Unsubscribe::new("ping", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(handle);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fn_factory_propagates_error() {
        struct NeverBus(EventSchema);

        impl EventBus for NeverBus {
            fn schema(&self) -> &EventSchema {
                &self.0
            }

            fn publish(&self, event: &str, _payload: Value) -> BusResult<()> {
                Err(BusError::unknown_event(event))
            }

            fn subscribe(&self, event: &str, _handler: RawHandler) -> BusResult<Unsubscribe> {
                Err(BusError::unknown_event(event))
            }
        }

        let factory = factory_fn(|_: &EventSchema| -> BusResult<NeverBus> {
            Err(BusError::Construction("offline".into()))
        });
        let schema = EventSchema::builder()
            .event(&crate::EventKey::<String>::new("ping"))
            .build()
            .unwrap();

        let err = factory.create(&schema).err().unwrap();
        assert!(matches!(err, BusError::Construction(_)));
    }
}
