//! Scoped acquisition of subscriptions.

use std::sync::Arc;

use tracing::{debug, trace};

use mebus_core::{BusError, BusResult, Cleanup, EventBus, EventSchema, Unsubscribe};

use crate::callbacks::EventCallbacks;

/// All subscriptions made by one effect run.
///
/// Handles are released exactly once, in acquisition order, by
/// [`SubscriptionSet::release`] or when the set is dropped, whichever comes
/// first.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    handles: Vec<Unsubscribe>,
}

impl SubscriptionSet {
    /// Subscribe every schema event that has a callback.
    ///
    /// Events are visited in schema declaration order. Events without a
    /// callback are skipped; callbacks for events the schema does not
    /// declare are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Schema`] before subscribing anything if a typed
    /// callback's payload type differs from the schema's. Otherwise returns
    /// the bus's subscribe error; handles acquired before the failure are
    /// released first.
    pub fn acquire<B>(bus: &B, schema: &EventSchema, callbacks: &EventCallbacks) -> BusResult<Self>
    where
        B: EventBus + ?Sized,
    {
        check_payload_types(schema, callbacks)?;

        let mut set = Self::default();

        for event in schema.names() {
            let Some(handler) = callbacks.get(event) else {
                trace!(event = %event, "No callback for event");
                continue;
            };
            set.handles.push(bus.subscribe(event, Arc::clone(handler))?);
        }

        if set.len() < callbacks.len() {
            let ignored: Vec<_> = callbacks
                .events()
                .filter(|event| !schema.contains(event))
                .collect();
            debug!(?ignored, schema = %schema.id(), "Callbacks outside the schema ignored");
        }

        debug!(
            schema = %schema.id(),
            callbacks = %callbacks.id(),
            subscriptions = set.len(),
            "Subscriptions acquired"
        );
        Ok(set)
    }

    /// Number of handles held, released or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether no subscription was made.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Subscribed events, in acquisition order.
    #[must_use]
    pub fn events(&self) -> Vec<&str> {
        self.handles.iter().map(Unsubscribe::event).collect()
    }

    /// Number of handles not yet released.
    #[must_use]
    pub fn live(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_released()).count()
    }

    /// Release every handle not yet released. Returns how many were.
    pub fn release(&mut self) -> usize {
        let mut released: usize = 0;
        for handle in &mut self.handles {
            if handle.release() {
                released = released.saturating_add(1);
            }
        }
        if released > 0 {
            debug!(released = released, "Subscriptions released");
        }
        released
    }

    /// Turn the set into an effect cleanup.
    #[must_use]
    pub fn into_cleanup(self) -> Cleanup {
        Box::new(move || {
            let mut set = self;
            set.release();
        })
    }
}

/// Reject typed callbacks whose payload type differs from the schema's.
fn check_payload_types(schema: &EventSchema, callbacks: &EventCallbacks) -> BusResult<()> {
    for event in schema.names() {
        if let Some(expected) = schema.payload_type(event)
            && let Some(actual) = callbacks.payload_type(event)
            && actual != expected
        {
            return Err(BusError::Schema(format!(
                "callback for `{event}` takes `{actual}`, schema declares `{expected}`"
            )));
        }
    }
    Ok(())
}

impl Drop for SubscriptionSet {
    fn drop(&mut self) {
        self.release();
    }
}
