//! The binding hook.
//!
//! Per render, the hook:
//! 1. memoizes one bus per schema identity,
//! 2. runs a subscription effect keyed on the schema (and, by default, the
//!    callback map) identity, whose cleanup releases every subscription,
//! 3. hands back a [`Publisher`] for the current bus.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use mebus_core::{
    BusFactory, BusResult, Cleanup, Deps, EventBus, EventKey, EventSchema, ReactiveHost,
};

use crate::callbacks::EventCallbacks;
use crate::config::BindingConfig;
use crate::subscription::SubscriptionSet;

/// Binds buses produced by a [`BusFactory`] to a component lifecycle.
#[derive(Debug, Clone)]
pub struct MeBusHook<F> {
    factory: F,
    config: BindingConfig,
}

impl<F: BusFactory> MeBusHook<F> {
    /// Create a hook with the default configuration.
    pub fn new(factory: F) -> Self {
        Self::with_config(factory, BindingConfig::default())
    }

    /// Create a hook with an explicit configuration.
    pub fn with_config(factory: F, config: BindingConfig) -> Self {
        Self { factory, config }
    }

    /// The hook's configuration.
    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// The factory buses are created with.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Run the hook for one render of the component hosted by `host`.
    ///
    /// # Errors
    ///
    /// Returns bus construction and subscription errors unchanged. A failed
    /// construction is not memoized, so the next render tries again.
    pub fn bind<H>(
        &self,
        host: &mut H,
        schema: &EventSchema,
        callbacks: Option<&EventCallbacks>,
    ) -> BusResult<Publisher<F::Bus>>
    where
        H: ReactiveHost,
    {
        let bus = host.try_memo(&Deps::from([schema.id()]), || {
            debug!(schema = %schema.id(), events = schema.len(), "Creating event bus");
            self.factory.create(schema).map(Arc::new)
        })?;

        let deps = self.effect_deps(schema, callbacks);
        let effect_bus = Arc::clone(&bus);
        let effect_schema = schema.clone();
        let effect_callbacks = callbacks.cloned();

        host.effect(
            &deps,
            Box::new(move || -> BusResult<Option<Cleanup>> {
                let Some(callbacks) = effect_callbacks else {
                    trace!(schema = %effect_schema.id(), "No callbacks to subscribe");
                    return Ok(None);
                };
                let set = SubscriptionSet::acquire(&*effect_bus, &effect_schema, &callbacks)?;
                Ok(Some(set.into_cleanup()))
            }),
        )?;

        Ok(Publisher { bus })
    }

    fn effect_deps(&self, schema: &EventSchema, callbacks: Option<&EventCallbacks>) -> Deps {
        let deps = Deps::new().with(schema.id());
        match callbacks {
            Some(callbacks) if self.config.resubscribe_on_callback_change => {
                deps.with(callbacks.id())
            },
            _ => deps,
        }
    }
}

/// Run the binding hook once with the default configuration.
///
/// Equivalent to `MeBusHook::new(factory).bind(host, schema, callbacks)`.
///
/// # Errors
///
/// See [`MeBusHook::bind`].
pub fn use_me_bus<H, F>(
    host: &mut H,
    factory: &F,
    schema: &EventSchema,
    callbacks: Option<&EventCallbacks>,
) -> BusResult<Publisher<F::Bus>>
where
    H: ReactiveHost,
    F: BusFactory,
{
    MeBusHook::new(factory).bind(host, schema, callbacks)
}

/// Publish function returned by the hook, closed over the current bus.
pub struct Publisher<B> {
    bus: Arc<B>,
}

impl<B: EventBus> Publisher<B> {
    /// Publish a typed payload.
    ///
    /// # Errors
    ///
    /// Returns the encoding error, or whatever the bus returns: validation
    /// failures, unknown events and handler errors alike.
    pub fn publish<P: Serialize>(
        &self,
        key: &EventKey<P>,
        payload: impl Borrow<P>,
    ) -> BusResult<()> {
        let value = key.encode(payload.borrow())?;
        self.bus.publish(key.name(), value)
    }

    /// Publish an untyped payload.
    ///
    /// # Errors
    ///
    /// Returns whatever the bus returns.
    pub fn publish_raw(&self, event: &str, payload: Value) -> BusResult<()> {
        self.bus.publish(event, payload)
    }

    /// The bus this publisher forwards to.
    pub fn bus(&self) -> &Arc<B> {
        &self.bus
    }

    /// The schema of the current bus.
    pub fn schema(&self) -> &EventSchema {
        self.bus.schema()
    }
}

impl<B> Clone for Publisher<B> {
    fn clone(&self) -> Self {
        Self {
            bus: Arc::clone(&self.bus),
        }
    }
}

impl<B: EventBus> fmt::Debug for Publisher<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("schema", &self.bus.schema().id())
            .finish_non_exhaustive()
    }
}
