//! Mock implementations for testing.

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use futures::future::{BoxFuture, join_all};
use serde_json::Value;
use tracing::trace;

use mebus_core::{
    BusError, BusFactory, BusResult, Cleanup, Deps, EffectFn, EventBus, EventSchema, Identity,
    RawHandler, ReactiveHost, Unsubscribe,
};

/// A captured publish.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    /// Event name.
    pub event: String,
    /// Event payload as JSON.
    pub payload: Value,
}

struct Subscriber {
    id: u64,
    event: String,
    handler: RawHandler,
}

struct MockBusInner {
    instance: Identity,
    schema: EventSchema,
    subscribers: Mutex<Vec<Subscriber>>,
    next_subscriber: AtomicU64,
    published: Mutex<Vec<PublishedEvent>>,
    pending: Mutex<Vec<BoxFuture<'static, ()>>>,
    rejected: Mutex<HashSet<String>>,
    subscribes: AtomicUsize,
    releases: AtomicUsize,
}

impl MockBusInner {
    fn remove(&self, id: u64) {
        // Take the subscriber out under the lock, drop it after.
        let removed = self.subscribers.lock().ok().and_then(|mut guard| {
            let index = guard.iter().position(|s| s.id == id)?;
            Some(guard.remove(index))
        });
        if removed.is_some() {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// In-memory, schema-validating event bus.
///
/// Dispatch is synchronous. Deferred completions returned by handlers are
/// queued and only driven by [`MockBus::settle`]. Clones share state.
#[derive(Clone)]
pub struct MockBus {
    inner: Arc<MockBusInner>,
}

impl MockBus {
    /// Create a bus for `schema`.
    #[must_use]
    pub fn new(schema: EventSchema) -> Self {
        Self {
            inner: Arc::new(MockBusInner {
                instance: Identity::fresh(),
                schema,
                subscribers: Mutex::new(Vec::new()),
                next_subscriber: AtomicU64::new(0),
                published: Mutex::new(Vec::new()),
                pending: Mutex::new(Vec::new()),
                rejected: Mutex::new(HashSet::new()),
                subscribes: AtomicUsize::new(0),
                releases: AtomicUsize::new(0),
            }),
        }
    }

    /// Identity of this bus instance, shared by clones.
    #[must_use]
    pub fn instance(&self) -> Identity {
        self.inner.instance
    }

    /// Whether `other` is the same bus instance.
    #[must_use]
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Refuse future subscriptions to `event`.
    pub fn reject_subscriptions_to(&self, event: impl Into<String>) {
        if let Ok(mut guard) = self.inner.rejected.lock() {
            guard.insert(event.into());
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().map(|g| g.len()).unwrap_or(0)
    }

    /// Number of live subscriptions to `event`.
    #[must_use]
    pub fn subscriber_count_for(&self, event: &str) -> usize {
        self.inner
            .subscribers
            .lock()
            .map(|g| g.iter().filter(|s| s.event == event).count())
            .unwrap_or(0)
    }

    /// Events of the live subscriptions, in subscription order.
    #[must_use]
    pub fn subscribed_events(&self) -> Vec<String> {
        self.inner
            .subscribers
            .lock()
            .map(|g| g.iter().map(|s| s.event.clone()).collect())
            .unwrap_or_default()
    }

    /// Total subscriptions ever accepted.
    #[must_use]
    pub fn subscribe_count(&self) -> usize {
        self.inner.subscribes.load(Ordering::SeqCst)
    }

    /// Total subscriptions ever removed.
    #[must_use]
    pub fn release_count(&self) -> usize {
        self.inner.releases.load(Ordering::SeqCst)
    }

    /// All accepted publishes, in order.
    #[must_use]
    pub fn published(&self) -> Vec<PublishedEvent> {
        self.inner
            .published
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    /// Deferred completions not yet settled.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.pending.lock().map(|g| g.len()).unwrap_or(0)
    }

    /// Drive every queued deferred completion to the end.
    pub async fn settle(&self) {
        let pending = self
            .inner
            .pending
            .lock()
            .map(|mut g| std::mem::take(&mut *g))
            .unwrap_or_default();
        join_all(pending).await;
    }
}

impl EventBus for MockBus {
    fn schema(&self) -> &EventSchema {
        &self.inner.schema
    }

    fn publish(&self, event: &str, payload: Value) -> BusResult<()> {
        self.inner.schema.validate(event, &payload)?;

        if let Ok(mut guard) = self.inner.published.lock() {
            guard.push(PublishedEvent {
                event: event.to_owned(),
                payload: payload.clone(),
            });
        }

        // Snapshot so handlers may subscribe or unsubscribe while running.
        let handlers: Vec<RawHandler> = self
            .inner
            .subscribers
            .lock()
            .map(|g| {
                g.iter()
                    .filter(|s| s.event == event)
                    .map(|s| Arc::clone(&s.handler))
                    .collect()
            })
            .unwrap_or_default();

        trace!(event = %event, handlers = handlers.len(), "Dispatching event");

        for handler in handlers {
            if let Some(future) = handler(&payload)?.into_future()
                && let Ok(mut guard) = self.inner.pending.lock()
            {
                guard.push(future);
            }
        }

        Ok(())
    }

    fn subscribe(&self, event: &str, handler: RawHandler) -> BusResult<Unsubscribe> {
        if !self.inner.schema.contains(event) {
            return Err(BusError::unknown_event(event));
        }
        let rejected = self
            .inner
            .rejected
            .lock()
            .map(|g| g.contains(event))
            .unwrap_or(false);
        if rejected {
            return Err(BusError::handler(event, "subscription rejected by bus"));
        }

        let id = self.inner.next_subscriber.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.inner.subscribers.lock() {
            guard.push(Subscriber {
                id,
                event: event.to_owned(),
                handler,
            });
        }
        self.inner.subscribes.fetch_add(1, Ordering::SeqCst);

        let inner: Weak<MockBusInner> = Arc::downgrade(&self.inner);
        Ok(Unsubscribe::new(event, move || {
            if let Some(inner) = inner.upgrade() {
                inner.remove(id);
            }
        }))
    }
}

impl fmt::Debug for MockBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockBus")
            .field("instance", &self.inner.instance)
            .field("schema", &self.inner.schema.id())
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

/// [`BusFactory`] producing [`MockBus`] instances and remembering them.
#[derive(Debug, Clone, Default)]
pub struct MockBusFactory {
    created: Arc<Mutex<Vec<MockBus>>>,
    fail_next: Arc<Mutex<Option<String>>>,
    rejected: Vec<String>,
}

impl MockBusFactory {
    /// Create a new factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every bus created by this factory will refuse subscriptions to `event`.
    #[must_use]
    pub fn with_rejected_event(mut self, event: impl Into<String>) -> Self {
        self.rejected.push(event.into());
        self
    }

    /// Make the next `create` call fail with `reason`.
    pub fn fail_next(&self, reason: impl Into<String>) {
        if let Ok(mut guard) = self.fail_next.lock() {
            *guard = Some(reason.into());
        }
    }

    /// All buses created so far, oldest first.
    #[must_use]
    pub fn created(&self) -> Vec<MockBus> {
        self.created.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Number of buses created so far.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.created.lock().map(|g| g.len()).unwrap_or(0)
    }

    /// The most recently created bus.
    #[must_use]
    pub fn last(&self) -> Option<MockBus> {
        self.created.lock().ok().and_then(|g| g.last().cloned())
    }
}

impl BusFactory for MockBusFactory {
    type Bus = MockBus;

    fn create(&self, schema: &EventSchema) -> BusResult<MockBus> {
        if let Some(reason) = self.fail_next.lock().ok().and_then(|mut g| g.take()) {
            return Err(BusError::Construction(reason));
        }

        let bus = MockBus::new(schema.clone());
        for event in &self.rejected {
            bus.reject_subscriptions_to(event.clone());
        }
        if let Ok(mut guard) = self.created.lock() {
            guard.push(bus.clone());
        }
        Ok(bus)
    }
}

enum Slot {
    Empty,
    Memo {
        deps: Deps,
        value: Box<dyn Any + Send>,
    },
    Effect {
        deps: Option<Deps>,
        cleanup: Option<Cleanup>,
    },
}

/// Minimal component host with positional hook slots.
///
/// Each [`MockHost::render`] replays the component's memo and effect calls
/// against the slots of the previous render. Effects run synchronously when
/// called. Dropping the host unmounts it.
#[derive(Default)]
pub struct MockHost {
    slots: Vec<Slot>,
    cursor: usize,
    renders: usize,
    effect_runs: usize,
    cleanup_runs: usize,
    mounted: bool,
}

impl MockHost {
    /// Create an unmounted host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the component once.
    pub fn render<R>(&mut self, component: impl FnOnce(&mut Self) -> R) -> R {
        self.cursor = 0;
        self.mounted = true;
        self.renders = self.renders.saturating_add(1);
        component(self)
    }

    /// Tear the component down, running every outstanding effect cleanup in
    /// slot order.
    pub fn unmount(&mut self) {
        for slot in &mut self.slots {
            if let Slot::Effect { cleanup, .. } = slot
                && let Some(cleanup) = cleanup.take()
            {
                cleanup();
                self.cleanup_runs = self.cleanup_runs.saturating_add(1);
            }
        }
        self.slots.clear();
        self.mounted = false;
    }

    /// Whether the component is mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Number of renders so far.
    #[must_use]
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Number of effect runs so far.
    #[must_use]
    pub fn effect_runs(&self) -> usize {
        self.effect_runs
    }

    /// Number of cleanups run so far.
    #[must_use]
    pub fn cleanup_runs(&self) -> usize {
        self.cleanup_runs
    }

    fn next_slot(&mut self) -> usize {
        let index = self.cursor;
        self.cursor = self.cursor.saturating_add(1);
        while self.slots.len() <= index {
            self.slots.push(Slot::Empty);
        }
        index
    }

    fn store(&mut self, index: usize, slot: Slot) {
        if let Some(existing) = self.slots.get_mut(index) {
            *existing = slot;
        }
    }
}

impl ReactiveHost for MockHost {
    fn try_memo<T, E, F>(&mut self, deps: &Deps, compute: F) -> Result<T, E>
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> Result<T, E>,
    {
        let index = self.next_slot();
        if let Some(Slot::Memo { deps: previous, value }) = self.slots.get(index)
            && previous == deps
            && let Some(value) = value.downcast_ref::<T>()
        {
            return Ok(value.clone());
        }

        let value = compute()?;
        self.store(
            index,
            Slot::Memo {
                deps: deps.clone(),
                value: Box::new(value.clone()),
            },
        );
        Ok(value)
    }

    fn effect(&mut self, deps: &Deps, effect: EffectFn) -> BusResult<()> {
        let index = self.next_slot();
        let unchanged = matches!(
            self.slots.get(index),
            Some(Slot::Effect { deps: Some(previous), .. }) if previous == deps
        );
        if unchanged {
            return Ok(());
        }

        if let Some(Slot::Effect { cleanup, .. }) = self.slots.get_mut(index)
            && let Some(cleanup) = cleanup.take()
        {
            cleanup();
            self.cleanup_runs = self.cleanup_runs.saturating_add(1);
        }

        self.effect_runs = self.effect_runs.saturating_add(1);
        match effect() {
            Ok(cleanup) => {
                self.store(
                    index,
                    Slot::Effect {
                        deps: Some(deps.clone()),
                        cleanup,
                    },
                );
                Ok(())
            },
            Err(e) => {
                self.store(
                    index,
                    Slot::Effect {
                        deps: None,
                        cleanup: None,
                    },
                );
                Err(e)
            },
        }
    }
}

impl Drop for MockHost {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for MockHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockHost")
            .field("slots", &self.slots.len())
            .field("renders", &self.renders)
            .field("effect_runs", &self.effect_runs)
            .field("cleanup_runs", &self.cleanup_runs)
            .field("mounted", &self.mounted)
            .finish()
    }
}

/// Records every payload a handler receives.
#[derive(Debug)]
pub struct Recorder<P> {
    calls: Arc<Mutex<Vec<P>>>,
}

impl<P> Clone for Recorder<P> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<P> Default for Recorder<P> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<P: Clone + Send + 'static> Recorder<P> {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler that records its payload.
    pub fn handler(&self) -> impl Fn(P) + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        move |payload| {
            if let Ok(mut guard) = calls.lock() {
                guard.push(payload);
            }
        }
    }

    /// Recorded payloads, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<P> {
        self.calls.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Number of recorded payloads.
    #[must_use]
    pub fn count(&self) -> usize {
        self.calls.lock().map(|g| g.len()).unwrap_or(0)
    }
}
