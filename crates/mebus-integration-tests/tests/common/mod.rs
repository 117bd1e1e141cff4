//! Shared harness for integration tests.

use mebus_core::{BusResult, EventSchema};
use mebus_hooks::{BindingConfig, EventCallbacks, MeBusHook, Publisher};
use mebus_test::{MockBus, MockBusFactory, MockHost, init_test_logging};

/// A component that calls the binding hook once per render.
///
/// Schema and callbacks are props: set them, then render.
#[allow(dead_code)]
pub struct TestComponent {
    /// The host driving the component.
    pub host: MockHost,
    /// Factory every bus is created with.
    pub factory: MockBusFactory,
    /// Current schema prop.
    pub schema: EventSchema,
    /// Current callbacks prop.
    pub callbacks: Option<EventCallbacks>,
    hook: MeBusHook<MockBusFactory>,
}

#[allow(dead_code)]
impl TestComponent {
    /// Mount-ready component with the default binding configuration.
    pub fn new(schema: EventSchema, callbacks: Option<EventCallbacks>) -> Self {
        Self::with_config(
            MockBusFactory::new(),
            BindingConfig::default(),
            schema,
            callbacks,
        )
    }

    /// Component with an explicit factory and configuration.
    pub fn with_config(
        factory: MockBusFactory,
        config: BindingConfig,
        schema: EventSchema,
        callbacks: Option<EventCallbacks>,
    ) -> Self {
        init_test_logging();
        Self {
            host: MockHost::new(),
            hook: MeBusHook::with_config(factory.clone(), config),
            factory,
            schema,
            callbacks,
        }
    }

    /// Render once with the current props.
    pub fn render(&mut self) -> BusResult<Publisher<MockBus>> {
        let Self {
            host,
            hook,
            schema,
            callbacks,
            ..
        } = self;
        host.render(|h| hook.bind(h, schema, callbacks.as_ref()))
    }

    /// Tear the component down.
    pub fn unmount(&mut self) {
        self.host.unmount();
    }

    /// Every bus created so far, oldest first.
    pub fn buses(&self) -> Vec<MockBus> {
        self.factory.created()
    }

    /// Total live subscriptions across every bus created so far.
    pub fn live_subscriptions(&self) -> usize {
        self.buses().iter().map(MockBus::subscriber_count).sum()
    }
}
