//! Prelude module - commonly used types for convenient import.
//!
//! Use `use mebus_core::prelude::*;` to import all essential types.

// Schemas
pub use crate::{EventKey, EventSchema, Identity, SchemaBuilder};

// Bus interface
pub use crate::{BusFactory, EventBus, Unsubscribe, factory_fn};

// Handlers
pub use crate::{Completion, IntoCompletion, RawHandler, typed_handler};

// Reactive host
pub use crate::{Cleanup, Deps, EffectFn, ReactiveHost};

// Errors
pub use crate::{BusError, BusResult};
