//! Prelude module - commonly used types for convenient import.
//!
//! Use `use mebus_hooks::prelude::*;` to import all essential types.

pub use crate::{
    BindingConfig, EventCallbacks, MeBusHook, Publisher, SubscriptionSet, use_me_bus,
};
