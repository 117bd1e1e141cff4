//! Mebus Hooks - Bind schema-typed event buses to component lifecycles.
//!
//! This crate provides:
//! - [`MeBusHook`] / [`use_me_bus`]: one bus per schema, subscriptions scoped
//!   to the component's effect lifecycle
//! - [`Publisher`]: the publish function handed back to the component
//! - [`EventCallbacks`]: per-event handler maps
//! - [`SubscriptionSet`]: releases every subscription of one effect run
//! - [`BindingConfig`]: binding behaviour, loadable from TOML
//!
//! # Example
//!
//! ```rust
//! use mebus_hooks::{EventCallbacks, use_me_bus};
//! use mebus_test::{MockBusFactory, MockHost, PING, ping_schema};
//!
//! let factory = MockBusFactory::new();
//! let mut host = MockHost::new();
//! let schema = ping_schema();
//! let callbacks = EventCallbacks::new().on(&PING, |text: String| println!("ping: {text}"));
//!
//! let publish = host
//!     .render(|h| use_me_bus(h, &factory, &schema, Some(&callbacks)))
//!     .unwrap();
//! publish.publish(&PING, "x".to_string()).unwrap();
//!
//! host.unmount();
//! assert_eq!(factory.last().unwrap().subscriber_count(), 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod binding;
mod callbacks;
mod config;
mod subscription;

pub use binding::{MeBusHook, Publisher, use_me_bus};
pub use callbacks::EventCallbacks;
pub use config::{BindingConfig, ConfigError, ConfigResult};
pub use subscription::SubscriptionSet;
