//! Mebus Core - Interfaces shared by the mebus bindings.
//!
//! This crate provides:
//! - Event schemas and typed event keys
//! - The `EventBus` and `BusFactory` traits the bindings consume
//! - The `ReactiveHost` trait a UI framework adapter implements
//! - Handler and completion types
//! - The `BusError` taxonomy
//!
//! # Architecture
//!
//! Neither the bus nor the reactive runtime live here. Both are external
//! collaborators described by traits; `mebus-hooks` binds them together and
//! `mebus-test` ships in-memory doubles.
//!
//! # Example
//!
//! ```rust
//! use mebus_core::{EventKey, EventSchema, typed_handler};
//!
//! const PING: EventKey<String> = EventKey::new("ping");
//!
//! let schema = EventSchema::builder().event(&PING).build().unwrap();
//! let handler = typed_handler(PING, |text: String| println!("ping: {text}"));
//!
//! schema.validate("ping", &serde_json::json!("x")).unwrap();
//! handler(&serde_json::json!("x")).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod bus;
mod error;
mod handler;
mod host;
mod identity;
mod schema;

pub use bus::{BusFactory, EventBus, FnFactory, Unsubscribe, factory_fn};
pub use error::{BusError, BusResult};
pub use handler::{Completion, IntoCompletion, RawHandler, typed_handler};
pub use host::{Cleanup, Deps, EffectFn, ReactiveHost};
pub use identity::Identity;
pub use schema::{EventKey, EventSchema, SchemaBuilder};
