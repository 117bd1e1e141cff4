//! Mebus Test - Shared test utilities for the mebus bindings.
//!
//! This crate provides in-memory doubles for the two collaborators the
//! bindings consume, plus fixtures:
//!
//! - [`MockBus`] / [`MockBusFactory`]: schema-validating event bus
//! - [`MockHost`]: positional memo/effect host with render and unmount
//! - [`Recorder`]: captures handler payloads
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! mebus-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use mebus_test::{MockBusFactory, MockHost, PING, ping_schema};
//!
//! let factory = MockBusFactory::new();
//! let mut host = MockHost::new();
//! let schema = ping_schema();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
