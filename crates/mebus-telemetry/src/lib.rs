//! Mebus Telemetry - Logging setup for mebus bindings.
//!
//! The library crates only emit `tracing` events. Applications and test
//! harnesses call [`setup_logging`] once to decide where those go.
//!
//! # Example
//!
//! ```rust,no_run
//! use mebus_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), mebus_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Pretty)
//!     .with_directive("mebus_hooks=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("bindings ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
