//! Test harness helpers.

use std::sync::Once;

use mebus_telemetry::{LogConfig, LogTarget, setup_logging};

static INIT: Once = Once::new();

/// Route `tracing` output through the libtest capture writer.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// `RUST_LOG` overrides the default `debug` level.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let config = LogConfig::new("debug").with_target(LogTarget::Test);
        // Another harness may already own the global subscriber.
        let _ = setup_logging(&config);
    });
}
