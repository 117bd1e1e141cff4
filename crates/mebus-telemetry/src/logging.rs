//! Logging configuration and subscriber installation.

use serde::Deserialize;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::{TelemetryError, TelemetryResult};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Multi-line human-readable output.
    Pretty,
    /// Single-line human-readable output.
    #[default]
    Compact,
    /// Newline-delimited JSON.
    Json,
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogTarget {
    /// Standard output.
    Stdout,
    /// Standard error.
    #[default]
    Stderr,
    /// The libtest capture writer, so output only shows for failing tests.
    Test,
}

/// Logging configuration.
///
/// `RUST_LOG`, when set, takes precedence over [`LogConfig::level`].
/// [`LogConfig::directives`] are applied on top of either.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Default level (`trace`, `debug`, `info`, `warn`, `error`, `off`).
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Extra per-target directives, e.g. `mebus_hooks=trace`.
    pub directives: Vec<String>,
    /// Output destination.
    pub target: LogTarget,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new("info")
    }
}

impl LogConfig {
    /// Create a config with the given default level.
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::default(),
            directives: Vec::new(),
            target: LogTarget::default(),
        }
    }

    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Add a per-target directive.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Set the output destination.
    #[must_use]
    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.target = target;
        self
    }

    /// Build the filter this config describes.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::ConfigError`] for an unknown level, an
    /// unparsable directive, or an invalid `RUST_LOG`.
    pub fn env_filter(&self) -> TelemetryResult<EnvFilter> {
        let level: LevelFilter = self.level.parse().map_err(|_| {
            TelemetryError::ConfigError(format!("invalid log level: {}", self.level))
        })?;

        let mut filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env()
            .map_err(|e| TelemetryError::ConfigError(format!("invalid RUST_LOG: {e}")))?;

        for directive in &self.directives {
            let parsed: Directive = directive.parse().map_err(|e| {
                TelemetryError::ConfigError(format!("invalid directive `{directive}`: {e}"))
            })?;
            filter = filter.add_directive(parsed);
        }

        Ok(filter)
    }

    fn writer(&self) -> BoxMakeWriter {
        match self.target {
            LogTarget::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogTarget::Test => BoxMakeWriter::new(fmt::TestWriter::new()),
        }
    }
}

/// Install a global subscriber for `config`.
///
/// # Errors
///
/// Returns [`TelemetryError::ConfigError`] if the filter is invalid and
/// [`TelemetryError::InitError`] if a global subscriber is already set.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.env_filter()?;
    let builder = fmt().with_env_filter(filter).with_writer(config.writer());

    let result = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| TelemetryError::InitError(e.to_string()))
}

/// Install a compact `info` subscriber on stderr.
///
/// # Errors
///
/// Returns [`TelemetryError::InitError`] if a global subscriber is already set.
pub fn setup_default_logging() -> TelemetryResult<()> {
    setup_logging(&LogConfig::default())
}
