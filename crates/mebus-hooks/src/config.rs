//! Binding configuration.
//!
//! ```toml
//! # Release and re-subscribe when a new callback map is passed in while the
//! # schema stays the same. When false, only a schema change re-subscribes.
//! resubscribe_on_callback_change = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors loading a [`BindingConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The document is not a valid binding config.
    #[error("failed to parse binding config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables for [`crate::MeBusHook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BindingConfig {
    /// Whether a callback map with a new identity refreshes subscriptions.
    pub resubscribe_on_callback_change: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            resubscribe_on_callback_change: true,
        }
    }
}

impl BindingConfig {
    /// Set [`BindingConfig::resubscribe_on_callback_change`].
    #[must_use]
    pub fn with_resubscribe_on_callback_change(mut self, enabled: bool) -> Self {
        self.resubscribe_on_callback_change = enabled;
        self
    }

    /// Parse a TOML document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown fields.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is not a valid config.
    pub fn load_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), ?config, "loaded binding config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        assert!(BindingConfig::default().resubscribe_on_callback_change);
        assert_eq!(
            BindingConfig::from_toml_str("").unwrap(),
            BindingConfig::default()
        );
    }

    #[test]
    fn test_parse() {
        let config = BindingConfig::from_toml_str("resubscribe_on_callback_change = false").unwrap();
        assert!(!config.resubscribe_on_callback_change);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = BindingConfig::from_toml_str("resubscribe = false").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "resubscribe_on_callback_change = false").unwrap();

        let config = BindingConfig::load_file(file.path()).unwrap();
        assert!(!config.resubscribe_on_callback_change);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BindingConfig::load_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }
}
