//! TOML-based runtime configuration.
//!
//! The config file is deliberately tiny — four fields, all optional:
//!
//! ```toml
//! port = "COM5"      # omit for auto-discovery of the scanner's CH340 port
//! baud = 9600
//! buffer_ms = 50     # idle gap that closes a frame when no terminator arrives
//! ime_off = true     # suppress the IME before injecting characters
//! ```
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent, so a partial file works the same
//! as a complete one. A missing or unparsable file is not an error either:
//! [`AppConfig::load`] logs a warning and proceeds with defaults, because a
//! scanner bridge that refuses to start over a typo in its config helps
//! nobody.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Error type for configuration file operations.
///
/// Only surfaced by [`AppConfig::from_toml`]; the [`AppConfig::load`] entry
/// point recovers from every variant by falling back to defaults.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred while reading the config file.
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Runtime settings for the scanner bridge. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Serial port name (e.g. `COM5`, `/dev/ttyUSB0`). `None` triggers
    /// auto-discovery of the scanner's CH340 adapter.
    #[serde(default)]
    pub port: Option<String>,
    /// Serial line rate in baud.
    #[serde(default = "default_baud")]
    pub baud: u32,
    /// Idle gap in milliseconds after which buffered bytes count as one
    /// complete scan even without a CR/LF terminator.
    #[serde(default = "default_buffer_ms")]
    pub buffer_ms: u64,
    /// Whether to send a best-effort IME-off request to the focused window
    /// before injecting characters.
    #[serde(default = "default_true")]
    pub ime_off: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_baud() -> u32 {
    9600
}
fn default_buffer_ms() -> u64 {
    50
}
fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: default_baud(),
            buffer_ms: default_buffer_ms(),
            ime_off: default_true(),
        }
    }
}

impl AppConfig {
    /// Parses a TOML document into an `AppConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the TOML is malformed.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads configuration from `path`, falling back to defaults.
    ///
    /// This function is total: a missing file, unreadable file, or malformed
    /// TOML logs a warning and yields `AppConfig::default()`.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path).map_err(ConfigError::from) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(cfg) => {
                    info!(path = %path.display(), "loaded configuration");
                    cfg
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config not readable, using defaults");
                Self::default()
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
