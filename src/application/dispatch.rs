//! Output dispatch use case: deliver decoded scan text to the user.
//!
//! Whether native keystroke injection is available is decided **once** at
//! startup and baked into an [`OutputMode`]; the dispatcher itself contains
//! no platform branches. On hosts with injection support the text becomes
//! per-character input events in the focused window, with a per-delivery
//! failover to a higher-level typing simulation. Everywhere else the text is
//! echoed as a prefixed line on a side channel — that is the designed
//! behavior on such hosts, not a degraded error path.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

/// Error type for delivery operations.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The native event-posting primitive failed.
    #[error("native injection failed: {0}")]
    Native(String),
    /// The higher-level typing simulation failed.
    #[error("typing simulation failed: {0}")]
    Simulation(String),
    /// The console side channel could not be written.
    #[error("console echo failed: {0}")]
    Echo(String),
    /// Both the native primitive and the fallback failed for one delivery.
    #[error("all delivery mechanisms failed: {native}; {fallback}")]
    AllMechanismsFailed { native: String, fallback: String },
}

/// The host's low-level event-posting primitive, bound to the currently
/// focused window.
pub trait CharInjector: Send + Sync {
    /// Best-effort request to disable IME composition on the focused window.
    ///
    /// # Errors
    ///
    /// Failures here are logged by the dispatcher and never fatal.
    fn suppress_ime(&self) -> Result<(), DispatchError>;

    /// Posts one character-input event per character of `text`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Native`] when the OS call fails; the
    /// dispatcher then fails over for this delivery only.
    fn post_chars(&self, text: &str) -> Result<(), DispatchError>;
}

/// The host's higher-level simulate-typing primitive (failover target).
pub trait TypingSimulator: Send + Sync {
    /// Types `text` into whatever has focus.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Simulation`] when the simulation fails.
    fn type_text(&self, text: &str) -> Result<(), DispatchError>;
}

/// Observable side channel for hosts without keystroke injection.
pub trait ScanEcho: Send + Sync {
    /// Emits `text` as one identifiable scanned-record line.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Echo`] when the channel cannot be written.
    fn echo(&self, text: &str) -> Result<(), DispatchError>;
}

/// Delivery mechanism selected once at startup.
pub enum OutputMode {
    /// Native injection is available on this host.
    Native {
        injector: Arc<dyn CharInjector>,
        fallback: Arc<dyn TypingSimulator>,
    },
    /// No injection support; echo scans on the side channel.
    Console { echo: Arc<dyn ScanEcho> },
}

/// The dispatch use case. Fixed for the process lifetime.
pub struct OutputDispatcher {
    mode: OutputMode,
    suppress_ime: bool,
}

impl OutputDispatcher {
    /// Creates a dispatcher for the resolved `mode`. `suppress_ime` only
    /// affects the native path.
    pub fn new(mode: OutputMode, suppress_ime: bool) -> Self {
        Self { mode, suppress_ime }
    }

    /// Delivers one decoded record.
    ///
    /// Native path: optional best-effort IME suppression, then per-character
    /// event posting; on failure the typing simulation is tried for this
    /// delivery only.
    ///
    /// # Errors
    ///
    /// [`DispatchError::AllMechanismsFailed`] when both native and fallback
    /// fail, or [`DispatchError::Echo`] when the console channel fails. The
    /// caller logs the error and drops the record; delivery failures never
    /// stop the bridge.
    pub fn dispatch(&self, text: &str) -> Result<(), DispatchError> {
        match &self.mode {
            OutputMode::Native { injector, fallback } => {
                if self.suppress_ime {
                    if let Err(e) = injector.suppress_ime() {
                        warn!(error = %e, "IME suppression failed, continuing");
                    }
                }
                match injector.post_chars(text) {
                    Ok(()) => {
                        debug!(chars = text.chars().count(), "delivered via native injection");
                        Ok(())
                    }
                    Err(native_err) => {
                        warn!(error = %native_err, "native injection failed, trying simulation");
                        match fallback.type_text(text) {
                            Ok(()) => {
                                debug!("delivered via typing simulation fallback");
                                Ok(())
                            }
                            Err(fallback_err) => Err(DispatchError::AllMechanismsFailed {
                                native: native_err.to_string(),
                                fallback: fallback_err.to_string(),
                            }),
                        }
                    }
                }
            }
            OutputMode::Console { echo } => echo.echo(text),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
