//! Connection supervision: discovery, open, fault recovery, and backoff.
//!
//! The supervisor is a three-state machine:
//!
//! ```text
//! Disconnected ──connect() ok──▶ Connected
//!      ▲  ◀──read fault / disconnect()──┘
//!      └──connect() err (backoff grows)──┐
//!                                        ▼
//!                                   Attempting
//! ```
//!
//! It owns the only handle to the open device. Any read fault destroys the
//! handle; the bridge loop then sleeps the current backoff delay and retries.
//! A successful open resets the delay to its base immediately.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::{PortProvider, ScannerPort, SerialError};

/// Exponential reconnect delay, bounded above.
///
/// Invariant: `base <= current <= max`. Grows by `multiplier` after each
/// failed open attempt, resets to `base` on success.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    current: Duration,
    base: Duration,
    max: Duration,
    multiplier: f64,
}

impl ReconnectBackoff {
    /// Creates a backoff with explicit parameters.
    pub fn new(base: Duration, max: Duration, multiplier: f64) -> Self {
        Self {
            current: base,
            base,
            max,
            multiplier,
        }
    }

    /// Returns the delay to sleep now and advances the state:
    /// `current = min(current * multiplier, max)`.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.mul_f64(self.multiplier).min(self.max);
        delay
    }

    /// Resets the delay to its base (called on successful open).
    pub fn reset(&mut self) {
        self.current = self.base;
    }

    /// The delay the next failure would sleep, without advancing.
    pub fn current_delay(&self) -> Duration {
        self.current
    }
}

impl Default for ReconnectBackoff {
    /// 1.0 s base, 5.0 s cap, ×1.5 growth.
    fn default() -> Self {
        Self::new(Duration::from_secs_f64(1.0), Duration::from_secs_f64(5.0), 1.5)
    }
}

/// Owns the device handle and drives discover/open/close with backoff.
pub struct ConnectionSupervisor {
    provider: Arc<dyn PortProvider>,
    backoff: ReconnectBackoff,
    port: Option<Box<dyn ScannerPort>>,
}

impl ConnectionSupervisor {
    /// Creates a disconnected supervisor with the default backoff policy.
    pub fn new(provider: Arc<dyn PortProvider>) -> Self {
        Self::with_backoff(provider, ReconnectBackoff::default())
    }

    /// Creates a disconnected supervisor with an explicit backoff policy
    /// (tests use short delays).
    pub fn with_backoff(provider: Arc<dyn PortProvider>, backoff: ReconnectBackoff) -> Self {
        Self {
            provider,
            backoff,
            port: None,
        }
    }

    /// Whether a device handle is currently open.
    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    /// Discovers (when `port` is `None`) and opens the scanner device.
    ///
    /// On success the backoff resets to its base. The previous handle, if
    /// any, is dropped first so at most one device is ever open.
    ///
    /// # Errors
    ///
    /// [`SerialError::DeviceNotFound`] when auto-discovery yields nothing,
    /// or [`SerialError::OpenFailed`] when the open itself fails. Both are
    /// recoverable via the backoff path.
    pub fn connect(&mut self, port: Option<&str>, baud: u32) -> Result<(), SerialError> {
        self.port = None;

        let name = match port {
            Some(name) => name.to_string(),
            None => self.provider.discover().ok_or(SerialError::DeviceNotFound)?,
        };

        let handle = self.provider.open(&name, baud)?;
        info!(port = %name, baud, "connected to scanner");
        self.backoff.reset();
        self.port = Some(handle);
        Ok(())
    }

    /// Bounded-timeout read from the open handle into `buf`.
    ///
    /// # Errors
    ///
    /// [`SerialError::ReadFault`] when the handle faults; callers must
    /// follow up with [`Self::disconnect`].
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        match self.port.as_mut() {
            Some(port) => port.read_chunk(buf),
            None => Err(SerialError::ReadFault(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "no open scanner port",
            ))),
        }
    }

    /// Closes the handle. Idempotent: safe to call when already disconnected.
    pub fn disconnect(&mut self) {
        if self.port.take().is_some() {
            info!("scanner port closed");
        }
    }

    /// Returns the delay to wait after a failed connect and advances the
    /// backoff state.
    pub fn backoff_delay(&mut self) -> Duration {
        let delay = self.backoff.next_delay();
        warn!(delay_ms = delay.as_millis() as u64, "retrying connection after delay");
        delay
    }

    /// Read-only view of the backoff state (for tests and logging).
    pub fn backoff(&self) -> &ReconnectBackoff {
        &self.backoff
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::serial::mock::{MockPortProvider, PortScript};

    // ── Backoff policy ────────────────────────────────────────────────────────

    #[test]
    fn test_backoff_defaults_match_policy() {
        let b = ReconnectBackoff::default();
        assert_eq!(b.current_delay(), Duration::from_secs_f64(1.0));
    }

    #[test]
    fn test_backoff_grows_geometrically_and_caps() {
        // Arrange
        let mut b = ReconnectBackoff::default();

        // Act / Assert – current = min(base * 1.5^n, max) after n failures
        assert_eq!(b.next_delay(), Duration::from_secs_f64(1.0));
        assert_eq!(b.next_delay(), Duration::from_secs_f64(1.5));
        assert_eq!(b.next_delay(), Duration::from_secs_f64(2.25));
        assert_eq!(b.next_delay(), Duration::from_secs_f64(3.375));
        assert_eq!(b.next_delay(), Duration::from_secs_f64(5.0625).min(Duration::from_secs_f64(5.0)));
        // Capped from here on.
        assert_eq!(b.next_delay(), Duration::from_secs_f64(5.0));
        assert_eq!(b.current_delay(), Duration::from_secs_f64(5.0));
    }

    #[test]
    fn test_backoff_reset_restores_base() {
        let mut b = ReconnectBackoff::default();
        b.next_delay();
        b.next_delay();
        b.reset();
        assert_eq!(b.current_delay(), Duration::from_secs_f64(1.0));
    }

    // ── Supervisor lifecycle ──────────────────────────────────────────────────

    #[test]
    fn test_connect_with_explicit_port_opens_it() {
        // Arrange
        let provider = Arc::new(MockPortProvider::new(vec![PortScript::data(b"x")]));
        let mut sup = ConnectionSupervisor::new(Arc::clone(&provider) as Arc<dyn PortProvider>);

        // Act
        sup.connect(Some("COM9"), 9600).expect("open scripted port");

        // Assert
        assert!(sup.is_connected());
        assert_eq!(provider.opened_ports(), vec!["COM9".to_string()]);
    }

    #[test]
    fn test_connect_without_port_uses_discovery() {
        let provider = Arc::new(
            MockPortProvider::new(vec![PortScript::data(b"x")]).with_discovered("/dev/ttyUSB3"),
        );
        let mut sup = ConnectionSupervisor::new(Arc::clone(&provider) as Arc<dyn PortProvider>);

        sup.connect(None, 9600).expect("open discovered port");

        assert_eq!(provider.opened_ports(), vec!["/dev/ttyUSB3".to_string()]);
    }

    #[test]
    fn test_connect_without_port_and_no_discovery_is_device_not_found() {
        let provider = Arc::new(MockPortProvider::new(vec![]));
        let mut sup = ConnectionSupervisor::new(provider);

        let err = sup.connect(None, 9600).unwrap_err();

        assert!(matches!(err, SerialError::DeviceNotFound));
        assert!(!sup.is_connected());
    }

    #[test]
    fn test_failed_open_leaves_supervisor_disconnected() {
        let provider = Arc::new(MockPortProvider::failing_open());
        let mut sup = ConnectionSupervisor::new(provider);

        let err = sup.connect(Some("COM1"), 9600).unwrap_err();

        assert!(matches!(err, SerialError::OpenFailed { .. }));
        assert!(!sup.is_connected());
    }

    #[test]
    fn test_successful_connect_resets_backoff() {
        // Arrange: grow the backoff first
        let provider = Arc::new(MockPortProvider::new(vec![PortScript::data(b"x")]));
        let mut sup = ConnectionSupervisor::new(provider);
        sup.backoff_delay();
        sup.backoff_delay();
        assert!(sup.backoff().current_delay() > Duration::from_secs_f64(1.0));

        // Act
        sup.connect(Some("COM1"), 9600).expect("open");

        // Assert
        assert_eq!(sup.backoff().current_delay(), Duration::from_secs_f64(1.0));
    }

    #[test]
    fn test_read_fault_surfaces_and_disconnect_is_idempotent() {
        // Arrange: port that faults on first read
        let provider = Arc::new(MockPortProvider::new(vec![PortScript::fault()]));
        let mut sup = ConnectionSupervisor::new(provider);
        sup.connect(Some("COM1"), 9600).expect("open");

        // Act
        let mut buf = [0u8; 64];
        let err = sup.read_into(&mut buf).unwrap_err();

        // Assert
        assert!(matches!(err, SerialError::ReadFault(_)));
        sup.disconnect();
        assert!(!sup.is_connected());
        // Idempotent second close.
        sup.disconnect();
        assert!(!sup.is_connected());
    }

    #[test]
    fn test_read_when_disconnected_is_a_fault() {
        let provider = Arc::new(MockPortProvider::new(vec![]));
        let mut sup = ConnectionSupervisor::new(provider);

        let mut buf = [0u8; 8];
        assert!(matches!(
            sup.read_into(&mut buf),
            Err(SerialError::ReadFault(_))
        ));
    }

    #[test]
    fn test_reconnect_replaces_previous_handle() {
        // Two scripted ports; connecting twice must open both, one at a time.
        let provider = Arc::new(MockPortProvider::new(vec![
            PortScript::data(b"a"),
            PortScript::data(b"b"),
        ]));
        let mut sup = ConnectionSupervisor::new(Arc::clone(&provider) as Arc<dyn PortProvider>);

        sup.connect(Some("COM1"), 9600).expect("first open");
        sup.connect(Some("COM2"), 9600).expect("second open");

        assert_eq!(
            provider.opened_ports(),
            vec!["COM1".to_string(), "COM2".to_string()]
        );
        assert!(sup.is_connected());
    }
}
