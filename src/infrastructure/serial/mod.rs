//! Serial device abstraction.
//!
//! The bridge loop never touches the `serialport` crate directly — it talks
//! to two small traits so that tests can substitute scripted in-memory
//! doubles:
//!
//! - [`ScannerPort`] is one open device handle with bounded-timeout reads.
//! - [`PortProvider`] enumerates candidate devices and opens them.
//!
//! The real implementations live in [`system`]; the test doubles in [`mock`];
//! the reconnect state machine that owns the handle in [`supervisor`].

pub mod mock;
pub mod supervisor;
pub mod system;

use thiserror::Error;

pub use supervisor::{ConnectionSupervisor, ReconnectBackoff};

/// Errors from device discovery, open, and read operations.
///
/// All variants are recoverable: discovery and open failures feed the
/// backoff/retry path, and a read fault closes the handle and triggers a
/// reconnect. None of them abort the process.
#[derive(Debug, Error)]
pub enum SerialError {
    /// Auto-discovery found no port matching the scanner's signature.
    #[error("no serial port matching the scanner signature was found")]
    DeviceNotFound,

    /// The named port exists but could not be opened.
    #[error("failed to open serial port {port}: {reason}")]
    OpenFailed { port: String, reason: String },

    /// An I/O fault occurred on an established connection.
    #[error("serial read fault: {0}")]
    ReadFault(#[from] std::io::Error),
}

/// One open scanner device. Reads are bounded by a short timeout so the
/// caller's loop always regains control; a quiet window reads as `Ok(0)`.
pub trait ScannerPort: Send {
    /// Reads whatever bytes are available into `buf` within the port's read
    /// timeout. Returns `Ok(0)` when the window elapses with no data.
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::ReadFault`] on an I/O fault (e.g. the cable
    /// was unplugged); the handle must be considered dead afterwards.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, SerialError>;
}

/// Enumerates and opens serial devices on behalf of the supervisor.
pub trait PortProvider: Send + Sync {
    /// Returns the name of the first available port whose descriptor matches
    /// the expected scanner signature, or `None` if nothing matches.
    fn discover(&self) -> Option<String>;

    /// Opens `port` at `baud` with a short read timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::OpenFailed`] when the device cannot be opened.
    fn open(&self, port: &str, baud: u32) -> Result<Box<dyn ScannerPort>, SerialError>;
}
