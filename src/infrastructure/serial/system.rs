//! Real serial device access via the `serialport` crate.
//!
//! The scanner enumerates as a CH340 USB-to-serial bridge. Discovery walks
//! `serialport::available_ports()` and returns the first USB port whose
//! product or manufacturer descriptor mentions the signature, or whose
//! vendor id is WCH's `0x1A86` (the CH340's VID — some platforms report no
//! descriptor strings at all).
//!
//! Opened ports get a short read timeout so the bridge loop keeps polling
//! semantics: a `TimedOut` read is a quiet window, not an error.

use std::io::Read;
use std::time::Duration;

use serialport::{SerialPortInfo, SerialPortType};
use tracing::{debug, info, warn};

use super::{PortProvider, ScannerPort, SerialError};

/// USB vendor id of WCH, maker of the CH340 family.
const CH340_VID: u16 = 0x1A86;

/// Read timeout applied to every opened port.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Provider backed by the host's serial enumeration facility.
pub struct SystemPortProvider {
    signature: String,
}

impl SystemPortProvider {
    /// Provider matching the standard CH340 scanner signature.
    pub fn new() -> Self {
        Self::with_signature("CH340")
    }

    /// Provider matching a custom descriptor substring (tests and unusual
    /// adapters).
    pub fn with_signature(signature: &str) -> Self {
        Self {
            signature: signature.to_string(),
        }
    }

    fn matches(&self, port: &SerialPortInfo) -> bool {
        match &port.port_type {
            SerialPortType::UsbPort(usb) => {
                if usb.vid == CH340_VID {
                    return true;
                }
                usb.product
                    .as_deref()
                    .is_some_and(|s| s.contains(&self.signature))
                    || usb
                        .manufacturer
                        .as_deref()
                        .is_some_and(|s| s.contains(&self.signature))
            }
            _ => false,
        }
    }
}

impl Default for SystemPortProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PortProvider for SystemPortProvider {
    fn discover(&self) -> Option<String> {
        let ports = match serialport::available_ports() {
            Ok(ports) => ports,
            Err(e) => {
                warn!(error = %e, "serial port enumeration failed");
                return None;
            }
        };

        for port in &ports {
            debug!(port = %port.port_name, "enumerated serial port");
            if self.matches(port) {
                info!(port = %port.port_name, "found scanner port");
                return Some(port.port_name.clone());
            }
        }

        warn!(signature = %self.signature, "no matching scanner port found");
        None
    }

    fn open(&self, port: &str, baud: u32) -> Result<Box<dyn ScannerPort>, SerialError> {
        let handle = serialport::new(port, baud)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| SerialError::OpenFailed {
                port: port.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Box::new(SystemPort { inner: handle }))
    }
}

/// One open `serialport` handle.
struct SystemPort {
    inner: Box<dyn serialport::SerialPort>,
}

impl ScannerPort for SystemPort {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        match self.inner.read(buf) {
            Ok(n) => Ok(n),
            // The read timeout elapsing with no data is the normal quiet case.
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(SerialError::ReadFault(e)),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
