//! Scripted serial doubles for unit and integration tests.
//!
//! The real port talks to hardware that a test machine does not have, so the
//! doubles replay a fixed script instead: each `read_chunk` call consumes the
//! next scripted event — a chunk of bytes, a quiet (timed-out) window, or an
//! I/O fault. A port whose script has run out reads as quiet forever, which
//! mirrors an idle scanner.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::{PortProvider, ScannerPort, SerialError};

/// One scripted outcome of a `read_chunk` call.
#[derive(Debug, Clone)]
pub enum PortEvent {
    /// The port yields these bytes.
    Data(Vec<u8>),
    /// The read window elapses with no data (`Ok(0)`).
    Quiet,
    /// The port faults (cable pulled).
    Fault,
}

/// The full read script for one opened port.
#[derive(Debug, Clone, Default)]
pub struct PortScript {
    events: Vec<PortEvent>,
}

impl PortScript {
    /// A script from an explicit event sequence.
    pub fn events(events: Vec<PortEvent>) -> Self {
        Self { events }
    }

    /// A script that yields `bytes` once and is quiet afterwards.
    pub fn data(bytes: &[u8]) -> Self {
        Self {
            events: vec![PortEvent::Data(bytes.to_vec())],
        }
    }

    /// A script that faults on the first read.
    pub fn fault() -> Self {
        Self {
            events: vec![PortEvent::Fault],
        }
    }
}

/// In-memory [`ScannerPort`] replaying a [`PortScript`].
pub struct MockPort {
    events: VecDeque<PortEvent>,
}

impl MockPort {
    pub fn new(script: PortScript) -> Self {
        Self {
            events: script.events.into(),
        }
    }
}

impl ScannerPort for MockPort {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        match self.events.pop_front() {
            Some(PortEvent::Data(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                // A chunk larger than the caller's buffer spills into the
                // next read, like a real port's receive queue.
                if n < bytes.len() {
                    self.events.push_front(PortEvent::Data(bytes[n..].to_vec()));
                }
                Ok(n)
            }
            Some(PortEvent::Quiet) | None => Ok(0),
            Some(PortEvent::Fault) => Err(SerialError::ReadFault(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "scripted fault",
            ))),
        }
    }
}

/// [`PortProvider`] double handing out scripted ports in order and recording
/// every open.
pub struct MockPortProvider {
    scripts: Mutex<VecDeque<PortScript>>,
    discovered: Option<String>,
    opened: Mutex<Vec<String>>,
    fail_open: bool,
}

impl MockPortProvider {
    /// Provider whose successive `open` calls return ports replaying
    /// `scripts` in order. Opens beyond the last script yield quiet ports.
    pub fn new(scripts: Vec<PortScript>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            discovered: None,
            opened: Mutex::new(Vec::new()),
            fail_open: false,
        }
    }

    /// Makes `discover` return `name`.
    pub fn with_discovered(mut self, name: &str) -> Self {
        self.discovered = Some(name.to_string());
        self
    }

    /// Provider whose every `open` fails.
    pub fn failing_open() -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            discovered: None,
            opened: Mutex::new(Vec::new()),
            fail_open: true,
        }
    }

    /// Port names passed to `open`, in call order.
    pub fn opened_ports(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl PortProvider for MockPortProvider {
    fn discover(&self) -> Option<String> {
        self.discovered.clone()
    }

    fn open(&self, port: &str, _baud: u32) -> Result<Box<dyn ScannerPort>, SerialError> {
        self.opened.lock().unwrap().push(port.to_string());
        if self.fail_open {
            return Err(SerialError::OpenFailed {
                port: port.to_string(),
                reason: "scripted open failure".to_string(),
            });
        }
        let script = self.scripts.lock().unwrap().pop_front().unwrap_or_default();
        Ok(Box::new(MockPort::new(script)))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
