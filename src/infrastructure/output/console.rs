//! Console side channel for hosts without keystroke injection.

use std::io::Write;

use crate::application::dispatch::{DispatchError, ScanEcho};

/// Prefix identifying scanned-record lines among other stdout output.
const SCAN_PREFIX: &str = "QR: ";

/// Writes each scanned record as one prefixed line on stdout.
pub struct ConsoleEcho;

impl ConsoleEcho {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleEcho {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanEcho for ConsoleEcho {
    fn echo(&self, text: &str) -> Result<(), DispatchError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{SCAN_PREFIX}{text}")
            .and_then(|()| stdout.flush())
            .map_err(|e| DispatchError::Echo(e.to_string()))
    }
}
