//! qr2key library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does qr2key do?
//!
//! A handheld QR scanner decodes the QR image itself and emits the decoded
//! payload as a burst of bytes on a USB virtual COM port (a CH340
//! USB-to-serial bridge). This crate:
//!
//! 1. Finds and opens the scanner's serial port, reconnecting with bounded
//!    exponential backoff whenever the cable is unplugged.
//! 2. Accumulates the byte stream until a CR/LF terminator arrives or the
//!    line goes idle, so one scan becomes exactly one record.
//! 3. Decodes the record (Shift_JIS first, then UTF-8, then lossy).
//! 4. Delivers the text as keystrokes into the focused window on Windows,
//!    or as a prefixed line on stdout elsewhere.

/// Domain layer: pure framing, decoding, and configuration types.
pub mod domain;

/// Application layer: the bridge loop and the output dispatch use case.
pub mod application;

/// Infrastructure layer: serial port adapters and OS output adapters.
pub mod infrastructure;
