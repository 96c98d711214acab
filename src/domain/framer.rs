//! Byte-stream framer for scanner bursts.
//!
//! Scanners differ in how they terminate a payload: some append `\r`, some
//! `\n`, some nothing at all. [`FrameBuffer`] handles both styles with two
//! completion conditions:
//!
//! - **Terminator**: a CR or LF byte anywhere in the buffer completes the
//!   frame immediately (low latency when the scanner cooperates).
//! - **Idle gap**: no new bytes for at least the configured idle timeout
//!   completes the frame (guaranteed progress when it does not).
//!
//! The framer is a pure accumulator: it never calls back, the owner polls
//! [`FrameBuffer::is_complete`] and extracts with [`FrameBuffer::take`].
//! Trailing terminator bytes stay in the extracted frame; stripping them is
//! the decoder's job, so multiple terminators in one burst still yield a
//! single record.

use std::time::{Duration, Instant};

/// Accumulates raw scanner bytes until they form one complete frame.
#[derive(Debug)]
pub struct FrameBuffer {
    buf: Vec<u8>,
    /// Monotonic stamp of the most recent `append` call. `None` until the
    /// first append so a fresh buffer can never look idle-complete.
    last_arrival: Option<Instant>,
    idle_timeout: Duration,
}

impl FrameBuffer {
    /// Creates an empty buffer with the given idle timeout in milliseconds.
    pub fn new(idle_timeout_ms: u64) -> Self {
        Self {
            buf: Vec::new(),
            last_arrival: None,
            idle_timeout: Duration::from_millis(idle_timeout_ms),
        }
    }

    /// Appends `bytes` and stamps the arrival time.
    ///
    /// Zero-length appends add no content but are valid calls and still
    /// refresh the stamp.
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.last_arrival = Some(Instant::now());
    }

    /// Whether the buffered bytes form a complete frame.
    ///
    /// True when the buffer is non-empty and either contains a CR/LF byte or
    /// the idle timeout has elapsed since the last append (inclusive compare,
    /// so coarse clocks still make progress). An empty buffer is never
    /// complete.
    pub fn is_complete(&self) -> bool {
        if self.buf.is_empty() {
            return false;
        }
        if self.buf.iter().any(|&b| b == b'\r' || b == b'\n') {
            return true;
        }
        match self.last_arrival {
            Some(t) => t.elapsed() >= self.idle_timeout,
            None => false,
        }
    }

    /// Returns the accumulated bytes and resets the buffer to empty.
    ///
    /// Extraction is atomic with the reset — no byte is ever delivered
    /// twice. Calling on an empty buffer returns an empty `Vec`.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }

    /// Discards any partially accumulated frame (used after a read fault).
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_new_buffer_is_empty_and_incomplete() {
        let fb = FrameBuffer::new(50);
        assert!(fb.is_empty());
        assert!(!fb.is_complete());
    }

    #[test]
    fn test_cr_completes_immediately_regardless_of_timeout() {
        // Arrange: a long timeout so only the terminator condition can fire
        let mut fb = FrameBuffer::new(10_000);

        // Act
        fb.append(b"test\rdata");

        // Assert
        assert!(fb.is_complete());
    }

    #[test]
    fn test_lf_completes_immediately() {
        let mut fb = FrameBuffer::new(10_000);
        fb.append(b"test\ndata");
        assert!(fb.is_complete());
    }

    #[test]
    fn test_terminator_arriving_in_later_append_completes() {
        let mut fb = FrameBuffer::new(10_000);
        fb.append(b"part");
        assert!(!fb.is_complete());
        fb.append(b"ial\n");
        assert!(fb.is_complete());
    }

    #[test]
    fn test_no_terminator_incomplete_before_idle_timeout() {
        let mut fb = FrameBuffer::new(10_000);
        fb.append(b"test data");
        assert!(!fb.is_complete());
    }

    #[test]
    fn test_no_terminator_completes_after_idle_timeout() {
        // Arrange
        let mut fb = FrameBuffer::new(20);
        fb.append(b"test data");

        // Act: let the line go idle past the timeout
        sleep(Duration::from_millis(40));

        // Assert
        assert!(fb.is_complete());
    }

    #[test]
    fn test_fresh_append_resets_idle_clock() {
        let mut fb = FrameBuffer::new(60);
        fb.append(b"first");
        sleep(Duration::from_millis(30));
        fb.append(b"second");
        // Only 30ms since the last arrival — not complete yet.
        assert!(!fb.is_complete());
    }

    #[test]
    fn test_take_returns_everything_including_terminators() {
        let mut fb = FrameBuffer::new(50);
        fb.append(b"test\r\n");
        assert_eq!(fb.take(), b"test\r\n");
    }

    #[test]
    fn test_take_empties_buffer_and_resets_completeness() {
        // Arrange
        let mut fb = FrameBuffer::new(50);
        fb.append(b"scan\r");
        assert!(fb.is_complete());

        // Act
        let frame = fb.take();

        // Assert – buffer empty, empty buffer never complete
        assert_eq!(frame, b"scan\r");
        assert!(fb.is_empty());
        assert!(!fb.is_complete());
    }

    #[test]
    fn test_take_on_empty_buffer_returns_empty_vec() {
        let mut fb = FrameBuffer::new(50);
        assert!(fb.take().is_empty());
    }

    #[test]
    fn test_idle_timeout_never_completes_empty_buffer() {
        // A zero timeout means any non-empty buffer is instantly complete,
        // but an empty one still must not be.
        let mut fb = FrameBuffer::new(0);
        fb.append(b"");
        assert!(fb.is_empty());
        assert!(!fb.is_complete());
    }

    #[test]
    fn test_zero_length_append_is_a_noop_for_content() {
        let mut fb = FrameBuffer::new(50);
        fb.append(b"abc");
        fb.append(b"");
        assert_eq!(fb.len(), 3);
    }

    #[test]
    fn test_clear_discards_partial_frame() {
        let mut fb = FrameBuffer::new(0);
        fb.append(b"partial");
        fb.clear();
        assert!(fb.is_empty());
        assert!(!fb.is_complete());
    }

    #[test]
    fn test_multiple_terminators_still_one_frame() {
        let mut fb = FrameBuffer::new(50);
        fb.append(b"a\rb\nc\r\n");
        assert!(fb.is_complete());
        assert_eq!(fb.take(), b"a\rb\nc\r\n");
        assert!(fb.is_empty());
    }
}
