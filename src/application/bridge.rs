//! The bridge loop: poll the scanner, frame bytes, decode, dispatch.
//!
//! One cooperative loop owns the device handle and the frame buffer, so no
//! locking is needed anywhere in the pipeline. Every iteration:
//!
//! 1. reconnect (with backoff) if the handle is gone — the framer is left
//!    untouched on a failed attempt;
//! 2. bounded-timeout read, appending any bytes to the framer;
//! 3. if the framer reports a complete frame, extract → decode → dispatch
//!    (empty decodes are dropped before dispatch);
//! 4. sleep a short fixed interval to bound CPU between polls.
//!
//! A read fault closes the handle, discards the partial frame, and lets the
//! next iteration reconnect. The loop exits only when the external stop flag
//! clears, and closes the handle unconditionally on the way out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::application::dispatch::OutputDispatcher;
use crate::domain::{decode_scan, AppConfig, FrameBuffer};
use crate::infrastructure::serial::ConnectionSupervisor;

/// Upper bound on one uninterrupted sleep, so the stop flag stays responsive
/// even while waiting out a multi-second backoff delay.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Composes the supervisor, framer, decoder, and dispatcher into the
/// run-until-stopped scanning loop.
pub struct ScanBridge {
    config: AppConfig,
    supervisor: ConnectionSupervisor,
    framer: FrameBuffer,
    dispatcher: OutputDispatcher,
    running: Arc<AtomicBool>,
    poll_interval: Duration,
}

impl ScanBridge {
    /// Creates a bridge with the standard 10 ms poll interval.
    ///
    /// `running` is the external stop signal: the loop exits once it reads
    /// `false`.
    pub fn new(
        config: AppConfig,
        supervisor: ConnectionSupervisor,
        dispatcher: OutputDispatcher,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self::with_poll_interval(config, supervisor, dispatcher, running, Duration::from_millis(10))
    }

    /// Creates a bridge with an explicit poll interval (tests use ~1 ms to
    /// keep scenarios fast).
    pub fn with_poll_interval(
        config: AppConfig,
        supervisor: ConnectionSupervisor,
        dispatcher: OutputDispatcher,
        running: Arc<AtomicBool>,
        poll_interval: Duration,
    ) -> Self {
        let framer = FrameBuffer::new(config.buffer_ms);
        Self {
            config,
            supervisor,
            framer,
            dispatcher,
            running,
            poll_interval,
        }
    }

    /// Runs until the stop flag clears. Blocking; run it on a dedicated
    /// thread (the binary uses `tokio::task::spawn_blocking`).
    pub fn run(&mut self) {
        info!("scan bridge started");
        let mut buf = [0u8; 256];

        while self.running.load(Ordering::Relaxed) {
            if !self.supervisor.is_connected() {
                if let Err(e) = self
                    .supervisor
                    .connect(self.config.port.as_deref(), self.config.baud)
                {
                    warn!(error = %e, "could not open scanner port");
                    let delay = self.supervisor.backoff_delay();
                    self.sleep_responsive(delay);
                    continue;
                }
            }

            match self.supervisor.read_into(&mut buf) {
                Ok(0) => {}
                Ok(n) => self.framer.append(&buf[..n]),
                Err(e) => {
                    error!(error = %e, "read fault, reconnecting");
                    self.supervisor.disconnect();
                    self.framer.clear();
                    continue;
                }
            }

            if self.framer.is_complete() {
                let frame = self.framer.take();
                let text = decode_scan(&frame);
                if text.is_empty() {
                    debug!(bytes = frame.len(), "frame decoded to empty record, dropped");
                } else {
                    info!(%text, "decoded scan");
                    if let Err(e) = self.dispatcher.dispatch(&text) {
                        error!(error = %e, "delivery failed, record dropped");
                    }
                }
            }

            self.sleep_responsive(self.poll_interval);
        }

        self.supervisor.disconnect();
        info!("scan bridge stopped");
    }

    /// Sleeps `total` in short slices, returning early once the stop flag
    /// clears.
    fn sleep_responsive(&self, total: Duration) {
        let mut remaining = total;
        while remaining > Duration::ZERO && self.running.load(Ordering::Relaxed) {
            let slice = remaining.min(SLEEP_SLICE);
            std::thread::sleep(slice);
            remaining = remaining.saturating_sub(slice);
        }
    }
}
