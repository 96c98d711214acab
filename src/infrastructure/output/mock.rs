//! Recording output doubles for unit and integration tests.
//!
//! The real injectors call OS APIs that require a desktop session and would
//! actually type into the test machine. These doubles record every call in a
//! `Mutex<Vec<...>>` instead, with failure flags to exercise the failover
//! paths: `with_failing_post` fails every native post, `with_failing_post_once`
//! only the first (to prove failover is per-call, not permanent).

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::dispatch::{CharInjector, DispatchError, ScanEcho, TypingSimulator};

/// Records `post_chars` / `suppress_ime` calls; optionally fails them.
#[derive(Default)]
pub struct RecordingInjector {
    posted: Mutex<Vec<String>>,
    ime_suppressions: AtomicUsize,
    fail_post: AtomicBool,
    fail_post_once: AtomicBool,
    fail_ime: bool,
}

impl RecordingInjector {
    /// Every `post_chars` call fails.
    pub fn with_failing_post(self) -> Self {
        self.fail_post.store(true, Ordering::Relaxed);
        self
    }

    /// Only the first `post_chars` call fails.
    pub fn with_failing_post_once(self) -> Self {
        self.fail_post_once.store(true, Ordering::Relaxed);
        self
    }

    /// Every `suppress_ime` call fails.
    pub fn with_failing_ime(mut self) -> Self {
        self.fail_ime = true;
        self
    }

    /// Texts successfully posted, in order.
    pub fn posted(&self) -> Vec<String> {
        self.posted.lock().unwrap().clone()
    }

    /// Number of `suppress_ime` calls that were attempted.
    pub fn ime_suppressions(&self) -> usize {
        self.ime_suppressions.load(Ordering::Relaxed)
    }
}

impl CharInjector for RecordingInjector {
    fn suppress_ime(&self) -> Result<(), DispatchError> {
        self.ime_suppressions.fetch_add(1, Ordering::Relaxed);
        if self.fail_ime {
            return Err(DispatchError::Native("mock IME failure".to_string()));
        }
        Ok(())
    }

    fn post_chars(&self, text: &str) -> Result<(), DispatchError> {
        if self.fail_post.load(Ordering::Relaxed)
            || self.fail_post_once.swap(false, Ordering::Relaxed)
        {
            return Err(DispatchError::Native("mock post failure".to_string()));
        }
        self.posted.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Records `type_text` calls; optionally fails them.
#[derive(Default)]
pub struct RecordingSimulator {
    typed: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSimulator {
    /// Every `type_text` call fails.
    pub fn with_failing_type(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Texts successfully typed, in order.
    pub fn typed(&self) -> Vec<String> {
        self.typed.lock().unwrap().clone()
    }
}

impl TypingSimulator for RecordingSimulator {
    fn type_text(&self, text: &str) -> Result<(), DispatchError> {
        if self.fail {
            return Err(DispatchError::Simulation("mock typing failure".to_string()));
        }
        self.typed.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Records echoed lines.
#[derive(Default)]
pub struct RecordingEcho {
    lines: Mutex<Vec<String>>,
}

impl RecordingEcho {
    /// Lines echoed so far, in order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl ScanEcho for RecordingEcho {
    fn echo(&self, text: &str) -> Result<(), DispatchError> {
        self.lines.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
