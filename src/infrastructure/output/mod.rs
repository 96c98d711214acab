//! Host output adapters.
//!
//! The correct delivery mechanism is resolved once at startup into an
//! [`crate::application::dispatch::OutputMode`]: native injection on Windows,
//! the console echo everywhere else.

pub mod console;
pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;
