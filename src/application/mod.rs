//! Application layer: use cases composing the domain over infrastructure seams.

pub mod bridge;
pub mod dispatch;

pub use bridge::ScanBridge;
pub use dispatch::{OutputDispatcher, OutputMode};
