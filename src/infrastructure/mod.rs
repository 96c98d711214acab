//! Infrastructure layer: adapters for the serial device and OS output.

pub mod output;
pub mod serial;
