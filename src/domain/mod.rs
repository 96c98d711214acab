//! Pure domain logic with no OS or I/O dependencies.

pub mod config;
pub mod decoder;
pub mod framer;

pub use config::AppConfig;
pub use decoder::decode_scan;
pub use framer::FrameBuffer;
