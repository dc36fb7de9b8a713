//! Tracing subscriber setup shared by the emocipher binaries.

mod subscriber;

pub use subscriber::init;
