//! Transport layer for the QKD protocol.
//!
//! Length-prefixed framing over any reliable byte-stream connection.

// Framed message exchange
pub mod framed;

// Re-export for convenience
pub use framed::FramedStream;
