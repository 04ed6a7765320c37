//! Core components for the QKD protocol.
//!
//! This module contains the fundamental building blocks of the handshake:
//! the quantum channel model, basis reconciliation, key derivation,
//! protocol constants, and error handling.

// Quantum channel model
pub mod channel;

// Basis reconciliation and eavesdrop-detection sampling
pub mod sifting;

// Session key derivation
pub mod key;

// Protocol constants
pub mod constants;

// Error handling
pub mod error;

// Re-exports for convenience
pub use self::channel::{Basis, Eavesdropper, EncodedBit, encode, measure};
pub use self::error::{Error, Result};
pub use self::key::SessionKey;
pub use self::sifting::{Subset, sift, subset_hash};
