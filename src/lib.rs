/*!
# QKD Protocol

A BB84-style quantum key distribution handshake over a length-framed TCP
transport, establishing a shared 128-bit key between two parties and
detecting eavesdropping on the channel.

## Overview

This library provides:

- A quantum channel model reproducing BB84 measurement statistics
  (lossless recovery in the preparation basis, uniform noise otherwise)
- Length-prefixed framing over any reliable byte stream
- Sender and receiver handshake engines: bit exchange, basis
  reconciliation, sifting with bounded retries, subset-hash eavesdrop
  detection, and session-key derivation
- A registration client that hands the finished key to an external HTTP
  service
- A TCP listener running one independent session per connection

The channel is a simulation: it reproduces the measurement statistics the
protocol relies on, not qubit physics. Eavesdrop detection is statistical;
with 64-bit or larger check subsets an intercept-resend adversary escapes
notice with probability at most 0.75^64.
*/

// Core building blocks
pub mod core;

// Protocol state machine and role engines
pub mod protocol;

// Framed transport
pub mod transport;

// Key registration with the external web service
pub mod registration;

// Connection plumbing
pub mod listener;

// Re-export commonly used types for convenience
pub use self::core::channel::{Basis, Eavesdropper, EncodedBit, encode, measure};
pub use self::core::constants::{MIN_SIFTED_BITS, ROUND_SIZE, SESSION_KEY_BITS, SESSION_KEY_BYTES};
pub use self::core::error::{Error, Result};
pub use self::core::key::SessionKey;
pub use self::core::sifting::{Subset, sift, subset_hash};
pub use listener::QkdListener;
pub use protocol::{HandshakeState, ProtocolConfig, ReceiverEngine, Role, SenderEngine, Session};
pub use registration::{RegistrationClient, RegistrationStatus};
pub use transport::FramedStream;
