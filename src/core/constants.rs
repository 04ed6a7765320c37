/*!
Constants for the QKD protocol.

This module contains the protocol constants: round sizing, sifting
thresholds, error-check sampling bounds, and wire-format sizes.
*/

/// Number of encoded bits transmitted per round
pub const ROUND_SIZE: usize = 256;

/// Minimum sifted-key length required to proceed past sifting
pub const MIN_SIFTED_BITS: usize = 128;

/// Length of the derived session key in bits
pub const SESSION_KEY_BITS: usize = 128;

/// Length of the derived session key in bytes
pub const SESSION_KEY_BYTES: usize = SESSION_KEY_BITS / 8;

/// Error-check subset sampling bounds (inclusive)
pub mod subset {
    /// Smallest sample the sender may draw
    pub const MIN_SIZE: usize = 64;

    /// Largest sample the sender may draw
    pub const MAX_SIZE: usize = 96;
}

/// Size constants for the framed transport
pub mod sizes {
    /// Length prefix on every frame, unsigned big-endian
    pub const LENGTH_PREFIX: usize = 8;

    /// Serialized encoded-bit artifact (basis token byte + bit digit byte)
    pub const ARTIFACT: usize = 2;

    /// Hex-encoded SHA-256 digest
    pub const DIGEST_HEX: usize = 64;
}

/// Configuration defaults
pub mod defaults {
    use std::time::Duration;

    /// Rounds attempted before a session fails with `TooManyRetries`
    pub const MAX_ROUNDS: u32 = 64;

    /// Per-socket read timeout so a stalled peer cannot block a session
    pub const READ_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout for the registration HTTP round-trip
    pub const REGISTRATION_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Authorization header value expected by the registration endpoint
pub const REGISTRATION_AUTH: &str = "qkdadmin";
