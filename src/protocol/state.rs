/*!
Handshake state machine for the BB84 protocol.

States progress `Prepare → BitExchange → BasisExchange → Sift` and then
either restart at `Prepare` (insufficient sifted material) or continue
`ErrorCheck → Validate → Finalize → Complete`. A failed validation lands
in `Aborted`.
*/

use std::fmt;

/// Per-session handshake state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Drawing fresh random bits and bases for a round
    Prepare,
    /// Encoded bits in flight, one artifact frame per bit
    BitExchange,
    /// Basis sequences being exchanged in full
    BasisExchange,
    /// Both sides reconciling bases into a sifted key
    Sift,
    /// Sender sampling a subset and hashing it
    ErrorCheck,
    /// Receiver comparing subset hashes
    Validate,
    /// Truncating the sifted key into the session key
    Finalize,
    /// Handshake finished with an agreed key
    Complete,
    /// Eavesdrop presumed, session torn down
    Aborted,
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandshakeState::Prepare => "Prepare",
            HandshakeState::BitExchange => "BitExchange",
            HandshakeState::BasisExchange => "BasisExchange",
            HandshakeState::Sift => "Sift",
            HandshakeState::ErrorCheck => "ErrorCheck",
            HandshakeState::Validate => "Validate",
            HandshakeState::Finalize => "Finalize",
            HandshakeState::Complete => "Complete",
            HandshakeState::Aborted => "Aborted",
        };
        write!(f, "{name}")
    }
}

/// Endpoint role in the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Prepares and transmits encoded bits, samples the error-check subset
    Sender,
    /// Measures incoming bits, validates the subset hash
    Receiver,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Sender => write!(f, "Sender"),
            Role::Receiver => write!(f, "Receiver"),
        }
    }
}
