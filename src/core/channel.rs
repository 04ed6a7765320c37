/*!
Quantum channel model for the BB84 handshake.

The channel only has to reproduce the measurement statistics the protocol
relies on: measuring an encoded bit in the preparation basis recovers it
exactly, measuring in the other basis yields an independent uniformly
random outcome. Encoded bits serialize to a two-byte artifact so they can
cross the framed transport unchanged.
*/

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::core::constants::sizes;
use crate::core::error::{Error, Result};

/// Measurement basis for a single qubit
///
/// `Rectilinear` is the computational basis (wire token `Z`),
/// `Diagonal` the Hadamard basis (wire token `X`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    /// Computational basis, token `Z`
    Rectilinear,
    /// Hadamard basis, token `X`
    Diagonal,
}

impl Basis {
    /// Draw a uniformly random basis
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random_bool(0.5) {
            Basis::Rectilinear
        } else {
            Basis::Diagonal
        }
    }

    /// Single-byte wire token
    pub fn token(self) -> u8 {
        match self {
            Basis::Rectilinear => b'Z',
            Basis::Diagonal => b'X',
        }
    }

    /// Parse a wire token byte
    pub fn from_token(token: u8) -> Result<Self> {
        match token {
            b'Z' => Ok(Basis::Rectilinear),
            b'X' => Ok(Basis::Diagonal),
            other => Err(Error::format(format!(
                "invalid basis token: 0x{other:02x}"
            ))),
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token() as char)
    }
}

impl FromStr for Basis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.as_bytes() {
            [token] => Basis::from_token(*token),
            _ => Err(Error::format(format!("invalid basis token: {s:?}"))),
        }
    }
}

/// A bit prepared in a chosen basis, ready for transmission
///
/// Immutable once created; consumed by [`measure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedBit {
    bit: u8,
    basis: Basis,
}

/// Prepare a bit in the given basis
pub fn encode(bit: u8, basis: Basis) -> EncodedBit {
    EncodedBit {
        bit: bit & 1,
        basis,
    }
}

/// Measure an artifact in `basis`
///
/// Returns the prepared bit when `basis` matches the preparation basis,
/// otherwise an independent uniformly random bit.
pub fn measure(artifact: &EncodedBit, basis: Basis) -> u8 {
    if basis == artifact.basis {
        artifact.bit
    } else {
        u8::from(rand::rng().random_bool(0.5))
    }
}

impl EncodedBit {
    /// Preparation basis
    pub fn basis(&self) -> Basis {
        self.basis
    }

    /// Serialize to the two-byte wire artifact
    pub fn to_bytes(&self) -> [u8; sizes::ARTIFACT] {
        [self.basis.token(), self.bit + b'0']
    }

    /// Parse a wire artifact
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let [token, digit] = bytes else {
            return Err(Error::format(format!(
                "artifact must be {} bytes, got {}",
                sizes::ARTIFACT,
                bytes.len()
            )));
        };
        let basis = Basis::from_token(*token)?;
        let bit = match digit {
            b'0' => 0,
            b'1' => 1,
            other => {
                return Err(Error::format(format!(
                    "invalid bit digit: 0x{other:02x}"
                )));
            }
        };
        Ok(EncodedBit { bit, basis })
    }
}

/// Draw `n` uniformly random bits
pub fn random_bits<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<u8> {
    (0..n).map(|_| u8::from(rng.random_bool(0.5))).collect()
}

/// Draw `n` independent uniformly random bases
pub fn random_bases<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<Basis> {
    (0..n).map(|_| Basis::random(rng)).collect()
}

/// Join a basis sequence into the space-delimited wire form (`"Z X Z ..."`)
pub fn join_bases(bases: &[Basis]) -> String {
    let tokens: Vec<String> = bases.iter().map(Basis::to_string).collect();
    tokens.join(" ")
}

/// Parse a space-delimited basis sequence, checking the expected length
pub fn parse_bases(line: &str, expected: usize) -> Result<Vec<Basis>> {
    let bases: Vec<Basis> = line
        .split_whitespace()
        .map(Basis::from_str)
        .collect::<Result<_>>()?;
    if bases.len() != expected {
        return Err(Error::format(format!(
            "expected {expected} basis tokens, got {}",
            bases.len()
        )));
    }
    Ok(bases)
}

/// Intercept-resend adversary on the quantum channel
///
/// Measures every artifact in an independently random basis and re-encodes
/// the observed bit in that basis, which disturbs roughly a quarter of the
/// positions the legitimate parties later agree on.
#[derive(Debug, Default)]
pub struct Eavesdropper;

impl Eavesdropper {
    /// Create a new eavesdropper
    pub fn new() -> Self {
        Eavesdropper
    }

    /// Measure and re-encode one artifact in transit
    pub fn intercept(&self, artifact: &EncodedBit) -> EncodedBit {
        let basis = Basis::random(&mut rand::rng());
        encode(measure(artifact, basis), basis)
    }
}
