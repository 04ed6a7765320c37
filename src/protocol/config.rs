/*!
Protocol configuration.

Defaults match the wire peers: 256-bit rounds, a 128-bit sifting floor,
and a bounded number of restart rounds.
*/

use crate::core::constants::{MIN_SIFTED_BITS, ROUND_SIZE, SESSION_KEY_BITS, defaults};
use crate::core::error::{Error, Result};

/// Tunable parameters for one handshake
#[derive(Debug, Clone)]
pub struct ProtocolConfig {
    /// Encoded bits transmitted per round
    pub round_size: usize,
    /// Sifted-key length required to proceed past sifting
    pub min_sifted_bits: usize,
    /// Rounds attempted before the session fails with `TooManyRetries`
    pub max_rounds: u32,
}

impl ProtocolConfig {
    /// Create a configuration with default parameters
    pub fn new() -> Self {
        Self {
            round_size: ROUND_SIZE,
            min_sifted_bits: MIN_SIFTED_BITS,
            max_rounds: defaults::MAX_ROUNDS,
        }
    }

    /// Set the number of bits per round
    pub fn with_round_size(mut self, round_size: usize) -> Self {
        self.round_size = round_size;
        self
    }

    /// Set the sifting floor
    pub fn with_min_sifted_bits(mut self, min_sifted_bits: usize) -> Self {
        self.min_sifted_bits = min_sifted_bits;
        self
    }

    /// Set the retry bound
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Check the parameters are mutually consistent
    pub fn validate(&self) -> Result<()> {
        if self.min_sifted_bits < SESSION_KEY_BITS {
            return Err(Error::format(format!(
                "min_sifted_bits {} is below the {SESSION_KEY_BITS}-bit session key",
                self.min_sifted_bits
            )));
        }
        if self.round_size < self.min_sifted_bits {
            return Err(Error::format(format!(
                "round_size {} can never sift {} bits",
                self.round_size, self.min_sifted_bits
            )));
        }
        if self.max_rounds == 0 {
            return Err(Error::format("max_rounds must be at least 1"));
        }
        Ok(())
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self::new()
    }
}
