/*!
Session key derivation.

The first 128 bits of a validated sifted key, packed big-endian into 16
bytes. The hex form goes to the registration endpoint; the fingerprint
(SHA-256 of the raw bytes) is what the end user presents to the chat
front-end as their login token.
*/

use std::fmt;

use sha2::{Digest, Sha256};

use crate::core::constants::{SESSION_KEY_BITS, SESSION_KEY_BYTES};
use crate::core::error::{Error, Result};

/// 128-bit symmetric key derived from a validated sifted key
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey([u8; SESSION_KEY_BYTES]);

impl SessionKey {
    /// Derive a key from a sifted key of at least 128 bits
    ///
    /// Takes exactly the first 128 bits, interpreted as an unsigned
    /// big-endian binary number.
    pub fn derive(sifted: &[u8]) -> Result<Self> {
        if sifted.len() < SESSION_KEY_BITS {
            return Err(Error::format(format!(
                "sifted key too short for session key: {} bits",
                sifted.len()
            )));
        }
        let mut bytes = [0u8; SESSION_KEY_BYTES];
        for (i, bit) in sifted[..SESSION_KEY_BITS].iter().enumerate() {
            bytes[i / 8] = (bytes[i / 8] << 1) | (bit & 1);
        }
        Ok(SessionKey(bytes))
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; SESSION_KEY_BYTES] {
        &self.0
    }

    /// Hex encoding sent to the registration endpoint
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Hex SHA-256 of the raw key bytes
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.0))
    }
}

// Key material stays out of logs and panics.
impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_packs_big_endian() {
        let mut bits = vec![0u8; 128];
        bits[0] = 1;
        let key = SessionKey::derive(&bits).unwrap();
        let mut expected = [0u8; 16];
        expected[0] = 0x80;
        assert_eq!(key.as_bytes(), &expected);

        let key = SessionKey::derive(&vec![1u8; 128]).unwrap();
        assert_eq!(key.as_bytes(), &[0xff; 16]);
    }

    #[test]
    fn test_derive_uses_only_first_128_bits() {
        let mut long = vec![0u8; 140];
        long[130] = 1;
        let key = SessionKey::derive(&long).unwrap();
        assert_eq!(key, SessionKey::derive(&vec![0u8; 128]).unwrap());
    }

    #[test]
    fn test_derive_rejects_short_input() {
        assert!(SessionKey::derive(&vec![1u8; 127]).is_err());
        assert!(SessionKey::derive(&[]).is_err());
    }

    #[test]
    fn test_hex_encoding() {
        let key = SessionKey::derive(&vec![1u8; 128]).unwrap();
        assert_eq!(key.to_hex(), "ff".repeat(16));
    }

    #[test]
    fn test_fingerprint_matches_raw_digest() {
        let key = SessionKey::derive(&vec![0u8; 128]).unwrap();
        assert_eq!(
            key.fingerprint(),
            hex::encode(Sha256::digest([0u8; 16]))
        );
    }

    #[test]
    fn test_debug_redacts_material() {
        let key = SessionKey::derive(&vec![1u8; 128]).unwrap();
        assert_eq!(format!("{key:?}"), "SessionKey(..)");
    }
}
