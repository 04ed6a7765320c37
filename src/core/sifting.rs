/*!
Basis reconciliation and eavesdrop-detection sampling.

Both sides run [`sift`] over the same pair of basis sequences, so absent
channel disturbance they produce bit-identical sifted keys. The sender then
samples a wrap-around [`Subset`] of the sifted key and both sides compare
its SHA-256 over the decimal-digit string of the subset bits, exactly as
the wire peers expect.
*/

use std::fmt;

use rand::Rng;
use sha2::{Digest, Sha256};

use crate::core::channel::Basis;
use crate::core::constants::subset;
use crate::core::error::{Error, Result};

/// Retain bit *i* wherever both basis choices at *i* agree
///
/// Sifted bits keep their original transmission order.
pub fn sift(bits: &[u8], ours: &[Basis], theirs: &[Basis]) -> Vec<u8> {
    bits.iter()
        .zip(ours.iter().zip(theirs))
        .filter(|&(_, (a, b))| a == b)
        .map(|(&bit, _)| bit)
        .collect()
}

/// Contiguous, possibly wrap-around index range `[start, end)` into a
/// sifted key, used for an eavesdrop-detection sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subset {
    /// First sampled index
    pub start: usize,
    /// One past the last sampled index, modulo the sifted length
    pub end: usize,
}

impl Subset {
    /// Draw a random subset of a sifted key of length `sifted_len`
    ///
    /// Start is uniform in `[0, sifted_len)`, size uniform in the
    /// configured sampling bounds; the range wraps past the end.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, sifted_len: usize) -> Self {
        let start = rng.random_range(0..sifted_len);
        let size = rng.random_range(subset::MIN_SIZE..=subset::MAX_SIZE);
        Subset {
            start,
            end: (start + size) % sifted_len,
        }
    }

    /// Extract the sampled bits, applying the wrap-around rule
    pub fn extract(&self, key: &[u8]) -> Vec<u8> {
        if self.end < self.start {
            let mut bits = key[self.start..].to_vec();
            bits.extend_from_slice(&key[..self.end]);
            bits
        } else {
            key[self.start..self.end].to_vec()
        }
    }

    /// Parse the `"<start> <end>"` wire form, checking both bounds against
    /// the sifted length
    pub fn parse(line: &str, sifted_len: usize) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [start, end] = fields.as_slice() else {
            return Err(Error::format(format!("invalid subset bounds: {line:?}")));
        };
        let start: usize = start
            .parse()
            .map_err(|_| Error::format(format!("invalid subset start: {start:?}")))?;
        let end: usize = end
            .parse()
            .map_err(|_| Error::format(format!("invalid subset end: {end:?}")))?;
        if start >= sifted_len || end >= sifted_len {
            return Err(Error::format(format!(
                "subset bounds {start} {end} out of range for sifted length {sifted_len}"
            )));
        }
        Ok(Subset { start, end })
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.start, self.end)
    }
}

/// Hex SHA-256 over the subset bits as their decimal-digit string
///
/// Hashing the digit string rather than packed bytes matches what the
/// peer computes on its side of the wire.
pub fn subset_hash(bits: &[u8]) -> String {
    let digits: String = bits.iter().map(|bit| char::from(b'0' + bit)).collect();
    hex::encode(Sha256::digest(digits.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::channel::Basis::{Diagonal, Rectilinear};
    use crate::core::channel::{random_bases, random_bits};

    #[test]
    fn test_sift_keeps_matching_positions_in_order() {
        let bits = [1, 0, 1, 1, 0, 0];
        let ours = [
            Rectilinear,
            Diagonal,
            Rectilinear,
            Diagonal,
            Rectilinear,
            Diagonal,
        ];
        let theirs = [
            Rectilinear,
            Rectilinear,
            Diagonal,
            Diagonal,
            Rectilinear,
            Rectilinear,
        ];
        assert_eq!(sift(&bits, &ours, &theirs), vec![1, 1, 0]);
    }

    #[test]
    fn test_sift_is_symmetric_in_basis_order() {
        let mut rng = rand::rng();
        let bits = random_bits(&mut rng, 256);
        let ours = random_bases(&mut rng, 256);
        let theirs = random_bases(&mut rng, 256);
        assert_eq!(
            sift(&bits, &ours, &theirs),
            sift(&bits, &theirs, &ours)
        );
    }

    #[test]
    fn test_subset_extract_contiguous() {
        let key = [0, 1, 0, 1, 1, 0, 1, 0];
        let subset = Subset { start: 2, end: 6 };
        assert_eq!(subset.extract(&key), vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_subset_extract_wraps() {
        let key = [0, 1, 0, 1, 1, 0, 1, 0];
        let subset = Subset { start: 6, end: 2 };
        assert_eq!(subset.extract(&key), vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_subset_sample_within_bounds() {
        let mut rng = rand::rng();
        for _ in 0..1000 {
            let len = 140;
            let subset = Subset::sample(&mut rng, len);
            assert!(subset.start < len);
            assert!(subset.end < len);
            let size = subset.extract(&vec![0u8; len]).len();
            assert!((subset::MIN_SIZE..=subset::MAX_SIZE).contains(&size));
        }
    }

    #[test]
    fn test_subset_parse_roundtrip() {
        let subset = Subset { start: 100, end: 36 };
        assert_eq!(Subset::parse(&subset.to_string(), 128).unwrap(), subset);
    }

    #[test]
    fn test_subset_parse_rejects_bad_bounds() {
        assert!(Subset::parse("12", 128).is_err());
        assert!(Subset::parse("a b", 128).is_err());
        assert!(Subset::parse("128 0", 128).is_err());
        assert!(Subset::parse("0 128", 128).is_err());
        assert!(Subset::parse("1 2 3", 128).is_err());
    }

    #[test]
    fn test_subset_hash_known_digests() {
        // SHA-256 of the ASCII strings "0" and "1".
        assert_eq!(
            subset_hash(&[0]),
            "5feceb66ffc86f38d952786c6d696c79c2dbc239dd4e91b46729d73a27fb57e9"
        );
        assert_eq!(
            subset_hash(&[1]),
            "6b86b273ff34fce19d6b804eff5a3f5747ada4eaa22f1d49c01e52ddb7875b4b"
        );
    }

    #[test]
    fn test_subset_hash_detects_single_bit_flip() {
        let mut rng = rand::rng();
        let bits = random_bits(&mut rng, 80);
        let mut corrupted = bits.clone();
        corrupted[40] ^= 1;
        assert_eq!(subset_hash(&bits), subset_hash(&bits));
        assert_ne!(subset_hash(&bits), subset_hash(&corrupted));
    }
}
