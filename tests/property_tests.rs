use std::io::Cursor;

use proptest::prelude::*;

use qkd_protocol::core::channel::{Basis, join_bases, parse_bases, random_bases, random_bits};
use qkd_protocol::{FramedStream, SessionKey, Subset, sift, subset_hash};

// Strategy for frame payloads
fn payloads() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..2048)
}

// Strategy for bit strings
fn bit_strings() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..=1, 128..512)
}

// Strategy for basis sequences of a fixed length
fn basis_sequences(len: usize) -> impl Strategy<Value = Vec<Basis>> {
    prop::collection::vec(
        prop_oneof![Just(Basis::Rectilinear), Just(Basis::Diagonal)],
        len..=len,
    )
}

proptest! {
    #[test]
    fn test_frame_roundtrip(payload in payloads()) {
        let mut tx = FramedStream::new(Vec::new());
        tx.send_frame(&payload).unwrap();
        let mut rx = FramedStream::new(Cursor::new(tx.into_inner()));
        let frame = rx.recv_frame().unwrap();
        prop_assert_eq!(frame.as_ref(), payload.as_slice());
    }

    #[test]
    fn test_frame_sequence_roundtrip(payloads in prop::collection::vec(payloads(), 1..8)) {
        let mut tx = FramedStream::new(Vec::new());
        for payload in &payloads {
            tx.send_frame(payload).unwrap();
        }
        let mut rx = FramedStream::new(Cursor::new(tx.into_inner()));
        for payload in &payloads {
            let frame = rx.recv_frame().unwrap();
            prop_assert_eq!(frame.as_ref(), payload.as_slice());
        }
    }

    #[test]
    fn test_basis_line_roundtrip(bases in basis_sequences(256)) {
        let line = join_bases(&bases);
        prop_assert_eq!(parse_bases(&line, 256).unwrap(), bases);
    }

    #[test]
    fn test_sift_keeps_exactly_the_agreeing_positions(
        (bits, ours, theirs) in (bit_strings(), basis_sequences(512), basis_sequences(512))
            .prop_map(|(bits, mut ours, mut theirs)| {
                let len = bits.len();
                ours.truncate(len);
                theirs.truncate(len);
                (bits, ours, theirs)
            })
    ) {
        let sifted = sift(&bits, &ours, &theirs);
        let agreeing = ours.iter().zip(&theirs).filter(|(a, b)| a == b).count();
        prop_assert_eq!(sifted.len(), agreeing);

        // Identical inputs on both sides give bit-identical sifted keys.
        prop_assert_eq!(sift(&bits, &ours, &theirs), sifted);
    }

    #[test]
    fn test_subset_extract_size_and_wrap(start in 0usize..128, size in 64usize..=96) {
        let key: Vec<u8> = (0..128u32).map(|i| (i % 2) as u8).collect();
        let subset = Subset { start, end: (start + size) % key.len() };
        prop_assert_eq!(subset.extract(&key).len(), size);
    }

    #[test]
    fn test_identical_sifted_keys_hash_identically(
        bits in bit_strings(), start in 0usize..128, size in 64usize..=96,
    ) {
        let subset = Subset { start: start % bits.len(), end: (start + size) % bits.len() };
        prop_assert_eq!(subset_hash(&subset.extract(&bits)), subset_hash(&subset.extract(&bits)));
    }

    #[test]
    fn test_session_key_depends_only_on_first_128_bits(
        bits in prop::collection::vec(0u8..=1, 129..256), flip in 128usize..,
    ) {
        let mut other = bits.clone();
        let flip = 128 + flip % (bits.len() - 128);
        other[flip] ^= 1;
        prop_assert_eq!(
            SessionKey::derive(&bits).unwrap(),
            SessionKey::derive(&other).unwrap()
        );
    }

    #[test]
    fn test_session_key_changes_with_any_key_bit(
        bits in prop::collection::vec(0u8..=1, 128..256), flip in 0usize..128,
    ) {
        let mut other = bits.clone();
        other[flip] ^= 1;
        prop_assert_ne!(
            SessionKey::derive(&bits).unwrap(),
            SessionKey::derive(&other).unwrap()
        );
    }
}

#[test]
fn test_mean_sifted_length_approaches_half_the_round() {
    let mut rng = rand::rng();
    let rounds = 400;
    let total: usize = (0..rounds)
        .map(|_| {
            let bits = random_bits(&mut rng, 256);
            let ours = random_bases(&mut rng, 256);
            let theirs = random_bases(&mut rng, 256);
            sift(&bits, &ours, &theirs).len()
        })
        .sum();
    let mean = total as f64 / rounds as f64;
    assert!(
        (120.0..=136.0).contains(&mean),
        "mean sifted length was {mean}"
    );
}
