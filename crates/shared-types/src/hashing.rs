//! # Keccak Hashing
//!
//! `rlp_hash` and `prefixed_rlp_hash` are the two digests every consensus
//! object is identified by. The prefixed form keeps typed-transaction
//! preimages disjoint from plain RLP lists.

use crate::entities::Hash;
use rlp::Encodable;
use sha3::{Digest, Keccak256};

/// Keccak-256 of a byte string.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    Hash::from_slice(&hasher.finalize())
}

/// Keccak-256 of several byte strings fed in order.
pub fn keccak256_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    Hash::from_slice(&hasher.finalize())
}

/// Keccak-256 of the RLP encoding of `value`.
pub fn rlp_hash<T: Encodable>(value: &T) -> Hash {
    keccak256(&rlp::encode(value))
}

/// Keccak-256 of `prefix || rlp(value)`.
pub fn prefixed_rlp_hash<T: Encodable>(prefix: u8, value: &T) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update([prefix]);
    hasher.update(rlp::encode(value));
    Hash::from_slice(&hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_keccak_empty_input() {
        assert_eq!(
            keccak256(&[]).as_bytes(),
            &hex!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
    }

    #[test]
    fn test_hash_of_empty_list() {
        // keccak(0xc0): the well-known empty uncle hash
        let empty = rlp::RlpStream::new_list(0).out();
        assert_eq!(
            keccak256(&empty).as_bytes(),
            &hex!("1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347")
        );
    }

    #[test]
    fn test_rlp_hash_matches_manual_encoding() {
        let value = crate::entities::U256::from(1_000_000u64);
        assert_eq!(rlp_hash(&value), keccak256(&rlp::encode(&value)));
    }

    #[test]
    fn test_prefixed_hash_differs_from_plain() {
        let value = 42u64;
        assert_ne!(prefixed_rlp_hash(0x01, &value), rlp_hash(&value));
        assert_eq!(
            prefixed_rlp_hash(0x01, &value),
            keccak256_concat(&[&[0x01], &rlp::encode(&value)])
        );
    }
}
