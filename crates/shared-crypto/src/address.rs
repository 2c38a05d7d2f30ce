//! # Address Derivation
//!
//! Account addresses are the low 20 bytes of the keccak hash of the 64-byte
//! uncompressed public key. Contract addresses hash the creator and its nonce.

use rlp::RlpStream;
use shared_types::{keccak256, Address};

/// Address of an uncompressed public key (`0x04 || X || Y`).
///
/// The leading `0x04` byte is skipped before hashing.
pub fn pubkey_to_address(uncompressed: &[u8; 65]) -> Address {
    let hash = keccak256(&uncompressed[1..]);
    Address::from_slice(&hash.as_bytes()[12..])
}

/// Address of a contract created by `from` at `nonce`: `keccak(rlp([from, nonce]))[12..]`.
pub fn create_address(from: &Address, nonce: u64) -> Address {
    let mut s = RlpStream::new_list(2);
    s.append(from);
    s.append(&nonce);
    let hash = keccak256(&s.out());
    Address::from_slice(&hash.as_bytes()[12..])
}
