//! # Core Value Types
//!
//! Fixed-width primitives shared by every crate. Hashes and addresses are the
//! `primitive-types` fixed hashes so they carry RLP and serde impls; all
//! arbitrary-precision quantities (price, amount, signature values, block
//! score, number, time) are `U256`.

use crate::errors::CodecError;

pub use primitive_types::{H160, H256, U256};

/// A 32-byte keccak hash.
pub type Hash = H256;

/// A 20-byte account address.
pub type Address = H160;

/// Encoded size in bytes.
pub type StorageSize = usize;

/// Length of a hash in bytes.
pub const HASH_LENGTH: usize = 32;

/// Length of an address in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// Converts a `U256` into its 32-byte big-endian form.
pub fn u256_to_be_bytes(value: &U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}

/// Builds a `U256` from at most 32 big-endian bytes.
pub fn u256_from_be_slice(bytes: &[u8]) -> Result<U256, CodecError> {
    if bytes.len() > 32 {
        return Err(CodecError::ValueTooLarge {
            size: bytes.len(),
            limit: 32,
        });
    }
    Ok(U256::from_big_endian(bytes))
}

/// Builds an address from a 20-byte slice.
pub fn address_from_slice(bytes: &[u8]) -> Result<Address, CodecError> {
    if bytes.len() != ADDRESS_LENGTH {
        return Err(CodecError::InvalidLength {
            expected: ADDRESS_LENGTH,
            actual: bytes.len(),
        });
    }
    Ok(Address::from_slice(bytes))
}

/// `0x`-prefixed lowercase hex of a byte string.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// `0x`-prefixed minimal hex quantity (`0x0` for zero).
pub fn u256_to_hex(value: &U256) -> String {
    format!("{:#x}", value)
}

/// `0x`-prefixed minimal hex quantity for a `u64`.
pub fn u64_to_hex(value: u64) -> String {
    format!("{:#x}", value)
}

/// Parses a `0x`-prefixed (or bare) hex byte string.
pub fn parse_hex_bytes(input: &str) -> Result<Vec<u8>, CodecError> {
    let trimmed = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(trimmed).map_err(|e| CodecError::InvalidHex(e.to_string()))
}

/// Parses a hex quantity into a `U256`.
pub fn parse_hex_u256(input: &str) -> Result<U256, CodecError> {
    let trimmed = input.strip_prefix("0x").unwrap_or(input);
    if trimmed.is_empty() {
        return Err(CodecError::InvalidHex("empty quantity".into()));
    }
    U256::from_str_radix(trimmed, 16).map_err(|e| CodecError::InvalidHex(format!("{:?}", e)))
}

/// Parses a hex quantity into a `u64`.
pub fn parse_hex_u64(input: &str) -> Result<u64, CodecError> {
    let trimmed = input.strip_prefix("0x").unwrap_or(input);
    u64::from_str_radix(trimmed, 16).map_err(|e| CodecError::InvalidHex(e.to_string()))
}
