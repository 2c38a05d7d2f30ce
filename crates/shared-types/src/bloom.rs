//! # Log Bloom
//!
//! 2048-bit filter over log addresses and topics. Each input sets three bits
//! chosen from the first six bytes of its keccak hash.

use crate::entities::Hash;
use crate::hashing::keccak256;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

/// Size of a bloom in bytes.
pub const BLOOM_BYTE_LENGTH: usize = 256;

/// A 256-byte log bloom.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bloom(#[serde_as(as = "Bytes")] pub [u8; BLOOM_BYTE_LENGTH]);

impl Default for Bloom {
    fn default() -> Self {
        Bloom([0u8; BLOOM_BYTE_LENGTH])
    }
}

impl std::fmt::Debug for Bloom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bloom(0x{})", hex::encode(self.0))
    }
}

impl Bloom {
    /// The empty bloom.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Builds a bloom from exactly 256 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; BLOOM_BYTE_LENGTH] = bytes.try_into().ok()?;
        Some(Bloom(array))
    }

    /// Whether no bit is set.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    fn bit_positions(input: &[u8]) -> [(usize, u8); 3] {
        let hash: Hash = keccak256(input);
        let h = hash.as_bytes();
        let mut out = [(0usize, 0u8); 3];
        for (i, slot) in out.iter_mut().enumerate() {
            let bit = ((usize::from(h[2 * i]) << 8) | usize::from(h[2 * i + 1])) & 2047;
            *slot = (BLOOM_BYTE_LENGTH - 1 - bit / 8, 1u8 << (bit % 8));
        }
        out
    }

    /// Sets the three bits for `input`.
    pub fn accrue(&mut self, input: &[u8]) {
        for (index, mask) in Self::bit_positions(input) {
            self.0[index] |= mask;
        }
    }

    /// Merges another bloom into this one.
    pub fn accrue_bloom(&mut self, other: &Bloom) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a |= *b;
        }
    }

    /// Whether the bits for `input` are all set.
    pub fn contains_input(&self, input: &[u8]) -> bool {
        Self::bit_positions(input)
            .iter()
            .all(|(index, mask)| self.0[*index] & mask == *mask)
    }
}

impl Encodable for Bloom {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.append(&self.0.to_vec());
    }
}

impl Decodable for Bloom {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        rlp.decoder().decode_value(|bytes| match bytes.len() {
            BLOOM_BYTE_LENGTH => Bloom::from_slice(bytes).ok_or(DecoderError::RlpInvalidLength),
            n if n < BLOOM_BYTE_LENGTH => Err(DecoderError::RlpIsTooShort),
            _ => Err(DecoderError::RlpIsTooBig),
        })
    }
}
