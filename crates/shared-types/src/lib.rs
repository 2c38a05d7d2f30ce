//! # Shared Types Crate
//!
//! Leaf crate of the workspace. Everything that must be byte-exact across the
//! transaction, ordering and block crates lives here.
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | `entities` | `Hash`, `Address`, `U256`, `StorageSize`, byte helpers |
//! | `bloom` | 2048-bit log filter (`Bloom`) |
//! | `codec` | RLP encode/decode bindings and the streaming `RlpReader` |
//! | `hashing` | `keccak256`, `rlp_hash`, `prefixed_rlp_hash` |
//! | `errors` | `CodecError` |
//!
//! ## Encoding Rules
//!
//! - Integers are big-endian minimal; zero encodes as the empty string.
//! - Decoding rejects non-minimal length prefixes and leading-zero integers.
//! - Optional addresses encode as the empty string when absent.

pub mod bloom;
pub mod codec;
pub mod entities;
pub mod errors;
pub mod hashing;

pub use bloom::{Bloom, BLOOM_BYTE_LENGTH};
pub use codec::{decode, encode, stream, ItemKind, RlpReader};
pub use entities::*;
pub use errors::CodecError;
pub use hashing::{keccak256, keccak256_concat, prefixed_rlp_hash, rlp_hash};
