//! # Shared Crypto - secp256k1 Primitives
//!
//! ## Components
//!
//! | Module | Contents | Use Case |
//! |--------|----------|----------|
//! | `ecdsa` | Recoverable secp256k1 signatures | Transaction and fee-payer signing, sender recovery |
//! | `address` | Keccak address derivation | Account and contract addresses |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S on signing
//! - **Recovery**: `(V, R, S)` range checks are explicit and homestead-aware

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod ecdsa;
pub mod errors;

// Re-exports
pub use address::{create_address, pubkey_to_address};
pub use ecdsa::{
    recover_address, recover_pubkey, validate_signature_values, Secp256k1KeyPair,
    Secp256k1PublicKey, Secp256k1Signature, RECOVERY_ID_OFFSET, SECP256K1_HALF_N, SECP256K1_N,
    SIGNATURE_LENGTH,
};
pub use errors::CryptoError;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
