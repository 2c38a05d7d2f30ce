//! # ECDSA Signatures (secp256k1)
//!
//! Recoverable secp256k1 signatures in the 65-byte `[R || S || V]` layout,
//! public-key recovery and the range checks applied to `(V, R, S)` before
//! any recovery is attempted.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Signing always produces low-S values
//! - Recovery accepts high-S input only when the caller does not enforce
//!   the homestead rule

use crate::address::pubkey_to_address;
use crate::CryptoError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use primitive_types::U256;
use shared_types::{u256_to_be_bytes, Address, Hash};
use zeroize::{Zeroize, Zeroizing};

/// Length of a recoverable signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// Offset of the recovery id inside a recoverable signature.
pub const RECOVERY_ID_OFFSET: usize = 64;

/// secp256k1 group order n.
pub const SECP256K1_N: U256 = U256([
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
]);

/// n / 2, the upper bound for S under the homestead rule.
pub const SECP256K1_HALF_N: U256 = U256([
    0xDFE9_2F46_681B_20A0,
    0x5D57_6E73_57A4_501D,
    0xFFFF_FFFF_FFFF_FFFF,
    0x7FFF_FFFF_FFFF_FFFF,
]);

/// Checks that `(v, r, s)` can be fed to recovery.
///
/// `r` and `s` must lie in `[1, n-1]` and `v` must be 0 or 1. With
/// `homestead` set, `s` must also be at most `n/2`.
pub fn validate_signature_values(v: u8, r: &U256, s: &U256, homestead: bool) -> bool {
    if r.is_zero() || s.is_zero() {
        return false;
    }
    if homestead && *s > SECP256K1_HALF_N {
        return false;
    }
    *r < SECP256K1_N && *s < SECP256K1_N && (v == 0 || v == 1)
}

// =============================================================================
// PUBLIC KEY
// =============================================================================

/// secp256k1 public key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Secp256k1PublicKey(VerifyingKey);

impl Secp256k1PublicKey {
    /// Parses a SEC1 key, compressed (33 bytes) or uncompressed (65 bytes).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        VerifyingKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// Uncompressed form `0x04 || X || Y`.
    pub fn to_uncompressed(&self) -> [u8; 65] {
        let point = self.0.to_encoded_point(false);
        let mut out = [0u8; 65];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Compressed form `0x02|0x03 || X`.
    pub fn to_compressed(&self) -> [u8; 33] {
        let point = self.0.to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Account address of this key.
    pub fn to_address(&self) -> Address {
        pubkey_to_address(&self.to_uncompressed())
    }

    /// The underlying verifying key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.0
    }
}

// =============================================================================
// RECOVERABLE SIGNATURE
// =============================================================================

/// Recoverable signature `[R || S || V]` with `V` in `{0, 1}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Secp256k1Signature([u8; SIGNATURE_LENGTH]);

impl Secp256k1Signature {
    /// Wraps 65 raw bytes.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Builds the byte form from integer values.
    pub fn from_values(r: &U256, s: &U256, v: u8) -> Self {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..32].copy_from_slice(&u256_to_be_bytes(r));
        bytes[32..64].copy_from_slice(&u256_to_be_bytes(s));
        bytes[RECOVERY_ID_OFFSET] = v;
        Self(bytes)
    }

    /// Parses a 65-byte slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; SIGNATURE_LENGTH] =
            bytes.try_into().map_err(|_| CryptoError::InvalidLength {
                expected: SIGNATURE_LENGTH,
                actual: bytes.len(),
            })?;
        Ok(Self(array))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// R component.
    pub fn r(&self) -> U256 {
        U256::from_big_endian(&self.0[..32])
    }

    /// S component.
    pub fn s(&self) -> U256 {
        U256::from_big_endian(&self.0[32..64])
    }

    /// Recovery id.
    pub fn v(&self) -> u8 {
        self.0[RECOVERY_ID_OFFSET]
    }
}

/// Recovers the public key that produced `signature` over `prehash`.
///
/// The signature values are not range-checked here; callers run
/// [`validate_signature_values`] first with the homestead flag they need.
pub fn recover_pubkey(
    prehash: &Hash,
    signature: &Secp256k1Signature,
) -> Result<Secp256k1PublicKey, CryptoError> {
    let v = signature.v();
    let recovery_id = RecoveryId::from_byte(v)
        .filter(|_| v <= 1)
        .ok_or(CryptoError::InvalidRecoveryId(v))?;

    let mut rs = [0u8; 64];
    rs.copy_from_slice(&signature.as_bytes()[..64]);
    let parsed = Signature::from_slice(&rs);
    rs.zeroize();
    let sig = parsed.map_err(|_| CryptoError::InvalidSignatureValues)?;

    // k256 only recovers from low-S signatures; (r, n-s) with the y parity
    // flipped yields the same key.
    let (sig, recovery_id) = match sig.normalize_s() {
        Some(normalized) => (
            normalized,
            RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
        ),
        None => (sig, recovery_id),
    };

    VerifyingKey::recover_from_prehash(prehash.as_bytes(), &sig, recovery_id)
        .map(Secp256k1PublicKey)
        .map_err(|_| CryptoError::RecoveryFailed)
}

/// Recovers the signer address of `signature` over `prehash`.
pub fn recover_address(
    prehash: &Hash,
    signature: &Secp256k1Signature,
) -> Result<Address, CryptoError> {
    recover_pubkey(prehash, signature).map(|key| key.to_address())
}

// =============================================================================
// KEY PAIR
// =============================================================================

/// secp256k1 ECDSA keypair.
#[derive(Clone)]
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl std::fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_slice(&bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Public key.
    pub fn public_key(&self) -> Secp256k1PublicKey {
        Secp256k1PublicKey(*self.signing_key.verifying_key())
    }

    /// Account address of the public key.
    pub fn address(&self) -> Address {
        self.public_key().to_address()
    }

    /// Signs a 32-byte digest, returning `[R || S || V]` with low S.
    pub fn sign_prehash(&self, prehash: &Hash) -> Result<Secp256k1Signature, CryptoError> {
        let (sig, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(prehash.as_bytes())
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..64].copy_from_slice(&sig.to_bytes());
        bytes[RECOVERY_ID_OFFSET] = recovery_id.to_byte();
        Ok(Secp256k1Signature(bytes))
    }

    /// Secret key bytes, wiped when dropped.
    pub fn secret_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes().into())
    }
}
