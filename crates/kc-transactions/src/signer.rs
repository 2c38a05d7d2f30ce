//! # Signers
//!
//! A signer knows which hash a transaction signs, how `V` is encoded and how
//! keys are recovered. Three signers stack on each other:
//!
//! ```text
//! LondonSigner ── dynamic fee ──► typed rules
//!      └─► Eip2930Signer ── access list ──► typed rules
//!              └─► Eip155Signer ── legacy and native
//! ```
//!
//! Each layer handles its own transaction type and hands everything else to
//! the layer below. Fee-payer hashing always ends in [`Eip155Signer`], since
//! only native types are delegated.

use crate::domain::{TxData, TxError, TxInternalData, TxResult, TxSignature, TxSignatures, TxType};
use rlp::RlpStream;
use shared_crypto::{Secp256k1PublicKey, Secp256k1Signature};
use shared_types::{keccak256, Address, Hash, U256};
use std::fmt;
use tracing::warn;

/// Signer family, used with the chain id to tell signers apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignerKind {
    Eip155,
    Eip2930,
    London,
}

/// Identity of a signer; cached recoveries are keyed by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SignerId {
    pub kind: SignerKind,
    pub chain_id: U256,
}

pub trait TxSigner: fmt::Debug + Send + Sync {
    fn identity(&self) -> SignerId;

    fn chain_id(&self) -> U256 {
        self.identity().chain_id
    }

    /// Same family and same chain id.
    fn equal(&self, other: &dyn TxSigner) -> bool {
        self.identity() == other.identity()
    }

    /// Hash the sender signs. Does not identify the transaction.
    fn hash(&self, tx: &TxData) -> Hash;

    /// Hash the fee payer signs.
    fn hash_fee_payer(&self, tx: &TxData) -> TxResult<Hash>;

    /// Converts a raw `[R || S || recid]` signature into the stored form.
    fn signature_values(&self, tx: &TxData, sig: &Secp256k1Signature) -> TxResult<TxSignature>;

    /// Address recovered from the first sender signature.
    fn sender(&self, tx: &TxData) -> TxResult<Address>;

    /// One key per sender signature.
    fn sender_pubkey(&self, tx: &TxData) -> TxResult<Vec<Secp256k1PublicKey>>;

    /// One key per fee payer signature.
    fn sender_fee_payer(&self, tx: &TxData) -> TxResult<Vec<Secp256k1PublicKey>>;
}

// =============================================================================
// EIP-155
// =============================================================================

/// Replay-protected signing for legacy and native transactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eip155Signer {
    chain_id: U256,
    chain_id_mul: U256,
}

impl Eip155Signer {
    pub fn new(chain_id: impl Into<U256>) -> Self {
        let chain_id = chain_id.into();
        Self {
            chain_id,
            chain_id_mul: chain_id.saturating_mul(U256::from(2u64)),
        }
    }

    /// Maps a stored `V` to the `27/28` convention.
    fn plain_v(&self, v: &U256) -> TxResult<U256> {
        v.checked_sub(self.chain_id_mul)
            .and_then(|v| v.checked_sub(U256::from(8u64)))
            .ok_or(TxError::InvalidSig)
    }

    fn check_chain_id(&self, tx: &TxData) -> TxResult<()> {
        if tx.inner().chain_id() != self.chain_id {
            return Err(TxError::InvalidChainId);
        }
        Ok(())
    }

    fn reject_typed(tx: &TxData) -> TxResult<()> {
        let tx_type = tx.inner().tx_type();
        if tx_type.is_eth_typed() {
            return Err(TxError::TxTypeNotSupported(tx_type));
        }
        Ok(())
    }
}

fn append_chain_suffix(s: &mut RlpStream, chain_id: &U256) {
    s.append(chain_id);
    s.append(&0u8);
    s.append(&0u8);
}

impl TxSigner for Eip155Signer {
    fn identity(&self) -> SignerId {
        SignerId {
            kind: SignerKind::Eip155,
            chain_id: self.chain_id,
        }
    }

    fn hash(&self, tx: &TxData) -> Hash {
        let inner = tx.inner();
        let mut s = match inner.serialize_for_sign_to_bytes() {
            Some(bytes) => {
                let mut s = RlpStream::new_list(4);
                s.append(&bytes);
                s
            }
            None => {
                let items = inner.serialize_for_sign();
                let mut s = RlpStream::new_list(items.len() + 3);
                for item in &items {
                    s.append_raw(item, 1);
                }
                s
            }
        };
        append_chain_suffix(&mut s, &self.chain_id);
        keccak256(&s.out())
    }

    fn hash_fee_payer(&self, tx: &TxData) -> TxResult<Hash> {
        let fee_delegation = tx
            .fee_delegation()
            .ok_or(TxError::NotFeeDelegationTransaction)?;
        let inner = tx.inner();
        let mut s = match inner.serialize_for_sign_to_bytes() {
            Some(bytes) => {
                let mut s = RlpStream::new_list(5);
                s.append(&bytes);
                s
            }
            None => {
                let items = inner.serialize_for_sign();
                let mut s = RlpStream::new_list(items.len() + 4);
                for item in &items {
                    s.append_raw(item, 1);
                }
                s
            }
        };
        s.append(&fee_delegation.fee_payer);
        append_chain_suffix(&mut s, &self.chain_id);
        Ok(keccak256(&s.out()))
    }

    fn signature_values(&self, tx: &TxData, sig: &Secp256k1Signature) -> TxResult<TxSignature> {
        Self::reject_typed(tx)?;
        let v = U256::from(sig.v()) + U256::from(35u64) + self.chain_id_mul;
        Ok(TxSignature::new(v, sig.r(), sig.s()))
    }

    fn sender(&self, tx: &TxData) -> TxResult<Address> {
        Self::reject_typed(tx)?;
        let inner = tx.inner();
        if !inner.tx_type().is_legacy() {
            warn!(tx_type = inner.tx_type().name(), nonce = inner.nonce(), "No need to execute Sender!");
        }
        self.check_chain_id(tx)?;
        let signatures = inner.signatures();
        let first = signatures.iter().next().ok_or(TxError::InvalidSig)?;
        let pubkey = first.recover_pubkey(&self.hash(tx), true, |v| self.plain_v(v))?;
        Ok(pubkey.to_address())
    }

    fn sender_pubkey(&self, tx: &TxData) -> TxResult<Vec<Secp256k1PublicKey>> {
        Self::reject_typed(tx)?;
        let inner = tx.inner();
        if inner.tx_type().is_legacy() {
            warn!(nonce = inner.nonce(), "No need to execute SenderPubkey!");
        }
        self.check_chain_id(tx)?;
        inner
            .signatures()
            .recover_pubkeys(&self.hash(tx), true, |v| self.plain_v(v))
    }

    fn sender_fee_payer(&self, tx: &TxData) -> TxResult<Vec<Secp256k1PublicKey>> {
        Self::reject_typed(tx)?;
        if tx.inner().tx_type().is_legacy() {
            warn!(nonce = tx.inner().nonce(), "No need to execute SenderFeePayer!");
        }
        self.check_chain_id(tx)?;
        let fee_delegation = tx
            .fee_delegation()
            .ok_or(TxError::NotFeeDelegationTransaction)?;
        let hash = self.hash_fee_payer(tx)?;
        fee_delegation
            .fee_payer_signatures
            .recover_pubkeys(&hash, true, |v| self.plain_v(v))
    }
}

// =============================================================================
// Typed transactions
// =============================================================================

fn typed_plain_v(v: &U256) -> TxResult<U256> {
    Ok(*v + U256::from(27u64))
}

/// Rules shared by both typed layers once the type matched.
fn typed_pubkey(tx: &TxData, chain_id: &U256, hash: &Hash) -> TxResult<Secp256k1PublicKey> {
    if tx.inner().chain_id() != *chain_id {
        return Err(TxError::InvalidChainId);
    }
    let signatures: TxSignatures = tx.inner().signatures();
    let first = signatures.iter().next().ok_or(TxError::InvalidSig)?;
    first.recover_pubkey(hash, true, typed_plain_v)
}

fn typed_signature_values(
    tx: &TxData,
    chain_id: &U256,
    sig: &Secp256k1Signature,
) -> TxResult<TxSignature> {
    let own = tx.inner().chain_id();
    if !own.is_zero() && own != *chain_id {
        return Err(TxError::InvalidChainId);
    }
    Ok(TxSignature::new(U256::from(sig.v()), sig.r(), sig.s()))
}

/// Accepts access-list transactions on top of EIP-155.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eip2930Signer {
    inner: Eip155Signer,
}

impl Eip2930Signer {
    pub fn new(chain_id: impl Into<U256>) -> Self {
        Self {
            inner: Eip155Signer::new(chain_id),
        }
    }

    fn handles(tx: &TxData) -> bool {
        tx.inner().tx_type() == TxType::ETHEREUM_ACCESS_LIST
    }
}

impl TxSigner for Eip2930Signer {
    fn identity(&self) -> SignerId {
        SignerId {
            kind: SignerKind::Eip2930,
            chain_id: self.inner.chain_id,
        }
    }

    fn hash(&self, tx: &TxData) -> Hash {
        match tx {
            TxData::AccessList(inner) => inner.sig_hash(&self.inner.chain_id),
            _ => self.inner.hash(tx),
        }
    }

    fn hash_fee_payer(&self, tx: &TxData) -> TxResult<Hash> {
        self.inner.hash_fee_payer(tx)
    }

    fn signature_values(&self, tx: &TxData, sig: &Secp256k1Signature) -> TxResult<TxSignature> {
        if !Self::handles(tx) {
            return self.inner.signature_values(tx, sig);
        }
        typed_signature_values(tx, &self.inner.chain_id, sig)
    }

    fn sender(&self, tx: &TxData) -> TxResult<Address> {
        if !Self::handles(tx) {
            return self.inner.sender(tx);
        }
        Ok(typed_pubkey(tx, &self.inner.chain_id, &self.hash(tx))?.to_address())
    }

    fn sender_pubkey(&self, tx: &TxData) -> TxResult<Vec<Secp256k1PublicKey>> {
        if !Self::handles(tx) {
            return self.inner.sender_pubkey(tx);
        }
        Ok(vec![typed_pubkey(tx, &self.inner.chain_id, &self.hash(tx))?])
    }

    fn sender_fee_payer(&self, tx: &TxData) -> TxResult<Vec<Secp256k1PublicKey>> {
        self.inner.sender_fee_payer(tx)
    }
}

/// Accepts dynamic-fee transactions on top of [`Eip2930Signer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LondonSigner {
    inner: Eip2930Signer,
}

impl LondonSigner {
    pub fn new(chain_id: impl Into<U256>) -> Self {
        Self {
            inner: Eip2930Signer::new(chain_id),
        }
    }

    fn chain(&self) -> U256 {
        self.inner.inner.chain_id
    }

    fn handles(tx: &TxData) -> bool {
        tx.inner().tx_type() == TxType::ETHEREUM_DYNAMIC_FEE
    }
}

/// The signer accepting every transaction type on `chain_id`.
pub fn latest_signer_for_chain_id(chain_id: impl Into<U256>) -> LondonSigner {
    LondonSigner::new(chain_id)
}

impl TxSigner for LondonSigner {
    fn identity(&self) -> SignerId {
        SignerId {
            kind: SignerKind::London,
            chain_id: self.chain(),
        }
    }

    fn hash(&self, tx: &TxData) -> Hash {
        match tx {
            TxData::DynamicFee(inner) => inner.sig_hash(&self.chain()),
            _ => self.inner.hash(tx),
        }
    }

    fn hash_fee_payer(&self, tx: &TxData) -> TxResult<Hash> {
        self.inner.hash_fee_payer(tx)
    }

    fn signature_values(&self, tx: &TxData, sig: &Secp256k1Signature) -> TxResult<TxSignature> {
        if !Self::handles(tx) {
            return self.inner.signature_values(tx, sig);
        }
        typed_signature_values(tx, &self.chain(), sig)
    }

    fn sender(&self, tx: &TxData) -> TxResult<Address> {
        if !Self::handles(tx) {
            return self.inner.sender(tx);
        }
        Ok(typed_pubkey(tx, &self.chain(), &self.hash(tx))?.to_address())
    }

    fn sender_pubkey(&self, tx: &TxData) -> TxResult<Vec<Secp256k1PublicKey>> {
        if !Self::handles(tx) {
            return self.inner.sender_pubkey(tx);
        }
        Ok(vec![typed_pubkey(tx, &self.chain(), &self.hash(tx))?])
    }

    fn sender_fee_payer(&self, tx: &TxData) -> TxResult<Vec<Secp256k1PublicKey>> {
        self.inner.sender_fee_payer(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessListTx, DynamicFeeTx, FeeDelegation, LegacyTx, NativeBody, NativeTx};
    use hex_literal::hex;
    use shared_crypto::Secp256k1KeyPair;

    fn eip155_example() -> TxData {
        TxData::Legacy(LegacyTx::new(
            9,
            Some(Address::from(hex!("3535353535353535353535353535353535353535"))),
            U256::from(1_000_000_000_000_000_000u64),
            21_000,
            U256::from(20_000_000_000u64),
            vec![],
        ))
    }

    fn sign(signer: &dyn TxSigner, tx: &mut TxData, key: &Secp256k1KeyPair) {
        let sig = key.sign_prehash(&signer.hash(tx)).unwrap();
        let values = signer.signature_values(tx, &sig).unwrap();
        tx.inner_mut().set_signatures(TxSignatures::single(values));
    }

    // =========================================================================
    // EIP-155
    // =========================================================================

    #[test]
    fn test_eip155_signing_hash() {
        let signer = Eip155Signer::new(1u64);
        assert_eq!(
            signer.hash(&eip155_example()),
            Hash::from(hex!("daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"))
        );
    }

    #[test]
    fn test_eip155_sender_recovery() {
        let signer = Eip155Signer::new(1u64);
        let key = Secp256k1KeyPair::from_bytes([0x46; 32]).unwrap();
        let mut tx = eip155_example();
        sign(&signer, &mut tx, &key);

        let sig = &tx.inner().signatures().0[0];
        assert!(sig.v == U256::from(37u64) || sig.v == U256::from(38u64));
        assert_eq!(
            signer.sender(&tx).unwrap(),
            Address::from(hex!("9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f"))
        );
    }

    #[test]
    fn test_eip155_chain_id_mismatch() {
        let key = Secp256k1KeyPair::generate();
        let mut tx = eip155_example();
        sign(&Eip155Signer::new(1u64), &mut tx, &key);
        assert_eq!(
            Eip155Signer::new(2u64).sender(&tx),
            Err(TxError::InvalidChainId)
        );
    }

    #[test]
    fn test_eip155_rejects_typed() {
        let tx = TxData::AccessList(AccessListTx::default());
        assert_eq!(
            Eip155Signer::new(1u64).sender(&tx),
            Err(TxError::TxTypeNotSupported(TxType::ETHEREUM_ACCESS_LIST))
        );
    }

    #[test]
    fn test_fee_payer_requires_delegation() {
        let tx = eip155_example();
        assert_eq!(
            Eip155Signer::new(1u64).hash_fee_payer(&tx),
            Err(TxError::NotFeeDelegationTransaction)
        );
    }

    // =========================================================================
    // Native delegation
    // =========================================================================

    #[test]
    fn test_fee_payer_recovery() {
        let signer = LondonSigner::new(1001u64);
        let sender = Secp256k1KeyPair::generate();
        let payer = Secp256k1KeyPair::generate();
        let native = NativeTx::new(
            0,
            U256::from(25u64),
            60_000,
            sender.address(),
            NativeBody::ValueTransfer {
                to: Address::repeat_byte(7),
                amount: U256::one(),
            },
            Some(FeeDelegation::new(payer.address())),
        )
        .unwrap();
        let mut tx = TxData::Native(native);
        sign(&signer, &mut tx, &sender);

        let sig = payer.sign_prehash(&signer.hash_fee_payer(&tx).unwrap()).unwrap();
        let values = signer.signature_values(&tx, &sig).unwrap();
        tx.fee_delegation_mut().unwrap().fee_payer_signatures = TxSignatures::single(values);

        let keys = signer.sender_pubkey(&tx).unwrap();
        assert_eq!(keys[0].to_address(), sender.address());
        let keys = signer.sender_fee_payer(&tx).unwrap();
        assert_eq!(keys[0].to_address(), payer.address());
        assert_ne!(signer.hash(&tx), signer.hash_fee_payer(&tx).unwrap());
    }

    // =========================================================================
    // Typed layers
    // =========================================================================

    #[test]
    fn test_london_recovers_dynamic_fee() {
        let signer = LondonSigner::new(2018u64);
        let key = Secp256k1KeyPair::generate();
        let mut tx = TxData::DynamicFee(DynamicFeeTx {
            chain_id: U256::from(2018u64),
            gas: 21_000,
            gas_fee_cap: U256::from(30u64),
            to: Some(Address::repeat_byte(1)),
            ..Default::default()
        });
        sign(&signer, &mut tx, &key);
        assert!(tx.inner().signatures().0[0].v <= U256::one());
        assert_eq!(signer.sender(&tx).unwrap(), key.address());
        assert_eq!(
            Eip2930Signer::new(2018u64).sender(&tx),
            Err(TxError::TxTypeNotSupported(TxType::ETHEREUM_DYNAMIC_FEE))
        );
    }

    #[test]
    fn test_typed_chain_id_checks() {
        let signer = Eip2930Signer::new(5u64);
        let key = Secp256k1KeyPair::generate();
        let mut tx = TxData::AccessList(AccessListTx {
            chain_id: U256::from(6u64),
            ..Default::default()
        });
        let sig = key.sign_prehash(&signer.hash(&tx)).unwrap();
        assert_eq!(
            signer.signature_values(&tx, &sig),
            Err(TxError::InvalidChainId)
        );

        // zero chain id signs under the signer's
        if let TxData::AccessList(inner) = &mut tx {
            inner.chain_id = U256::zero();
        }
        assert!(signer.signature_values(&tx, &sig).is_ok());
    }

    #[test]
    fn test_signer_identity() {
        let london = LondonSigner::new(1u64);
        assert!(london.equal(&LondonSigner::new(1u64)));
        assert!(!london.equal(&LondonSigner::new(2u64)));
        assert!(!london.equal(&Eip2930Signer::new(1u64)));
        assert_eq!(london.chain_id(), U256::one());
        assert!(latest_signer_for_chain_id(1u64).equal(&london));
    }
}
