//! Memoized sender and fee payer recovery.
//!
//! Each cache slot stores the identity of the signer that filled it; a lookup
//! through a different signer recomputes and overwrites the slot.

use crate::domain::{TxError, TxResult};
use crate::signer::{SignerId, TxSigner};
use crate::transaction::Transaction;
use parking_lot::RwLock;
use shared_crypto::Secp256k1PublicKey;
use shared_types::Address;
use tracing::trace;

fn cached<T: Clone>(
    slot: &RwLock<Option<(SignerId, T)>>,
    id: SignerId,
    compute: impl FnOnce() -> TxResult<T>,
) -> TxResult<T> {
    if let Some((cached_id, value)) = slot.read().as_ref() {
        if *cached_id == id {
            trace!(signer = ?id.kind, "sender cache hit");
            return Ok(value.clone());
        }
    }
    let value = compute()?;
    *slot.write() = Some((id, value.clone()));
    Ok(value)
}

impl Transaction {
    /// The sender: recovered for Ethereum-family transactions, declared for
    /// native ones.
    pub fn sender(&self, signer: &dyn TxSigner) -> TxResult<Address> {
        if self.is_ethereum() {
            self.sender_from(signer)
        } else {
            self.from()
        }
    }

    /// Recovers the address from the first sender signature.
    pub fn sender_from(&self, signer: &dyn TxSigner) -> TxResult<Address> {
        cached(&self.from, signer.identity(), || signer.sender(self.data()))
    }

    /// Public keys behind every sender signature.
    pub fn sender_pubkey(&self, signer: &dyn TxSigner) -> TxResult<Vec<Secp256k1PublicKey>> {
        cached(&self.sender_pubkeys, signer.identity(), || {
            signer.sender_pubkey(self.data())
        })
    }

    /// The declared fee payer when delegated, otherwise the sender.
    pub fn sender_fee_payer(&self, signer: &dyn TxSigner) -> TxResult<Address> {
        match self.data().fee_delegation() {
            Some(fd) => Ok(fd.fee_payer),
            None => self.sender(signer),
        }
    }

    /// Public keys behind every fee payer signature.
    pub fn sender_fee_payer_pubkey(
        &self,
        signer: &dyn TxSigner,
    ) -> TxResult<Vec<Secp256k1PublicKey>> {
        if !self.is_fee_delegated() {
            return Err(TxError::NotFeeDelegationTransaction);
        }
        cached(&self.fee_payer_pubkeys, signer.identity(), || {
            signer.sender_fee_payer(self.data())
        })
    }
}
