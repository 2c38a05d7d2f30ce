//! # Parallel Sender Recovery
//!
//! Signature recovery dominates block import. Each envelope recovers
//! independently, so a batch fans out across the rayon pool and every
//! envelope keeps its result in its own sender cache.
//!
//! ## What gets recovered
//!
//! - Ethereum-family: the sender address.
//! - Native: the sender public keys, plus the fee payer public keys when
//!   delegated. The reported address is the declared `from`.

use crate::domain::TxResult;
use crate::signer::TxSigner;
use crate::transaction::Transaction;
use rayon::prelude::*;
use shared_types::Address;
use std::sync::Arc;
use tracing::debug;

/// Batches smaller than this recover on the calling thread.
pub const PARALLEL_THRESHOLD: usize = 4;

fn recover_one(signer: &dyn TxSigner, tx: &Transaction) -> TxResult<Address> {
    if tx.is_ethereum() {
        return tx.sender_from(signer);
    }
    tx.sender_pubkey(signer)?;
    if tx.is_fee_delegated() {
        tx.sender_fee_payer_pubkey(signer)?;
    }
    tx.from()
}

/// Recovers every sender, in input order, filling each envelope's caches.
pub fn recover_senders(
    signer: &dyn TxSigner,
    txs: &[Arc<Transaction>],
) -> Vec<TxResult<Address>> {
    let results: Vec<_> = if txs.len() < PARALLEL_THRESHOLD {
        txs.iter().map(|tx| recover_one(signer, tx)).collect()
    } else {
        txs.par_iter().map(|tx| recover_one(signer, tx)).collect()
    };
    let failed = results.iter().filter(|r| r.is_err()).count();
    debug!(total = txs.len(), failed, "recovered senders");
    results
}

/// Sequential counterpart of [`recover_senders`].
pub fn recover_senders_sequential(
    signer: &dyn TxSigner,
    txs: &[Arc<Transaction>],
) -> Vec<TxResult<Address>> {
    txs.iter().map(|tx| recover_one(signer, tx)).collect()
}
