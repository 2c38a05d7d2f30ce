//! Outbound (Driven) ports for the block core.
//!
//! The root hashes of transaction and receipt lists come from a hasher chosen
//! by chain configuration; blocks only see it through [`DeriveSha`].

use kc_transactions::Transaction;
use shared_types::Hash;
use std::sync::Arc;

/// An ordered list whose items can be RLP encoded one by one.
///
/// Implemented for slices by reference so a borrowed list coerces to
/// `&dyn DerivableList`.
pub trait DerivableList {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// RLP encoding of item `index`.
    fn get_rlp(&self, index: usize) -> Vec<u8>;
}

/// Root hash computation for derivable lists.
pub trait DeriveSha: Send + Sync {
    fn derive_sha(&self, list: &dyn DerivableList, block_number: u64) -> Hash;

    /// Root of an empty list at `block_number`.
    fn empty_root_hash(&self, block_number: u64) -> Hash;
}

impl DerivableList for &[Arc<Transaction>] {
    fn len(&self) -> usize {
        <[Arc<Transaction>]>::len(self)
    }

    fn get_rlp(&self, index: usize) -> Vec<u8> {
        self[index].encode()
    }
}

impl DerivableList for Vec<Arc<Transaction>> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get_rlp(&self, index: usize) -> Vec<u8> {
        self[index].encode()
    }
}
