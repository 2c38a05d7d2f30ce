//! Nonce sorting and set difference over transaction lists.

use super::value_objects::Transactions;
use kc_transactions::Transaction;
use shared_types::Hash;
use std::collections::HashSet;
use std::sync::Arc;

/// Sorts a single account's transactions by ascending nonce.
pub fn sort_by_nonce(txs: &mut [Arc<Transaction>]) {
    txs.sort_by_key(|tx| tx.nonce());
}

/// Transactions of `a` whose hash does not appear in `b`, in `a`'s order.
pub fn tx_difference(a: &[Arc<Transaction>], b: &[Arc<Transaction>]) -> Transactions {
    let remove: HashSet<Hash> = b.iter().map(|tx| tx.hash()).collect();
    a.iter()
        .filter(|tx| !remove.contains(&tx.hash()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Address, U256};

    fn tx(nonce: u64) -> Arc<Transaction> {
        Arc::new(Transaction::new_transaction(
            nonce,
            Address::repeat_byte(1),
            U256::zero(),
            21_000,
            U256::one(),
            vec![],
        ))
    }

    #[test]
    fn test_sort_by_nonce() {
        let mut txs = vec![tx(3), tx(0), tx(2), tx(1)];
        sort_by_nonce(&mut txs);
        let nonces: Vec<_> = txs.iter().map(|tx| tx.nonce()).collect();
        assert_eq!(nonces, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_difference_keeps_order() {
        let a = vec![tx(0), tx(1), tx(2), tx(3)];
        let b = vec![tx(2), tx(0), tx(9)];
        let diff = tx_difference(&a, &b);
        let nonces: Vec<_> = diff.iter().map(|tx| tx.nonce()).collect();
        assert_eq!(nonces, vec![1, 3]);
        assert!(tx_difference(&a, &a).is_empty());
        assert_eq!(tx_difference(&a, &[]).len(), 4);
    }
}
