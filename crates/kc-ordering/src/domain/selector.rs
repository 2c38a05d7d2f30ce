//! # Price and Nonce Selector
//!
//! Yields pending transactions in the order a block producer should try
//! them. Only the lowest-nonce transaction of each account competes; the
//! rest wait in that account's queue.
//!
//! ```text
//!  heads (max-heap)        queues
//!  ┌──────────┐            A: [A1, A2]
//!  │ B0 @ 7   │ ◄─ peek    B: []
//!  │ A0 @ 5   │            C: [C1]
//!  │ C0 @ 5   │
//!  └──────────┘
//! ```
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `peek()`  | Best head, no mutation |
//! | `shift()` | Replace the best head with the next tx of the same account |
//! | `pop()`   | Drop the best head and the rest of its account |
//!
//! Not for concurrent mutation: one block builder owns a selector.

use super::value_objects::{PricedHead, Transactions};
use kc_transactions::Transaction;
use shared_types::{Address, U256};
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug)]
pub struct TransactionsByPriceAndNonce {
    txs: HashMap<Address, std::vec::IntoIter<Arc<Transaction>>>,
    heads: BinaryHeap<PricedHead>,
    base_fee: Option<U256>,
}

impl TransactionsByPriceAndNonce {
    /// Orders by gas price. Each queue must already be sorted by nonce.
    pub fn new(txs: HashMap<Address, Transactions>) -> Self {
        Self::build(txs, None)
    }

    /// Orders by the miner tip under `base_fee`. Accounts whose head cannot
    /// pay the base fee are left out entirely.
    pub fn new_with_base_fee(txs: HashMap<Address, Transactions>, base_fee: U256) -> Self {
        Self::build(txs, Some(base_fee))
    }

    fn build(txs: HashMap<Address, Transactions>, base_fee: Option<U256>) -> Self {
        let mut selector = Self {
            txs: HashMap::with_capacity(txs.len()),
            heads: BinaryHeap::with_capacity(txs.len()),
            base_fee,
        };
        for (account, queue) in txs {
            let mut queue = queue.into_iter();
            let Some(first) = queue.next() else {
                continue;
            };
            match selector.price_of(&first) {
                Some(price) => {
                    selector.heads.push(PricedHead::new(account, price, first));
                    selector.txs.insert(account, queue);
                }
                None => {
                    debug!(%account, tx_hash = ?first.hash(), "head below base fee, skipping account");
                }
            }
        }
        selector
    }

    fn price_of(&self, tx: &Transaction) -> Option<U256> {
        match &self.base_fee {
            Some(base_fee) => tx.effective_gas_tip(base_fee),
            None => Some(tx.gas_price()),
        }
    }

    /// The next transaction by price, if any.
    pub fn peek(&self) -> Option<&Arc<Transaction>> {
        self.heads.peek().map(|head| &head.tx)
    }

    /// Replaces the current best with the next transaction of its account.
    pub fn shift(&mut self) {
        let Some(head) = self.heads.pop() else {
            return;
        };
        let account = head.account;
        let next = self.txs.get_mut(&account).and_then(Iterator::next);
        match next {
            Some(tx) => match self.price_of(&tx) {
                Some(price) => {
                    trace!(%account, nonce = tx.nonce(), "shifted to next nonce");
                    self.heads.push(PricedHead::new(account, price, tx));
                }
                None => {
                    trace!(%account, "next nonce below base fee, dropping account");
                    self.txs.remove(&account);
                }
            },
            None => {
                self.txs.remove(&account);
            }
        }
    }

    /// Drops the current best and every later transaction of its account.
    pub fn pop(&mut self) {
        if let Some(head) = self.heads.pop() {
            trace!(account = %head.account, nonce = head.tx.nonce(), "popped account");
            self.txs.remove(&head.account);
        }
    }

    /// Accounts that still have a candidate.
    pub fn num_accounts(&self) -> usize {
        self.heads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    /// Transactions still selectable, heads included.
    pub fn remaining(&self) -> usize {
        self.heads.len() + self.txs.values().map(ExactSizeIterator::len).sum::<usize>()
    }

    pub fn clear(&mut self) {
        self.heads.clear();
        self.txs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kc_transactions::{DynamicFeeTx, TxData};
    use std::time::{Duration, Instant};

    fn tx(nonce: u64, price: u64, at: Instant) -> Arc<Transaction> {
        let mut tx = Transaction::new_transaction(
            nonce,
            Address::repeat_byte(0xee),
            U256::zero(),
            21_000,
            U256::from(price),
            vec![],
        );
        tx.set_time(at);
        Arc::new(tx)
    }

    fn drain(mut selector: TransactionsByPriceAndNonce) -> Vec<(u64, u64)> {
        let mut out = Vec::new();
        while let Some(tx) = selector.peek() {
            out.push((tx.gas_price().low_u64(), tx.nonce()));
            selector.shift();
        }
        out
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    #[test]
    fn test_price_then_account_nonce() {
        let now = Instant::now();
        let a = Address::repeat_byte(0xa);
        let b = Address::repeat_byte(0xb);
        let mut txs = HashMap::new();
        txs.insert(a, vec![tx(0, 5, now), tx(1, 5, now)]);
        txs.insert(b, vec![tx(0, 7, now)]);

        let mut selector = TransactionsByPriceAndNonce::new(txs);
        assert_eq!(selector.remaining(), 3);
        assert_eq!(selector.peek().unwrap().gas_price(), U256::from(7u64));
        selector.shift();
        let head = selector.peek().unwrap();
        assert_eq!((head.gas_price(), head.nonce()), (U256::from(5u64), 0));
        selector.shift();
        assert_eq!(selector.peek().unwrap().nonce(), 1);
        selector.shift();
        assert!(selector.peek().is_none());
    }

    #[test]
    fn test_nonce_beats_price_within_account() {
        let now = Instant::now();
        let mut txs = HashMap::new();
        txs.insert(Address::repeat_byte(1), vec![tx(0, 1, now), tx(1, 100, now)]);
        txs.insert(Address::repeat_byte(2), vec![tx(0, 50, now)]);
        let order = drain(TransactionsByPriceAndNonce::new(txs));
        assert_eq!(order, vec![(50, 0), (1, 0), (100, 1)]);
    }

    #[test]
    fn test_equal_price_earlier_first() {
        let now = Instant::now();
        let mut txs = HashMap::new();
        txs.insert(Address::repeat_byte(1), vec![tx(0, 9, now + Duration::from_secs(2))]);
        txs.insert(Address::repeat_byte(2), vec![tx(4, 9, now)]);
        let selector = TransactionsByPriceAndNonce::new(txs);
        assert_eq!(selector.peek().unwrap().nonce(), 4);
    }

    #[test]
    fn test_pop_discards_account_tail() {
        let now = Instant::now();
        let mut txs = HashMap::new();
        txs.insert(Address::repeat_byte(1), vec![tx(0, 9, now), tx(1, 9, now), tx(2, 9, now)]);
        txs.insert(Address::repeat_byte(2), vec![tx(0, 3, now)]);
        let mut selector = TransactionsByPriceAndNonce::new(txs);
        selector.pop();
        assert_eq!(selector.remaining(), 1);
        assert_eq!(selector.peek().unwrap().gas_price(), U256::from(3u64));
        selector.pop();
        assert!(selector.is_empty());
        selector.shift();
        selector.pop();
    }

    #[test]
    fn test_empty_queues_ignored() {
        let mut txs = HashMap::new();
        txs.insert(Address::repeat_byte(1), Vec::new());
        let selector = TransactionsByPriceAndNonce::new(txs);
        assert!(selector.is_empty());
        assert_eq!(selector.num_accounts(), 0);
    }

    // =========================================================================
    // Base fee
    // =========================================================================

    fn dynamic(nonce: u64, tip: u64, cap: u64) -> Arc<Transaction> {
        Arc::new(Transaction::new(TxData::DynamicFee(DynamicFeeTx {
            nonce,
            gas: 21_000,
            gas_tip_cap: U256::from(tip),
            gas_fee_cap: U256::from(cap),
            ..Default::default()
        })))
    }

    #[test]
    fn test_effective_tip_order() {
        let mut txs = HashMap::new();
        // Tip 2 after base fee 4.
        txs.insert(Address::repeat_byte(1), vec![dynamic(0, 2, 10)]);
        // Legacy price 5 tips 5.
        txs.insert(Address::repeat_byte(2), vec![tx(0, 5, Instant::now())]);
        // Fee cap 5 leaves only 1.
        txs.insert(Address::repeat_byte(3), vec![dynamic(0, 3, 5)]);
        // Cap below base fee.
        txs.insert(Address::repeat_byte(4), vec![dynamic(0, 9, 3)]);

        let mut selector = TransactionsByPriceAndNonce::new_with_base_fee(txs, U256::from(4u64));
        assert_eq!(selector.num_accounts(), 3);
        assert_eq!(selector.peek().unwrap().gas_price(), U256::from(5u64));
        selector.shift();
        assert_eq!(selector.peek().unwrap().gas_tip_cap(), U256::from(2u64));
        selector.shift();
        assert_eq!(selector.peek().unwrap().gas_tip_cap(), U256::from(3u64));
    }
}
