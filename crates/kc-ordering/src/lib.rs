//! # Transaction Ordering
//!
//! Chooses which pending transaction a block producer tries next.
//!
//! ## Ordering Rules
//!
//! | Rule | Enforcement Location |
//! |------|---------------------|
//! | Higher price first | `domain/value_objects.rs` - `PricedHead::cmp()` |
//! | Equal price: earlier received first | `domain/value_objects.rs` - `PricedHead::cmp()` |
//! | Nonce order within an account | `domain/selector.rs` - only queue heads compete |
//! | Non-executable tx drops its account | `domain/selector.rs` - `pop()` |
//!
//! The selector takes ownership of the per-account queues at construction;
//! callers keep sharing the transactions themselves through `Arc`.

pub mod domain;

pub use domain::*;

#[cfg(test)]
mod tests {
    use super::*;
    use kc_transactions::Transaction;
    use proptest::prelude::*;
    use shared_types::{Address, U256};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// Per account: a list of (price, time offset) in nonce order.
    fn accounts() -> impl Strategy<Value = Vec<Vec<(u64, u64)>>> {
        proptest::collection::vec(
            proptest::collection::vec((1u64..20, 0u64..1_000), 1..6),
            1..8,
        )
    }

    fn build(layout: &[Vec<(u64, u64)>]) -> HashMap<Address, Transactions> {
        let base = Instant::now();
        layout.iter()
            .enumerate()
            .map(|(i, queue)| {
                let account = Address::from_low_u64_be(i as u64 + 1);
                let txs = queue
                    .iter()
                    .enumerate()
                    .map(|(nonce, (price, offset))| {
                        let mut tx = Transaction::new_transaction(
                            nonce as u64,
                            account,
                            U256::zero(),
                            21_000,
                            U256::from(*price),
                            vec![],
                        );
                        tx.set_time(base + Duration::from_millis(*offset));
                        Arc::new(tx)
                    })
                    .collect();
                (account, txs)
            })
            .collect()
    }

    proptest! {
        #[test]
        fn test_selection_order(layout in accounts()) {
            let total: usize = layout.iter().map(Vec::len).sum();
            let mut selector = TransactionsByPriceAndNonce::new(build(&layout));
            let mut emitted: Vec<Arc<Transaction>> = Vec::new();
            while let Some(tx) = selector.peek().cloned() {
                emitted.push(tx);
                selector.shift();
            }
            prop_assert_eq!(emitted.len(), total);

            // Nonces of one account come out ascending.
            let mut last_nonce: HashMap<Address, u64> = HashMap::new();
            for tx in &emitted {
                let account = tx.to().unwrap();
                if let Some(prev) = last_nonce.insert(account, tx.nonce()) {
                    prop_assert!(prev < tx.nonce());
                }
            }

            // Across accounts, consecutive picks never rise in price, and
            // equal prices come out in received order.
            for pair in emitted.windows(2) {
                if pair[0].to() != pair[1].to() {
                    prop_assert!(pair[0].gas_price() >= pair[1].gas_price());
                    if pair[0].gas_price() == pair[1].gas_price() {
                        prop_assert!(pair[0].time() <= pair[1].time());
                    }
                }
            }
        }
    }
}
