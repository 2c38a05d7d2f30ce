//! Heap entries for the priority selector.

use kc_transactions::Transaction;
use shared_types::{Address, U256};
use std::cmp::Ordering;
use std::sync::Arc;

/// Transactions of one account, shared with the pool.
pub type Transactions = Vec<Arc<Transaction>>;

/// The head transaction of one account together with its sort price.
///
/// `Ord` makes the better head the greater value, so a max-heap yields it
/// first: higher price wins, then the earlier received time.
#[derive(Clone, Debug)]
pub struct PricedHead {
    pub account: Address,
    pub price: U256,
    pub tx: Arc<Transaction>,
}

impl PricedHead {
    pub fn new(account: Address, price: U256, tx: Arc<Transaction>) -> Self {
        Self { account, price, tx }
    }
}

impl Ord for PricedHead {
    fn cmp(&self, other: &Self) -> Ordering {
        self.price
            .cmp(&other.price)
            .then_with(|| other.tx.time().cmp(&self.tx.time()))
    }
}

impl PartialOrd for PricedHead {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PricedHead {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PricedHead {}
