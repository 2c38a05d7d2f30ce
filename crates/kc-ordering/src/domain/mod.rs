//! Domain layer: heap entries, the selector and nonce helpers.

pub mod nonce;
pub mod selector;
pub mod value_objects;

pub use nonce::{sort_by_nonce, tx_difference};
pub use selector::TransactionsByPriceAndNonce;
pub use value_objects::{PricedHead, Transactions};
