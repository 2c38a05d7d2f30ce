//! Domain layer of the block core.

pub mod block;
pub mod errors;
pub mod header;
pub mod log;
pub mod receipt;

pub use block::{Block, Body};
pub use errors::{BlockError, BlockResult};
pub use header::{Header, ISTANBUL_EXTRA_VANITY};
pub use log::{logs_bloom, Log, LogForStorage};
pub use receipt::{
    create_bloom, fill_contract_address, Receipt, ReceiptForStorage, ReceiptStatus, Receipts,
};
