//! # Domain Errors
//!
//! Failures of block, header and receipt construction and decoding.

use kc_transactions::TxError;
use shared_types::CodecError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BlockError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Transaction(#[from] TxError),

    #[error("{receipts} receipts for {txs} transactions")]
    ReceiptCountMismatch { txs: usize, receipts: usize },
}

impl From<rlp::DecoderError> for BlockError {
    fn from(err: rlp::DecoderError) -> Self {
        BlockError::Codec(err.into())
    }
}

pub type BlockResult<T> = Result<T, BlockError>;
