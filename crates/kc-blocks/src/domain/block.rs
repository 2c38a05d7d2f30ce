//! # Blocks
//!
//! A block is a header plus its transactions. Wire form:
//!
//! ```text
//! [Header, [tx0 items.., tx1 items.., ..]]
//! ```
//!
//! Typed transactions contribute their tag bytes and body as separate items
//! of the transaction list, so bodies are read with an [`RlpReader`] rather
//! than by indexing.
//!
//! ## Caches
//!
//! | Field | Filled by | Reset by |
//! |-------|-----------|----------|
//! | `hash` | first `hash()` | a new block from `with_seal` / `with_body` |
//! | `size` | `decode()` or first `size()` | same |
//!
//! A block is immutable once built; derived blocks start with empty caches.

use super::errors::{BlockError, BlockResult};
use super::header::Header;
use super::receipt::{create_bloom, Receipt};
use crate::config::BlockConfig;
use crate::ports::DeriveSha;
use kc_transactions::Transaction;
use rlp::RlpStream;
use shared_types::{Address, Bloom, Hash, RlpReader, StorageSize, U256};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;
use tracing::trace;

/// Appends `txs` as the transaction list of an enclosing stream.
fn append_transactions(s: &mut RlpStream, txs: &[Arc<Transaction>]) {
    let items = txs.iter().map(|tx| tx.item_count()).sum();
    s.begin_list(items);
    for tx in txs {
        tx.rlp_append_to(s);
    }
}

/// Reads the transaction list at the reader's cursor.
fn read_transactions(reader: &mut RlpReader<'_>) -> BlockResult<Vec<Arc<Transaction>>> {
    reader.list_header()?;
    let mut txs = Vec::new();
    while !reader.at_end() {
        txs.push(Arc::new(Transaction::decode_from(reader)?));
    }
    reader.list_end()?;
    Ok(txs)
}

// =============================================================================
// Body
// =============================================================================

/// The data content of a block, separated from its header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Body {
    pub transactions: Vec<Arc<Transaction>>,
}

impl Body {
    pub fn new(transactions: Vec<Arc<Transaction>>) -> Self {
        Self { transactions }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(1);
        append_transactions(&mut s, &self.transactions);
        s.out().to_vec()
    }

    pub fn decode(bytes: &[u8]) -> BlockResult<Self> {
        let mut reader = RlpReader::new(bytes);
        reader.list_header()?;
        let transactions = read_transactions(&mut reader)?;
        reader.list_end()?;
        reader.finish()?;
        Ok(Self { transactions })
    }
}

// =============================================================================
// Block
// =============================================================================

#[derive(Clone)]
pub struct Block {
    header: Header,
    transactions: Vec<Arc<Transaction>>,
    config: BlockConfig,

    hash: OnceLock<Hash>,
    size: OnceLock<StorageSize>,

    received_at: Option<SystemTime>,
    received_from: Option<Arc<dyn Any + Send + Sync>>,
}

impl Block {
    fn assemble(config: BlockConfig, header: Header, transactions: Vec<Arc<Transaction>>) -> Self {
        Self {
            header,
            transactions,
            config,
            hash: OnceLock::new(),
            size: OnceLock::new(),
            received_at: None,
            received_from: None,
        }
    }

    /// Builds a block, committing the header to `txs` and `receipts`.
    ///
    /// `TxHash`, `ReceiptHash` and `Bloom` of `header` are overwritten. An
    /// empty receipt list gives the empty root and a zero bloom; otherwise
    /// there must be one receipt per transaction.
    pub fn new(
        config: BlockConfig,
        header: &Header,
        txs: &[Arc<Transaction>],
        receipts: &[Receipt],
        hasher: &dyn DeriveSha,
    ) -> BlockResult<Self> {
        let mut header = header.clone();
        let number = header.number_u64();

        header.tx_hash = if txs.is_empty() {
            hasher.empty_root_hash(number)
        } else {
            hasher.derive_sha(&txs, number)
        };

        if receipts.is_empty() {
            header.receipt_hash = hasher.empty_root_hash(number);
            header.bloom = Bloom::zero();
        } else {
            if receipts.len() != txs.len() {
                return Err(BlockError::ReceiptCountMismatch {
                    txs: txs.len(),
                    receipts: receipts.len(),
                });
            }
            header.receipt_hash = hasher.derive_sha(&receipts, number);
            header.bloom = create_bloom(receipts);
        }

        trace!(number, txs = txs.len(), "assembled block");
        Ok(Self::assemble(config, header, txs.to_vec()))
    }

    /// A block with no transactions, keeping `header` as given.
    pub fn new_with_header(config: BlockConfig, header: &Header) -> Self {
        Self::assemble(config, header.clone(), Vec::new())
    }

    /// Decodes `[header, [txs]]`. The size cache is primed with the input length.
    pub fn decode(bytes: &[u8], config: BlockConfig) -> BlockResult<Self> {
        let mut reader = RlpReader::new(bytes);
        reader.list_header()?;
        let header: Header = reader.decode_next()?;
        let transactions = read_transactions(&mut reader)?;
        reader.list_end()?;
        reader.finish()?;

        let block = Self::assemble(config, header, transactions);
        let _ = block.size.set(bytes.len());
        Ok(block)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(2);
        s.append(&self.header);
        append_transactions(&mut s, &self.transactions);
        s.out().to_vec()
    }

    // =========================================================================
    // Derived blocks
    // =========================================================================

    /// This block's transactions under a sealed header.
    pub fn with_seal(&self, header: &Header) -> Self {
        Self::assemble(self.config.clone(), header.clone(), self.transactions.clone())
    }

    /// This block's header with `transactions` as the body.
    pub fn with_body(&self, transactions: &[Arc<Transaction>]) -> Self {
        Self::assemble(self.config.clone(), self.header.clone(), transactions.to_vec())
    }

    pub fn body(&self) -> Body {
        Body::new(self.transactions.clone())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn transactions(&self) -> &[Arc<Transaction>] {
        &self.transactions
    }

    /// The transaction with `hash`, if this block contains it.
    pub fn transaction(&self, hash: &Hash) -> Option<Arc<Transaction>> {
        self.transactions.iter().find(|tx| tx.hash() == *hash).cloned()
    }

    pub fn header(&self) -> Header {
        self.header.clone()
    }

    pub fn header_ref(&self) -> &Header {
        &self.header
    }

    pub fn config(&self) -> &BlockConfig {
        &self.config
    }

    pub fn number(&self) -> U256 {
        self.header.number
    }

    pub fn number_u64(&self) -> u64 {
        self.header.number_u64()
    }

    pub fn block_score(&self) -> U256 {
        self.header.block_score
    }

    pub fn time(&self) -> U256 {
        self.header.time
    }

    pub fn time_fos(&self) -> u8 {
        self.header.time_fos
    }

    pub fn gas_used(&self) -> u64 {
        self.header.gas_used
    }

    pub fn bloom(&self) -> Bloom {
        self.header.bloom
    }

    pub fn rewardbase(&self) -> Address {
        self.header.rewardbase
    }

    pub fn root(&self) -> Hash {
        self.header.root
    }

    pub fn parent_hash(&self) -> Hash {
        self.header.parent_hash
    }

    pub fn tx_hash(&self) -> Hash {
        self.header.tx_hash
    }

    pub fn receipt_hash(&self) -> Hash {
        self.header.receipt_hash
    }

    pub fn extra(&self) -> Vec<u8> {
        self.header.extra.clone()
    }

    pub fn governance(&self) -> Vec<u8> {
        self.header.governance.clone()
    }

    pub fn vote(&self) -> Vec<u8> {
        self.header.vote.clone()
    }

    /// Header hash, computed once.
    pub fn hash(&self) -> Hash {
        *self.hash.get_or_init(|| self.header.hash(&self.config))
    }

    /// Length of the wire encoding, computed once.
    pub fn size(&self) -> StorageSize {
        *self.size.get_or_init(|| self.encode().len())
    }

    // =========================================================================
    // Network metadata
    // =========================================================================

    pub fn received_at(&self) -> Option<SystemTime> {
        self.received_at
    }

    /// The peer this block arrived from, as recorded by the network layer.
    pub fn received_from(&self) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.received_from.as_ref()
    }

    pub fn set_received(&mut self, at: SystemTime, from: Option<Arc<dyn Any + Send + Sync>>) {
        self.received_at = Some(at);
        self.received_from = from;
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.transactions == other.transactions
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("hash", &self.hash())
            .field("number", &self.header.number)
            .field("header", &self.header)
            .field("transactions", &self.transactions.len())
            .field("received_at", &self.received_at)
            .finish()
    }
}
