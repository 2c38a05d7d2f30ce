//! # Block Header
//!
//! ```text
//! [ParentHash, Rewardbase, Root, TxHash, ReceiptHash, Bloom,
//!  BlockScore, Number, GasUsed, Time, TimeFoS, Extra, Governance, Vote]
//! ```
//!
//! Under IBFT the proposer and committee seals live in `Extra` after a
//! 32-byte vanity prefix. They are produced after the hash is known, so the
//! hash covers the vanity only.

use crate::config::{BlockConfig, EngineType};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use shared_types::{rlp_hash, Address, Bloom, Hash, StorageSize, U256};

/// Length of the IBFT vanity prefix of `Extra`.
pub const ISTANBUL_EXTRA_VANITY: usize = 32;

const HEADER_FIELDS: usize = 14;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub parent_hash: Hash,
    #[serde(rename = "reward")]
    pub rewardbase: Address,
    #[serde(rename = "stateRoot")]
    pub root: Hash,
    #[serde(rename = "transactionsRoot")]
    pub tx_hash: Hash,
    #[serde(rename = "receiptsRoot")]
    pub receipt_hash: Hash,
    #[serde(rename = "logsBloom")]
    pub bloom: Bloom,
    pub block_score: U256,
    pub number: U256,
    pub gas_used: u64,
    #[serde(rename = "timestamp")]
    pub time: U256,
    /// Fraction of a second past `time`.
    #[serde(rename = "timestampFoS")]
    pub time_fos: u8,
    #[serde(rename = "extraData")]
    pub extra: Vec<u8>,
    #[serde(rename = "governanceData")]
    pub governance: Vec<u8>,
    #[serde(rename = "voteData", default)]
    pub vote: Vec<u8>,
}

impl Header {
    /// Block hash. IBFT headers hash with `Extra` cut to its vanity.
    pub fn hash(&self, config: &BlockConfig) -> Hash {
        if config.engine == EngineType::Ibft {
            if let Some(filtered) = self.istanbul_filtered() {
                return rlp_hash(&filtered);
            }
        }
        rlp_hash(self)
    }

    /// A copy without seals, or `None` when `Extra` has no vanity.
    fn istanbul_filtered(&self) -> Option<Header> {
        if self.extra.len() < ISTANBUL_EXTRA_VANITY {
            return None;
        }
        let mut filtered = self.clone();
        filtered.extra.truncate(ISTANBUL_EXTRA_VANITY);
        Some(filtered)
    }

    /// Hash of the fields up to and including `Extra`.
    pub fn hash_no_nonce(&self) -> Hash {
        let mut s = RlpStream::new_list(12);
        self.append_sealed_fields(&mut s);
        shared_types::keccak256(&s.out())
    }

    fn append_sealed_fields(&self, s: &mut RlpStream) {
        s.append(&self.parent_hash);
        s.append(&self.rewardbase);
        s.append(&self.root);
        s.append(&self.tx_hash);
        s.append(&self.receipt_hash);
        s.append(&self.bloom);
        s.append(&self.block_score);
        s.append(&self.number);
        s.append(&self.gas_used);
        s.append(&self.time);
        s.append(&self.time_fos);
        s.append(&self.extra);
    }

    /// Rough in-memory footprint, for cache accounting.
    pub fn size(&self) -> StorageSize {
        let bits = self.block_score.bits() + self.number.bits() + self.time.bits();
        std::mem::size_of::<Header>() + self.extra.len() + bits / 8
    }

    /// IBFT round, the last vanity byte.
    pub fn round(&self) -> Option<u8> {
        self.extra.get(ISTANBUL_EXTRA_VANITY - 1).copied()
    }

    /// Block number, saturated to `u64`.
    pub fn number_u64(&self) -> u64 {
        if self.number.bits() > 64 {
            u64::MAX
        } else {
            self.number.low_u64()
        }
    }

    /// Whether the header commits to an empty transaction list.
    pub fn empty_body(&self, empty_root: &Hash) -> bool {
        self.tx_hash == *empty_root
    }

    /// Whether the header commits to an empty receipt list.
    pub fn empty_receipts(&self, empty_root: &Hash) -> bool {
        self.receipt_hash == *empty_root
    }
}

impl Encodable for Header {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(HEADER_FIELDS);
        self.append_sealed_fields(s);
        s.append(&self.governance);
        s.append(&self.vote);
    }
}

impl Decodable for Header {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        if rlp.item_count()? != HEADER_FIELDS {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            parent_hash: rlp.val_at(0)?,
            rewardbase: rlp.val_at(1)?,
            root: rlp.val_at(2)?,
            tx_hash: rlp.val_at(3)?,
            receipt_hash: rlp.val_at(4)?,
            bloom: rlp.val_at(5)?,
            block_score: rlp.val_at(6)?,
            number: rlp.val_at(7)?,
            gas_used: rlp.val_at(8)?,
            time: rlp.val_at(9)?,
            time_fos: rlp.val_at(10)?,
            extra: rlp.val_at(11)?,
            governance: rlp.val_at(12)?,
            vote: rlp.val_at(13)?,
        })
    }
}
