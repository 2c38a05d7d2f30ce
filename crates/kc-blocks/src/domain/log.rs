//! Contract event logs.
//!
//! Only `address`, `topics` and `data` are consensus fields. The remaining
//! fields are filled in by the node when the log is served.

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Bloom, Hash};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<Hash>,
    pub data: Vec<u8>,

    #[serde(default)]
    pub block_number: u64,
    #[serde(rename = "transactionHash", default)]
    pub tx_hash: Hash,
    #[serde(rename = "transactionIndex", default)]
    pub tx_index: u32,
    #[serde(default)]
    pub block_hash: Hash,
    #[serde(rename = "logIndex", default)]
    pub index: u32,
    /// Set when a reorg reverted the log.
    #[serde(default)]
    pub removed: bool,
}

impl Log {
    pub fn new(address: Address, topics: Vec<Hash>, data: Vec<u8>) -> Self {
        Self {
            address,
            topics,
            data,
            ..Default::default()
        }
    }

    /// Adds the address and every topic to `bloom`.
    pub fn accrue_into(&self, bloom: &mut Bloom) {
        bloom.accrue(self.address.as_bytes());
        for topic in &self.topics {
            bloom.accrue(topic.as_bytes());
        }
    }
}

impl Encodable for Log {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.address);
        s.append_list(&self.topics);
        s.append(&self.data);
    }
}

impl Decodable for Log {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Log::new(rlp.val_at(0)?, rlp.list_at(1)?, rlp.val_at(2)?))
    }
}

/// Storage encoding of a [`Log`] inside a stored receipt. Block and
/// transaction positions are dropped; they are re-derived when the receipt
/// is read back.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogForStorage(pub Log);

impl From<Log> for LogForStorage {
    fn from(log: Log) -> Self {
        Self(log)
    }
}

impl From<LogForStorage> for Log {
    fn from(stored: LogForStorage) -> Self {
        stored.0
    }
}

impl Encodable for LogForStorage {
    fn rlp_append(&self, s: &mut RlpStream) {
        let log = &self.0;
        s.begin_list(3);
        s.append(&log.address);
        s.append_list(&log.topics);
        s.append(&log.data);
    }
}

impl Decodable for LogForStorage {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self(Log::new(rlp.val_at(0)?, rlp.list_at(1)?, rlp.val_at(2)?)))
    }
}

/// Bloom over a set of logs.
pub fn logs_bloom(logs: &[Log]) -> Bloom {
    let mut bloom = Bloom::zero();
    for log in logs {
        log.accrue_into(&mut bloom);
    }
    bloom
}
