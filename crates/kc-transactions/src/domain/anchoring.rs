//! # Chain Data Anchoring
//!
//! Payload of anchoring transactions: a child chain commits a block summary
//! to its parent chain.
//!
//! Current payloads are an envelope `[type, data]` where `data` is the RLP of
//! the typed body. Payloads written before the envelope existed are a bare
//! six-field list; they are recognized only because the envelope decoder
//! rejects them.

use super::errors::{TxError, TxResult};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use shared_types::{Hash, U256};

/// Type id of [`AnchoringDataInternalType0`].
pub const ANCHORING_DATA_TYPE0: u8 = 0;

/// Versioned envelope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnchoringData {
    pub data_type: u8,
    pub data: Vec<u8>,
}

impl Encodable for AnchoringData {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.data_type);
        s.append(&self.data);
    }
}

impl Decodable for AnchoringData {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 2 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            data_type: rlp.val_at(0)?,
            data: rlp.val_at(1)?,
        })
    }
}

/// Type-0 anchoring body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnchoringDataInternalType0 {
    pub block_hash: Hash,
    pub tx_hash: Hash,
    pub parent_hash: Hash,
    pub receipt_hash: Hash,
    pub state_root_hash: Hash,
    pub block_number: U256,
    pub block_count: U256,
    pub tx_count: U256,
}

impl Encodable for AnchoringDataInternalType0 {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(8);
        s.append(&self.block_hash);
        s.append(&self.tx_hash);
        s.append(&self.parent_hash);
        s.append(&self.receipt_hash);
        s.append(&self.state_root_hash);
        s.append(&self.block_number);
        s.append(&self.block_count);
        s.append(&self.tx_count);
    }
}

impl Decodable for AnchoringDataInternalType0 {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 8 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            block_hash: rlp.val_at(0)?,
            tx_hash: rlp.val_at(1)?,
            parent_hash: rlp.val_at(2)?,
            receipt_hash: rlp.val_at(3)?,
            state_root_hash: rlp.val_at(4)?,
            block_number: rlp.val_at(5)?,
            block_count: rlp.val_at(6)?,
            tx_count: rlp.val_at(7)?,
        })
    }
}

/// Unversioned layout written before the envelope existed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnchoringDataLegacy {
    pub block_hash: Hash,
    pub tx_hash: Hash,
    pub parent_hash: Hash,
    pub receipt_hash: Hash,
    pub state_root_hash: Hash,
    pub block_number: U256,
}

impl Encodable for AnchoringDataLegacy {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(6);
        s.append(&self.block_hash);
        s.append(&self.tx_hash);
        s.append(&self.parent_hash);
        s.append(&self.receipt_hash);
        s.append(&self.state_root_hash);
        s.append(&self.block_number);
    }
}

impl Decodable for AnchoringDataLegacy {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 6 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            block_hash: rlp.val_at(0)?,
            tx_hash: rlp.val_at(1)?,
            parent_hash: rlp.val_at(2)?,
            receipt_hash: rlp.val_at(3)?,
            state_root_hash: rlp.val_at(4)?,
            block_number: rlp.val_at(5)?,
        })
    }
}

/// A decoded anchoring body of any known layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnchoringDataInternal {
    Type0(AnchoringDataInternalType0),
    Legacy(AnchoringDataLegacy),
}

impl AnchoringDataInternal {
    pub fn block_number(&self) -> U256 {
        match self {
            Self::Type0(data) => data.block_number,
            Self::Legacy(data) => data.block_number,
        }
    }

    pub fn block_hash(&self) -> Hash {
        match self {
            Self::Type0(data) => data.block_hash,
            Self::Legacy(data) => data.block_hash,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let value = match self {
            Self::Type0(data) => serde_json::to_value(data),
            Self::Legacy(data) => serde_json::to_value(data),
        };
        value.unwrap_or(serde_json::Value::Null)
    }
}

impl AnchoringData {
    /// Wraps a type-0 body in the envelope.
    pub fn from_type0(body: &AnchoringDataInternalType0) -> Self {
        Self {
            data_type: ANCHORING_DATA_TYPE0,
            data: rlp::encode(body).to_vec(),
        }
    }

    /// Serialized envelope, ready to be an anchoring tx payload.
    pub fn encode(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }
}

/// Decodes an anchoring payload, trying the envelope before the legacy layout.
pub fn decode_anchoring_data(bytes: &[u8]) -> TxResult<AnchoringDataInternal> {
    match shared_types::decode::<AnchoringData>(bytes) {
        Ok(envelope) => match envelope.data_type {
            ANCHORING_DATA_TYPE0 => {
                let body = shared_types::decode::<AnchoringDataInternalType0>(&envelope.data)?;
                Ok(AnchoringDataInternal::Type0(body))
            }
            other => Err(TxError::UnknownAnchoringTxType(other)),
        },
        Err(_) => {
            let legacy = shared_types::decode::<AnchoringDataLegacy>(bytes)?;
            Ok(AnchoringDataInternal::Legacy(legacy))
        }
    }
}
