//! # Transaction Data
//!
//! The behaviour every transaction variant exposes, and [`TxData`], the closed
//! set of variants with their wire codec.
//!
//! ## Wire forms
//!
//! | Family | Bytes |
//! |--------|-------|
//! | Legacy | `rlp([...])` |
//! | Native | `tag || rlp([...])` |
//! | Ethereum typed | `0x78 || subtype || rlp([...])` |
//!
//! The reader peeks at the first item: a list is a legacy transaction, a single
//! byte is a tag. Inside a block body the same items appear back to back, so
//! decoding works on an [`RlpReader`] positioned at the first item.

use super::account_key::RoleType;
use super::errors::{TxError, TxResult};
use super::eth_typed::{AccessListTx, DynamicFeeTx};
use super::legacy::LegacyTx;
use super::native::{FeeDelegation, NativeTx};
use super::signature::TxSignatures;
use super::tx_type::{TxType, ETHEREUM_TX_TYPE_ENVELOPE};
use crate::config::ForkRules;
use crate::params::is_precompiled_contract_address;
use crate::ports::{CallOutput, ContractRef, StateDb, Vm};
use rlp::RlpStream;
use shared_types::{u256_to_hex, u64_to_hex, Address, Hash, ItemKind, RlpReader, U256};
use std::fmt;
use tracing::trace;

/// Behaviour shared by every transaction variant.
pub trait TxInternalData: fmt::Debug + Send + Sync {
    fn tx_type(&self) -> TxType;
    fn nonce(&self) -> u64;
    fn price(&self) -> U256;
    fn gas_limit(&self) -> u64;

    /// `None` for contract creation and for types without a recipient.
    fn recipient(&self) -> Option<Address>;
    fn amount(&self) -> U256;

    fn payload(&self) -> &[u8] {
        &[]
    }

    /// The declared sender. Ethereum variants do not carry one.
    fn from(&self) -> TxResult<Address>;

    fn signatures(&self) -> TxSignatures;
    fn set_signatures(&mut self, signatures: TxSignatures);

    fn chain_id(&self) -> U256 {
        self.signatures().chain_id()
    }

    fn intrinsic_gas(&self, rules: &ForkRules) -> TxResult<u64>;

    /// Raw RLP items the EIP-155 signing hash is computed over.
    fn serialize_for_sign(&self) -> Vec<Vec<u8>>;

    /// Native variants sign the serialized preimage as one byte string.
    fn serialize_for_sign_to_bytes(&self) -> Option<Vec<u8>> {
        None
    }

    /// Hash of the sender-signed part only, unaffected by fee payer fields.
    fn sender_tx_hash(&self) -> Hash;

    /// Stateless checks followed by [`TxInternalData::validate_mutable`].
    fn validate(&self, state: &dyn StateDb, block_number: u64) -> TxResult<()>;

    /// Checks that depend on state which may change between blocks.
    fn validate_mutable(&self, state: &dyn StateDb, block_number: u64) -> TxResult<()>;

    fn execute(
        &self,
        sender: &dyn ContractRef,
        vm: &mut dyn Vm,
        state: &mut dyn StateDb,
        block_number: u64,
        gas: u64,
        value: U256,
    ) -> TxResult<CallOutput>;

    fn rpc_output(&self) -> serde_json::Map<String, serde_json::Value>;

    /// RLP body without any tag bytes.
    fn encode_body(&self) -> Vec<u8>;

    /// Address a successful execution creates, if any.
    fn contract_address(&self, _from: &Address) -> Option<Address> {
        None
    }

    /// Key role the sender signature is checked against.
    fn role_type(&self) -> RoleType {
        RoleType::Transaction
    }
}

/// Fields every RPC projection starts from.
pub(crate) fn rpc_common<T: TxInternalData + ?Sized>(
    tx: &T,
) -> serde_json::Map<String, serde_json::Value> {
    let tx_type = tx.tx_type();
    let mut map = serde_json::Map::new();
    map.insert("typeInt".into(), tx_type.0.into());
    map.insert("type".into(), tx_type.name().into());
    map.insert("gas".into(), u64_to_hex(tx.gas_limit()).into());
    map.insert("gasPrice".into(), u256_to_hex(&tx.price()).into());
    map.insert("nonce".into(), u64_to_hex(tx.nonce()).into());
    map.insert("signatures".into(), tx.signatures().to_json());
    map
}

pub(crate) fn precompiled_recipient_check(to: &Address) -> TxResult<()> {
    if is_precompiled_contract_address(to) {
        return Err(TxError::PrecompiledContractAddress);
    }
    Ok(())
}

/// Wraps already-encoded items in a list header.
pub(crate) fn encode_raw_list(items: &[Vec<u8>]) -> Vec<u8> {
    let mut s = RlpStream::new_list(items.len());
    for item in items {
        s.append_raw(item, 1);
    }
    s.out().to_vec()
}

/// One transaction of any type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxData {
    Legacy(LegacyTx),
    AccessList(AccessListTx),
    DynamicFee(DynamicFeeTx),
    Native(NativeTx),
}

impl TxData {
    pub fn inner(&self) -> &dyn TxInternalData {
        match self {
            TxData::Legacy(tx) => tx,
            TxData::AccessList(tx) => tx,
            TxData::DynamicFee(tx) => tx,
            TxData::Native(tx) => tx,
        }
    }

    pub fn inner_mut(&mut self) -> &mut dyn TxInternalData {
        match self {
            TxData::Legacy(tx) => tx,
            TxData::AccessList(tx) => tx,
            TxData::DynamicFee(tx) => tx,
            TxData::Native(tx) => tx,
        }
    }

    pub fn fee_delegation(&self) -> Option<&FeeDelegation> {
        match self {
            TxData::Native(tx) => tx.fee_delegation(),
            _ => None,
        }
    }

    pub fn fee_delegation_mut(&mut self) -> Option<&mut FeeDelegation> {
        match self {
            TxData::Native(tx) => tx.fee_delegation_mut(),
            _ => None,
        }
    }

    /// Canonical wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        let tx_type = self.inner().tx_type();
        let body = self.inner().encode_body();
        let mut out = Vec::with_capacity(body.len() + 2);
        if tx_type.is_eth_typed() {
            out.push(ETHEREUM_TX_TYPE_ENVELOPE);
            out.push(tx_type.tag_byte());
        } else if !tx_type.is_legacy() {
            out.push(tx_type.tag_byte());
        }
        out.extend_from_slice(&body);
        out
    }

    /// Number of RLP items the wire form occupies in a stream.
    pub fn item_count(&self) -> usize {
        let tx_type = self.inner().tx_type();
        if tx_type.is_eth_typed() {
            3
        } else if tx_type.is_legacy() {
            1
        } else {
            2
        }
    }

    /// Decodes one complete transaction; trailing bytes are rejected.
    pub fn decode(bytes: &[u8]) -> TxResult<Self> {
        let mut reader = RlpReader::new(bytes);
        let tx = Self::decode_from(&mut reader)?;
        reader.finish()?;
        Ok(tx)
    }

    /// Decodes the transaction starting at the reader's cursor.
    pub fn decode_from(reader: &mut RlpReader<'_>) -> TxResult<Self> {
        let tx = match reader.kind()? {
            ItemKind::List(_) => TxData::Legacy(LegacyTx::decode_body(reader)?),
            ItemKind::Byte(ETHEREUM_TX_TYPE_ENVELOPE) => {
                reader.raw_next()?;
                let subtype = match reader.kind()? {
                    ItemKind::Byte(subtype) => subtype,
                    _ => return Err(TxError::UndefinedTxType(u16::from(ETHEREUM_TX_TYPE_ENVELOPE) << 8)),
                };
                reader.raw_next()?;
                let tx_type = TxType((u16::from(ETHEREUM_TX_TYPE_ENVELOPE) << 8) | u16::from(subtype));
                match tx_type {
                    TxType::ETHEREUM_ACCESS_LIST => TxData::AccessList(AccessListTx::decode_body(reader)?),
                    TxType::ETHEREUM_DYNAMIC_FEE => TxData::DynamicFee(DynamicFeeTx::decode_body(reader)?),
                    _ => return Err(TxError::UndefinedTxType(tx_type.0)),
                }
            }
            ItemKind::Byte(tag) => {
                reader.raw_next()?;
                let tx_type = TxType(u16::from(tag));
                if tx_type.is_legacy() || !tx_type.is_decodable() || tx_type >= TxType::KLAYTN_LAST {
                    return Err(TxError::UndefinedTxType(tx_type.0));
                }
                TxData::Native(NativeTx::decode_body(tx_type, reader)?)
            }
            ItemKind::String(_) => return Err(TxError::Codec(shared_types::CodecError::ExpectedList)),
        };

        tx.check_signature_values()?;
        Ok(tx)
    }

    /// Range checks on the sender signatures; fee payer signatures are
    /// checked only at recovery.
    pub fn check_signature_values(&self) -> TxResult<()> {
        let valid = match self {
            TxData::AccessList(inner) => inner.signature.validate_typed(),
            TxData::DynamicFee(inner) => inner.signature.validate_typed(),
            _ => self.inner().signatures().validate(),
        };
        if !valid {
            trace!(tx_type = %self.inner().tx_type().name(), "rejecting signature values");
            return Err(TxError::InvalidSig);
        }
        Ok(())
    }
}
