//! # Ethereum Typed Transactions
//!
//! Access-list (EIP-2930) and dynamic-fee (EIP-1559) transactions, carried
//! under the `0x78` envelope byte:
//!
//! ```text
//! 0x78 || 0x01 || rlp([chainId, nonce, price, gas, to, value, data, accessList, V, R, S])
//! 0x78 || 0x02 || rlp([chainId, nonce, tipCap, feeCap, gas, to, value, data, accessList, V, R, S])
//! ```
//!
//! The transaction hash and the signing hash are prefixed with the subtype
//! byte only, matching Ethereum. `V` is the bare recovery id.
//!
//! Neither type supports fee delegation.

use super::access_list::AccessList;
use super::errors::TxResult;
use super::gas::ethereum_intrinsic_gas;
use super::signature::{TxSignature, TxSignatures};
use super::tx_data::{precompiled_recipient_check, rpc_common, TxInternalData};
use super::tx_type::TxType;
use crate::config::ForkRules;
use crate::params::CodeFormat;
use crate::ports::{CallOutput, ContractRef, StateDb, Vm};
use rlp::RlpStream;
use shared_types::codec::append_optional_address;
use shared_types::{keccak256_concat, to_hex, u256_to_hex, Address, Hash, RlpReader, U256};

fn typed_hash(tx_type: TxType, body: &[u8]) -> Hash {
    keccak256_concat(&[&[tx_type.tag_byte()], body])
}

fn signing_chain_id(own: &U256, signer: &U256) -> U256 {
    if own.is_zero() {
        *signer
    } else {
        *own
    }
}

fn execute_ethereum(
    to: &Option<Address>,
    payload: &[u8],
    sender: &dyn ContractRef,
    vm: &mut dyn Vm,
    state: &mut dyn StateDb,
    gas: u64,
    value: U256,
) -> TxResult<CallOutput> {
    match to {
        None => {
            let out = vm.create(sender, payload, gas, value, CodeFormat::EVM)?;
            Ok(CallOutput {
                ret: out.ret,
                left_over_gas: out.left_over_gas,
            })
        }
        Some(to) => {
            state.inc_nonce(&sender.address());
            Ok(vm.call(sender, to, payload, gas, value)?)
        }
    }
}

// =============================================================================
// Access list
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessListTx {
    pub chain_id: U256,
    pub nonce: u64,
    pub price: U256,
    pub gas: u64,
    pub to: Option<Address>,
    pub amount: U256,
    pub payload: Vec<u8>,
    pub access_list: AccessList,
    pub signature: TxSignature,
}

impl AccessListTx {
    fn append_unsigned(&self, s: &mut RlpStream, chain_id: &U256) {
        s.append(chain_id);
        s.append(&self.nonce);
        s.append(&self.price);
        s.append(&self.gas);
        append_optional_address(s, &self.to);
        s.append(&self.amount);
        s.append(&self.payload);
        s.append(&self.access_list);
    }

    /// Signing hash; a zero chain id takes the signer's.
    pub fn sig_hash(&self, signer_chain_id: &U256) -> Hash {
        let mut s = RlpStream::new_list(8);
        self.append_unsigned(&mut s, &signing_chain_id(&self.chain_id, signer_chain_id));
        typed_hash(self.tx_type(), &s.out())
    }

    pub(crate) fn decode_body(reader: &mut RlpReader<'_>) -> TxResult<Self> {
        reader.list_header()?;
        let tx = Self {
            chain_id: reader.decode_next()?,
            nonce: reader.decode_next()?,
            price: reader.decode_next()?,
            gas: reader.decode_next()?,
            to: reader.decode_next_optional_address()?,
            amount: reader.decode_next()?,
            payload: reader.decode_next()?,
            access_list: reader.decode_next()?,
            signature: TxSignature::new(
                reader.decode_next()?,
                reader.decode_next()?,
                reader.decode_next()?,
            ),
        };
        reader.list_end()?;
        Ok(tx)
    }
}

impl TxInternalData for AccessListTx {
    fn tx_type(&self) -> TxType {
        TxType::ETHEREUM_ACCESS_LIST
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn price(&self) -> U256 {
        self.price
    }

    fn gas_limit(&self) -> u64 {
        self.gas
    }

    fn recipient(&self) -> Option<Address> {
        self.to
    }

    fn amount(&self) -> U256 {
        self.amount
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn from(&self) -> TxResult<Address> {
        Err(super::errors::TxError::LegacyTransaction)
    }

    fn signatures(&self) -> TxSignatures {
        TxSignatures::single(self.signature.clone())
    }

    fn set_signatures(&mut self, signatures: TxSignatures) {
        if let Some(first) = signatures.0.into_iter().next() {
            self.signature = first;
        }
    }

    fn chain_id(&self) -> U256 {
        self.chain_id
    }

    fn intrinsic_gas(&self, rules: &ForkRules) -> TxResult<u64> {
        ethereum_intrinsic_gas(&self.payload, Some(&self.access_list), self.to.is_none(), rules)
    }

    fn serialize_for_sign(&self) -> Vec<Vec<u8>> {
        let mut s = RlpStream::new_list(8);
        self.append_unsigned(&mut s, &self.chain_id);
        split_items(&s.out())
    }

    fn sender_tx_hash(&self) -> Hash {
        typed_hash(self.tx_type(), &self.encode_body())
    }

    fn validate(&self, state: &dyn StateDb, block_number: u64) -> TxResult<()> {
        if let Some(to) = &self.to {
            precompiled_recipient_check(to)?;
        }
        self.validate_mutable(state, block_number)
    }

    fn validate_mutable(&self, _state: &dyn StateDb, _block_number: u64) -> TxResult<()> {
        Ok(())
    }

    fn execute(
        &self,
        sender: &dyn ContractRef,
        vm: &mut dyn Vm,
        state: &mut dyn StateDb,
        _block_number: u64,
        gas: u64,
        value: U256,
    ) -> TxResult<CallOutput> {
        execute_ethereum(&self.to, &self.payload, sender, vm, state, gas, value)
    }

    fn rpc_output(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = rpc_common(self);
        map.insert("chainId".into(), u256_to_hex(&self.chain_id).into());
        map.insert("to".into(), serde_json::json!(self.to));
        map.insert("input".into(), to_hex(&self.payload).into());
        map.insert("value".into(), u256_to_hex(&self.amount).into());
        map.insert("accessList".into(), serde_json::json!(self.access_list));
        map
    }

    fn encode_body(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(11);
        self.append_unsigned(&mut s, &self.chain_id);
        s.append(&self.signature.v);
        s.append(&self.signature.r);
        s.append(&self.signature.s);
        s.out().to_vec()
    }

    fn contract_address(&self, from: &Address) -> Option<Address> {
        match self.to {
            None => Some(shared_crypto::create_address(from, self.nonce)),
            Some(_) => None,
        }
    }
}

// =============================================================================
// Dynamic fee
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DynamicFeeTx {
    pub chain_id: U256,
    pub nonce: u64,
    pub gas_tip_cap: U256,
    pub gas_fee_cap: U256,
    pub gas: u64,
    pub to: Option<Address>,
    pub amount: U256,
    pub payload: Vec<u8>,
    pub access_list: AccessList,
    pub signature: TxSignature,
}

impl DynamicFeeTx {
    fn append_unsigned(&self, s: &mut RlpStream, chain_id: &U256) {
        s.append(chain_id);
        s.append(&self.nonce);
        s.append(&self.gas_tip_cap);
        s.append(&self.gas_fee_cap);
        s.append(&self.gas);
        append_optional_address(s, &self.to);
        s.append(&self.amount);
        s.append(&self.payload);
        s.append(&self.access_list);
    }

    /// Signing hash; a zero chain id takes the signer's.
    pub fn sig_hash(&self, signer_chain_id: &U256) -> Hash {
        let mut s = RlpStream::new_list(9);
        self.append_unsigned(&mut s, &signing_chain_id(&self.chain_id, signer_chain_id));
        typed_hash(self.tx_type(), &s.out())
    }

    /// `min(tip_cap, fee_cap - base_fee)`; negative when the fee cap is
    /// below the base fee, reported as `None`.
    pub fn effective_gas_tip(&self, base_fee: &U256) -> Option<U256> {
        self.gas_fee_cap
            .checked_sub(*base_fee)
            .map(|headroom| headroom.min(self.gas_tip_cap))
    }

    /// `min(tip_cap + base_fee, fee_cap)`.
    pub fn effective_gas_price(&self, base_fee: &U256) -> U256 {
        self.gas_tip_cap
            .saturating_add(*base_fee)
            .min(self.gas_fee_cap)
    }

    pub(crate) fn decode_body(reader: &mut RlpReader<'_>) -> TxResult<Self> {
        reader.list_header()?;
        let tx = Self {
            chain_id: reader.decode_next()?,
            nonce: reader.decode_next()?,
            gas_tip_cap: reader.decode_next()?,
            gas_fee_cap: reader.decode_next()?,
            gas: reader.decode_next()?,
            to: reader.decode_next_optional_address()?,
            amount: reader.decode_next()?,
            payload: reader.decode_next()?,
            access_list: reader.decode_next()?,
            signature: TxSignature::new(
                reader.decode_next()?,
                reader.decode_next()?,
                reader.decode_next()?,
            ),
        };
        reader.list_end()?;
        Ok(tx)
    }
}

impl TxInternalData for DynamicFeeTx {
    fn tx_type(&self) -> TxType {
        TxType::ETHEREUM_DYNAMIC_FEE
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    /// The fee cap stands in for the price wherever a single price is needed.
    fn price(&self) -> U256 {
        self.gas_fee_cap
    }

    fn gas_limit(&self) -> u64 {
        self.gas
    }

    fn recipient(&self) -> Option<Address> {
        self.to
    }

    fn amount(&self) -> U256 {
        self.amount
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn from(&self) -> TxResult<Address> {
        Err(super::errors::TxError::LegacyTransaction)
    }

    fn signatures(&self) -> TxSignatures {
        TxSignatures::single(self.signature.clone())
    }

    fn set_signatures(&mut self, signatures: TxSignatures) {
        if let Some(first) = signatures.0.into_iter().next() {
            self.signature = first;
        }
    }

    fn chain_id(&self) -> U256 {
        self.chain_id
    }

    fn intrinsic_gas(&self, rules: &ForkRules) -> TxResult<u64> {
        ethereum_intrinsic_gas(&self.payload, Some(&self.access_list), self.to.is_none(), rules)
    }

    fn serialize_for_sign(&self) -> Vec<Vec<u8>> {
        let mut s = RlpStream::new_list(9);
        self.append_unsigned(&mut s, &self.chain_id);
        split_items(&s.out())
    }

    fn sender_tx_hash(&self) -> Hash {
        typed_hash(self.tx_type(), &self.encode_body())
    }

    fn validate(&self, state: &dyn StateDb, block_number: u64) -> TxResult<()> {
        if let Some(to) = &self.to {
            precompiled_recipient_check(to)?;
        }
        self.validate_mutable(state, block_number)
    }

    fn validate_mutable(&self, _state: &dyn StateDb, _block_number: u64) -> TxResult<()> {
        Ok(())
    }

    fn execute(
        &self,
        sender: &dyn ContractRef,
        vm: &mut dyn Vm,
        state: &mut dyn StateDb,
        _block_number: u64,
        gas: u64,
        value: U256,
    ) -> TxResult<CallOutput> {
        execute_ethereum(&self.to, &self.payload, sender, vm, state, gas, value)
    }

    fn rpc_output(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = rpc_common(self);
        map.remove("gasPrice");
        map.insert("chainId".into(), u256_to_hex(&self.chain_id).into());
        map.insert("maxPriorityFeePerGas".into(), u256_to_hex(&self.gas_tip_cap).into());
        map.insert("maxFeePerGas".into(), u256_to_hex(&self.gas_fee_cap).into());
        map.insert("to".into(), serde_json::json!(self.to));
        map.insert("input".into(), to_hex(&self.payload).into());
        map.insert("value".into(), u256_to_hex(&self.amount).into());
        map.insert("accessList".into(), serde_json::json!(self.access_list));
        map
    }

    fn encode_body(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(12);
        self.append_unsigned(&mut s, &self.chain_id);
        s.append(&self.signature.v);
        s.append(&self.signature.r);
        s.append(&self.signature.s);
        s.out().to_vec()
    }

    fn contract_address(&self, from: &Address) -> Option<Address> {
        match self.to {
            None => Some(shared_crypto::create_address(from, self.nonce)),
            Some(_) => None,
        }
    }
}

/// Raw items of an encoded list.
fn split_items(list: &[u8]) -> Vec<Vec<u8>> {
    rlp::Rlp::new(list)
        .iter()
        .map(|item| item.as_raw().to_vec())
        .collect()
}
