//! # Native Transactions
//!
//! Every non-Ethereum transaction type shares one shape: a common header
//! (`nonce`, `price`, `gas`, `from`), a base-specific body, the sender
//! signatures and, for the delegated mirrors, a fee payer block.
//!
//! ## Body layout after the tag byte
//!
//! ```text
//! [nonce, price, gas, <base fields>, (ratio), (codeFormat), sigs, (feePayer, feePayerSigs)]
//! ```
//!
//! | Base | Fields |
//! |------|--------|
//! | ValueTransfer | `to, value, from` |
//! | ValueTransferMemo | `to, value, from, payload` |
//! | AccountCreation | `to, value, from, humanReadable, key` |
//! | AccountUpdate | `from, key` |
//! | SmartContractDeploy | `to, value, from, payload, humanReadable` then `codeFormat` after the ratio |
//! | SmartContractExecution | `to, value, from, payload` |
//! | Cancel | `from` |
//! | ChainDataAnchoring | `from, payload` |
//!
//! Keys travel as a byte string holding their own serialization.

use super::account_key::{check_replaceable, AccountKey, RoleType};
use super::anchoring::decode_anchoring_data;
use super::errors::{TxError, TxResult};
use super::fee::FeeRatio;
use super::gas::intrinsic_gas_payload;
use super::signature::TxSignatures;
use super::tx_data::{encode_raw_list, precompiled_recipient_check, rpc_common, TxInternalData};
use super::tx_type::TxType;
use crate::config::ForkRules;
use crate::params::{
    CodeFormat, TX_CHAIN_DATA_ANCHORING_GAS, TX_GAS_ACCOUNT_CREATION, TX_GAS_ACCOUNT_UPDATE,
    TX_GAS_CANCEL, TX_GAS_CONTRACT_CREATION, TX_GAS_CONTRACT_EXECUTION, TX_GAS_FEE_DELEGATED,
    TX_GAS_FEE_DELEGATED_WITH_RATIO, TX_GAS_HUMAN_READABLE, TX_GAS_VALUE_TRANSFER,
};
use crate::ports::{CallOutput, ContractRef, StateDb, Vm};
use rlp::{Encodable, RlpStream};
use shared_crypto::create_address;
use shared_types::codec::append_optional_address;
use shared_types::{keccak256_concat, to_hex, u256_to_hex, u64_to_hex, Address, Hash, RlpReader, U256};
use tracing::trace;

/// Base-specific fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NativeBody {
    ValueTransfer {
        to: Address,
        amount: U256,
    },
    ValueTransferMemo {
        to: Address,
        amount: U256,
        payload: Vec<u8>,
    },
    /// Reserved: no longer decodable or valid.
    AccountCreation {
        to: Address,
        amount: U256,
        human_readable: bool,
        key: AccountKey,
    },
    AccountUpdate {
        key: AccountKey,
    },
    SmartContractDeploy {
        /// Only human-readable deployments name their address.
        to: Option<Address>,
        amount: U256,
        payload: Vec<u8>,
        human_readable: bool,
        code_format: CodeFormat,
    },
    SmartContractExecution {
        to: Address,
        amount: U256,
        payload: Vec<u8>,
    },
    Cancel,
    ChainDataAnchoring {
        payload: Vec<u8>,
    },
}

impl NativeBody {
    pub fn base_type(&self) -> TxType {
        match self {
            NativeBody::ValueTransfer { .. } => TxType::VALUE_TRANSFER,
            NativeBody::ValueTransferMemo { .. } => TxType::VALUE_TRANSFER_MEMO,
            NativeBody::AccountCreation { .. } => TxType::ACCOUNT_CREATION,
            NativeBody::AccountUpdate { .. } => TxType::ACCOUNT_UPDATE,
            NativeBody::SmartContractDeploy { .. } => TxType::SMART_CONTRACT_DEPLOY,
            NativeBody::SmartContractExecution { .. } => TxType::SMART_CONTRACT_EXECUTION,
            NativeBody::Cancel => TxType::CANCEL,
            NativeBody::ChainDataAnchoring { .. } => TxType::CHAIN_DATA_ANCHORING,
        }
    }
}

/// Fee payer block of delegated transactions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeeDelegation {
    pub fee_payer: Address,
    /// `None` means the fee payer pays everything.
    pub fee_ratio: Option<FeeRatio>,
    pub fee_payer_signatures: TxSignatures,
}

impl FeeDelegation {
    pub fn new(fee_payer: Address) -> Self {
        Self {
            fee_payer,
            ..Default::default()
        }
    }

    pub fn with_ratio(fee_payer: Address, ratio: FeeRatio) -> Self {
        Self {
            fee_payer,
            fee_ratio: Some(ratio),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeTx {
    pub nonce: u64,
    pub price: U256,
    pub gas: u64,
    pub from: Address,
    pub body: NativeBody,
    fee_delegation: Option<FeeDelegation>,
    pub signatures: TxSignatures,
}

fn enc<T: Encodable>(value: &T) -> Vec<u8> {
    rlp::encode(value).to_vec()
}

fn enc_optional_address(address: &Option<Address>) -> Vec<u8> {
    let mut s = RlpStream::new();
    append_optional_address(&mut s, address);
    s.out().to_vec()
}

impl NativeTx {
    /// Builds an unsigned native transaction.
    ///
    /// Account creation has no delegated mirror and is rejected with one.
    pub fn new(
        nonce: u64,
        price: U256,
        gas: u64,
        from: Address,
        body: NativeBody,
        fee_delegation: Option<FeeDelegation>,
    ) -> TxResult<Self> {
        let tx = Self {
            nonce,
            price,
            gas,
            from,
            body,
            fee_delegation,
            signatures: TxSignatures::default(),
        };
        let ty = tx.tx_type();
        if tx.body.base_type() == TxType::ACCOUNT_CREATION && tx.fee_delegation.is_some() {
            return Err(TxError::UndefinedTxType(ty.0 + 1));
        }
        Ok(tx)
    }

    pub fn fee_delegation(&self) -> Option<&FeeDelegation> {
        self.fee_delegation.as_ref()
    }

    pub fn fee_delegation_mut(&mut self) -> Option<&mut FeeDelegation> {
        self.fee_delegation.as_mut()
    }

    pub fn fee_ratio(&self) -> Option<FeeRatio> {
        self.fee_delegation.as_ref().and_then(|fd| fd.fee_ratio)
    }

    pub fn account_key(&self) -> Option<&AccountKey> {
        match &self.body {
            NativeBody::AccountCreation { key, .. } | NativeBody::AccountUpdate { key } => Some(key),
            _ => None,
        }
    }

    pub fn human_readable(&self) -> bool {
        match &self.body {
            NativeBody::AccountCreation { human_readable, .. }
            | NativeBody::SmartContractDeploy { human_readable, .. } => *human_readable,
            _ => false,
        }
    }

    pub fn code_format(&self) -> Option<CodeFormat> {
        match &self.body {
            NativeBody::SmartContractDeploy { code_format, .. } => Some(*code_format),
            _ => None,
        }
    }

    fn fee_delegation_gas(&self) -> u64 {
        match &self.fee_delegation {
            None => 0,
            Some(fd) if fd.fee_ratio.is_some() => TX_GAS_FEE_DELEGATED_WITH_RATIO,
            Some(_) => TX_GAS_FEE_DELEGATED,
        }
    }

    /// Signed fields after the tag: header, base fields, ratio, code format.
    fn signed_items(&self) -> Vec<Vec<u8>> {
        let mut items = vec![enc(&self.nonce), enc(&self.price), enc(&self.gas)];
        match &self.body {
            NativeBody::ValueTransfer { to, amount } => {
                items.extend([enc(to), enc(amount), enc(&self.from)]);
            }
            NativeBody::ValueTransferMemo {
                to,
                amount,
                payload,
            }
            | NativeBody::SmartContractExecution {
                to,
                amount,
                payload,
            } => {
                items.extend([enc(to), enc(amount), enc(&self.from), enc(payload)]);
            }
            NativeBody::AccountCreation {
                to,
                amount,
                human_readable,
                key,
            } => {
                items.extend([
                    enc(to),
                    enc(amount),
                    enc(&self.from),
                    enc(human_readable),
                    enc(&key.encode()),
                ]);
            }
            NativeBody::AccountUpdate { key } => {
                items.extend([enc(&self.from), enc(&key.encode())]);
            }
            NativeBody::SmartContractDeploy {
                to,
                amount,
                payload,
                human_readable,
                ..
            } => {
                items.extend([
                    enc_optional_address(to),
                    enc(amount),
                    enc(&self.from),
                    enc(payload),
                    enc(human_readable),
                ]);
            }
            NativeBody::Cancel => items.push(enc(&self.from)),
            NativeBody::ChainDataAnchoring { payload } => {
                items.extend([enc(&self.from), enc(payload)]);
            }
        }
        if let Some(ratio) = self.fee_ratio() {
            items.push(enc(&ratio));
        }
        if let Some(format) = self.code_format() {
            items.push(enc(&format.0));
        }
        items
    }

    pub(crate) fn decode_body(tx_type: TxType, reader: &mut RlpReader<'_>) -> TxResult<Self> {
        reader.list_header()?;
        let nonce = reader.decode_next()?;
        let price = reader.decode_next()?;
        let gas = reader.decode_next()?;
        let (from, mut body) = match tx_type.base() {
            TxType::VALUE_TRANSFER => {
                let to = reader.decode_next()?;
                let amount = reader.decode_next()?;
                (reader.decode_next()?, NativeBody::ValueTransfer { to, amount })
            }
            TxType::VALUE_TRANSFER_MEMO | TxType::SMART_CONTRACT_EXECUTION => {
                let to = reader.decode_next()?;
                let amount = reader.decode_next()?;
                let from = reader.decode_next()?;
                let payload = reader.decode_next()?;
                let body = if tx_type.base() == TxType::VALUE_TRANSFER_MEMO {
                    NativeBody::ValueTransferMemo {
                        to,
                        amount,
                        payload,
                    }
                } else {
                    NativeBody::SmartContractExecution {
                        to,
                        amount,
                        payload,
                    }
                };
                (from, body)
            }
            TxType::ACCOUNT_UPDATE => {
                let from = reader.decode_next()?;
                let raw: Vec<u8> = reader.decode_next()?;
                (
                    from,
                    NativeBody::AccountUpdate {
                        key: AccountKey::decode(&raw)?,
                    },
                )
            }
            TxType::SMART_CONTRACT_DEPLOY => {
                let to = reader.decode_next_optional_address()?;
                let amount = reader.decode_next()?;
                let from = reader.decode_next()?;
                let payload = reader.decode_next()?;
                let human_readable = reader.decode_next()?;
                (
                    from,
                    NativeBody::SmartContractDeploy {
                        to,
                        amount,
                        payload,
                        human_readable,
                        code_format: CodeFormat::EVM,
                    },
                )
            }
            TxType::CANCEL => (reader.decode_next()?, NativeBody::Cancel),
            TxType::CHAIN_DATA_ANCHORING => {
                let from = reader.decode_next()?;
                let payload = reader.decode_next()?;
                (from, NativeBody::ChainDataAnchoring { payload })
            }
            _ => return Err(TxError::UndefinedTxType(tx_type.0)),
        };

        let fee_ratio = if tx_type.is_fee_delegated_with_ratio() {
            Some(reader.decode_next::<FeeRatio>()?)
        } else {
            None
        };
        if let NativeBody::SmartContractDeploy { code_format, .. } = &mut body {
            *code_format = CodeFormat(reader.decode_next()?);
        }
        let signatures = reader.decode_next()?;
        let fee_delegation = if tx_type.is_fee_delegated() {
            Some(FeeDelegation {
                fee_payer: reader.decode_next()?,
                fee_ratio,
                fee_payer_signatures: reader.decode_next()?,
            })
        } else {
            None
        };
        reader.list_end()?;

        Ok(Self {
            nonce,
            price,
            gas,
            from,
            body,
            fee_delegation,
            signatures,
        })
    }
}

impl TxInternalData for NativeTx {
    fn tx_type(&self) -> TxType {
        let base = self.body.base_type();
        match &self.fee_delegation {
            None => base,
            Some(fd) if fd.fee_ratio.is_some() => TxType(base.0 + 2),
            Some(_) => TxType(base.0 + 1),
        }
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
        match &self.body {
            NativeBody::ValueTransfer { to, .. }
            | NativeBody::ValueTransferMemo { to, .. }
            | NativeBody::AccountCreation { to, .. }
            | NativeBody::SmartContractExecution { to, .. } => Some(*to),
            NativeBody::SmartContractDeploy { to, .. } => *to,
            NativeBody::AccountUpdate { .. }
            | NativeBody::Cancel
            | NativeBody::ChainDataAnchoring { .. } => None,
        }
    }

    fn amount(&self) -> U256 {
        match &self.body {
            NativeBody::ValueTransfer { amount, .. }
            | NativeBody::ValueTransferMemo { amount, .. }
            | NativeBody::AccountCreation { amount, .. }
            | NativeBody::SmartContractDeploy { amount, .. }
            | NativeBody::SmartContractExecution { amount, .. } => *amount,
            _ => U256::zero(),
        }
    }

    fn payload(&self) -> &[u8] {
        match &self.body {
            NativeBody::ValueTransferMemo { payload, .. }
            | NativeBody::SmartContractDeploy { payload, .. }
            | NativeBody::SmartContractExecution { payload, .. }
            | NativeBody::ChainDataAnchoring { payload } => payload,
            _ => &[],
        }
    }

    fn from(&self) -> TxResult<Address> {
        Ok(self.from)
    }

    fn signatures(&self) -> TxSignatures {
        self.signatures.clone()
    }

    fn set_signatures(&mut self, signatures: TxSignatures) {
        self.signatures = signatures;
    }

    fn intrinsic_gas(&self, _rules: &ForkRules) -> TxResult<u64> {
        let delegated = self.fee_delegation_gas();
        let add = |a: u64, b: u64| a.checked_add(b).ok_or(TxError::OutOfGas);
        match &self.body {
            NativeBody::ValueTransfer { .. } => add(TX_GAS_VALUE_TRANSFER, delegated),
            NativeBody::ValueTransferMemo { payload, .. } => {
                intrinsic_gas_payload(add(TX_GAS_VALUE_TRANSFER, delegated)?, payload)
            }
            NativeBody::SmartContractExecution { payload, .. } => {
                intrinsic_gas_payload(add(TX_GAS_CONTRACT_EXECUTION, delegated)?, payload)
            }
            NativeBody::ChainDataAnchoring { payload } => {
                intrinsic_gas_payload(add(TX_CHAIN_DATA_ANCHORING_GAS, delegated)?, payload)
            }
            NativeBody::AccountCreation {
                human_readable,
                key,
                ..
            } => {
                let gas = add(TX_GAS_ACCOUNT_CREATION, key.account_creation_gas()?)?;
                if *human_readable {
                    add(gas, TX_GAS_HUMAN_READABLE)
                } else {
                    Ok(gas)
                }
            }
            NativeBody::AccountUpdate { key } => add(
                add(TX_GAS_ACCOUNT_UPDATE, key.account_creation_gas()?)?,
                delegated,
            ),
            NativeBody::SmartContractDeploy {
                payload,
                human_readable,
                ..
            } => {
                let mut gas = add(TX_GAS_CONTRACT_CREATION, delegated)?;
                if *human_readable {
                    gas = add(gas, TX_GAS_HUMAN_READABLE)?;
                }
                intrinsic_gas_payload(gas, payload)
            }
            NativeBody::Cancel => add(TX_GAS_CANCEL, delegated),
        }
    }

    fn serialize_for_sign(&self) -> Vec<Vec<u8>> {
        let mut items = vec![enc(&self.tx_type().0)];
        items.extend(self.signed_items());
        items
    }

    fn serialize_for_sign_to_bytes(&self) -> Option<Vec<u8>> {
        Some(encode_raw_list(&self.serialize_for_sign()))
    }

    fn sender_tx_hash(&self) -> Hash {
        let mut items = self.signed_items();
        items.push(enc(&self.signatures));
        keccak256_concat(&[&enc(&self.tx_type().0), &encode_raw_list(&items)])
    }

    fn validate(&self, state: &dyn StateDb, block_number: u64) -> TxResult<()> {
        if let Some(ratio) = self.fee_ratio() {
            ratio.check()?;
        }
        match &self.body {
            NativeBody::ValueTransfer { to, .. }
            | NativeBody::ValueTransferMemo { to, .. }
            | NativeBody::SmartContractExecution { to, .. } => precompiled_recipient_check(to)?,
            NativeBody::AccountCreation { .. } => {
                return Err(TxError::UndefinedTxType(self.tx_type().0))
            }
            NativeBody::SmartContractDeploy {
                to,
                human_readable,
                code_format,
                ..
            } => {
                if to.is_some() {
                    return Err(TxError::InvalidContractAddress);
                }
                precompiled_recipient_check(&create_address(&self.from, self.nonce))?;
                if *human_readable {
                    return Err(TxError::HumanReadableNotSupported);
                }
                if !code_format.validate() {
                    return Err(TxError::InvalidCodeFormat);
                }
            }
            NativeBody::AccountUpdate { .. }
            | NativeBody::Cancel
            | NativeBody::ChainDataAnchoring { .. } => {}
        }
        self.validate_mutable(state, block_number)
    }

    fn validate_mutable(&self, state: &dyn StateDb, _block_number: u64) -> TxResult<()> {
        match &self.body {
            NativeBody::ValueTransfer { to, .. } | NativeBody::ValueTransferMemo { to, .. } => {
                if state.is_program_account(to) {
                    return Err(TxError::NotForProgramAccount);
                }
            }
            NativeBody::SmartContractExecution { to, .. } => {
                if !state.is_contract_available(to) {
                    return Err(TxError::NotProgramAccount);
                }
            }
            NativeBody::AccountUpdate { key } => {
                check_replaceable(&state.get_key(&self.from), key)?;
            }
            NativeBody::SmartContractDeploy { to: Some(to), .. } => {
                if state.exist(to) {
                    return Err(TxError::AccountAlreadyExists);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn execute(
        &self,
        sender: &dyn ContractRef,
        vm: &mut dyn Vm,
        state: &mut dyn StateDb,
        block_number: u64,
        gas: u64,
        value: U256,
    ) -> TxResult<CallOutput> {
        let unchanged = |ret: Vec<u8>| CallOutput {
            ret,
            left_over_gas: gas,
        };
        match &self.body {
            NativeBody::ValueTransfer { to, .. } => {
                state.inc_nonce(&sender.address());
                Ok(vm.call(sender, to, &[], gas, value)?)
            }
            NativeBody::ValueTransferMemo { to, payload, .. }
            | NativeBody::SmartContractExecution { to, payload, .. } => {
                state.inc_nonce(&sender.address());
                Ok(vm.call(sender, to, payload, gas, value)?)
            }
            NativeBody::AccountCreation {
                to,
                human_readable,
                key,
                ..
            } => {
                if state.exist(to) {
                    return Err(TxError::AccountAlreadyExists);
                }
                state.create_eoa(to, *human_readable, key.clone());
                state.inc_nonce(&sender.address());
                Ok(vm.call(sender, to, &[], gas, value)?)
            }
            NativeBody::AccountUpdate { key } => {
                state.inc_nonce(&sender.address());
                state.update_key(&self.from, key, block_number)?;
                Ok(unchanged(Vec::new()))
            }
            NativeBody::SmartContractDeploy {
                to,
                payload,
                human_readable,
                code_format,
                ..
            } => {
                // the VM bumps the sender nonce on creation
                let out = match to {
                    None => vm.create(sender, payload, gas, value, *code_format)?,
                    Some(address) => vm.create_with_address(
                        sender,
                        payload,
                        gas,
                        value,
                        address,
                        *human_readable,
                        *code_format,
                    )?,
                };
                Ok(CallOutput {
                    ret: out.ret,
                    left_over_gas: out.left_over_gas,
                })
            }
            NativeBody::Cancel => {
                state.inc_nonce(&sender.address());
                Ok(unchanged(Vec::new()))
            }
            NativeBody::ChainDataAnchoring { payload } => {
                state.inc_nonce(&sender.address());
                Ok(unchanged(payload.clone()))
            }
        }
    }

    fn rpc_output(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = rpc_common(self);
        match &self.body {
            NativeBody::ValueTransfer { to, amount } => {
                map.insert("to".into(), serde_json::json!(to));
                map.insert("value".into(), u256_to_hex(amount).into());
            }
            NativeBody::ValueTransferMemo {
                to,
                amount,
                payload,
            }
            | NativeBody::SmartContractExecution {
                to,
                amount,
                payload,
            } => {
                map.insert("to".into(), serde_json::json!(to));
                map.insert("value".into(), u256_to_hex(amount).into());
                map.insert("input".into(), to_hex(payload).into());
            }
            NativeBody::AccountCreation {
                to,
                amount,
                human_readable,
                key,
            } => {
                map.insert("to".into(), serde_json::json!(to));
                map.insert("value".into(), u256_to_hex(amount).into());
                map.insert("humanReadable".into(), (*human_readable).into());
                map.insert("key".into(), to_hex(&key.encode()).into());
            }
            NativeBody::AccountUpdate { key } => {
                map.insert("key".into(), to_hex(&key.encode()).into());
            }
            NativeBody::SmartContractDeploy {
                to,
                amount,
                payload,
                human_readable,
                code_format,
            } => {
                map.insert("to".into(), serde_json::json!(to));
                map.insert("value".into(), u256_to_hex(amount).into());
                map.insert("input".into(), to_hex(payload).into());
                map.insert("humanReadable".into(), (*human_readable).into());
                map.insert(
                    "codeFormat".into(),
                    u64_to_hex(u64::from(code_format.0)).into(),
                );
            }
            NativeBody::Cancel => {}
            NativeBody::ChainDataAnchoring { payload } => {
                map.insert("input".into(), to_hex(payload).into());
                let decoded = match decode_anchoring_data(payload) {
                    Ok(data) => data.to_json(),
                    Err(err) => {
                        trace!(%err, "anchoring payload is not decodable");
                        serde_json::Value::Null
                    }
                };
                map.insert("inputJSON".into(), decoded);
            }
        }
        if let Some(fd) = &self.fee_delegation {
            if let Some(ratio) = fd.fee_ratio {
                map.insert("feeRatio".into(), u64_to_hex(u64::from(ratio.get())).into());
            }
            map.insert("feePayer".into(), serde_json::json!(fd.fee_payer));
            map.insert(
                "feePayerSignatures".into(),
                fd.fee_payer_signatures.to_json(),
            );
        }
        map
    }

    fn encode_body(&self) -> Vec<u8> {
        let mut items = self.signed_items();
        items.push(enc(&self.signatures));
        if let Some(fd) = &self.fee_delegation {
            items.push(enc(&fd.fee_payer));
            items.push(enc(&fd.fee_payer_signatures));
        }
        encode_raw_list(&items)
    }

    fn role_type(&self) -> RoleType {
        match self.body {
            NativeBody::AccountUpdate { .. } => RoleType::AccountUpdate,
            _ => RoleType::Transaction,
        }
    }

    fn contract_address(&self, from: &Address) -> Option<Address> {
        match &self.body {
            NativeBody::SmartContractDeploy { to: None, .. } => {
                Some(create_address(from, self.nonce))
            }
            NativeBody::SmartContractDeploy { to: Some(to), .. } => Some(*to),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signature::TxSignature;
    use crate::ports::mock::{MockState, MockVm};
    use crate::ports::AccountRef;

    fn value_transfer(delegation: Option<FeeDelegation>) -> NativeTx {
        NativeTx::new(
            1,
            U256::from(25u64),
            50_000,
            Address::repeat_byte(0xaa),
            NativeBody::ValueTransfer {
                to: Address::repeat_byte(0xbb),
                amount: U256::from(10u64),
            },
            delegation,
        )
        .unwrap()
    }

    fn deploy(to: Option<Address>, human_readable: bool, format: CodeFormat) -> NativeTx {
        NativeTx::new(
            0,
            U256::one(),
            1_000_000,
            Address::repeat_byte(0xaa),
            NativeBody::SmartContractDeploy {
                to,
                amount: U256::zero(),
                payload: vec![0x60, 0x80],
                human_readable,
                code_format: format,
            },
            None,
        )
        .unwrap()
    }

    fn decode(tx: &NativeTx) -> NativeTx {
        let bytes = tx.encode_body();
        let mut reader = RlpReader::new(&bytes);
        let decoded = NativeTx::decode_body(tx.tx_type(), &mut reader).unwrap();
        reader.finish().unwrap();
        decoded
    }

    // =========================================================================
    // Type derivation
    // =========================================================================

    #[test]
    fn test_type_follows_delegation() {
        assert_eq!(value_transfer(None).tx_type(), TxType::VALUE_TRANSFER);
        assert_eq!(
            value_transfer(Some(FeeDelegation::new(Address::zero()))).tx_type(),
            TxType::FEE_DELEGATED_VALUE_TRANSFER
        );
        let ratio = FeeRatio::new(30).unwrap();
        assert_eq!(
            value_transfer(Some(FeeDelegation::with_ratio(Address::zero(), ratio))).tx_type(),
            TxType::FEE_DELEGATED_VALUE_TRANSFER_WITH_RATIO
        );
    }

    #[test]
    fn test_delegated_account_creation_rejected() {
        let result = NativeTx::new(
            0,
            U256::zero(),
            0,
            Address::zero(),
            NativeBody::AccountCreation {
                to: Address::zero(),
                amount: U256::zero(),
                human_readable: false,
                key: AccountKey::Legacy,
            },
            Some(FeeDelegation::new(Address::zero())),
        );
        assert_eq!(result.unwrap_err(), TxError::UndefinedTxType(0x19));
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    #[test]
    fn test_ratio_precedes_code_format() {
        let mut tx = deploy(None, false, CodeFormat::EVM);
        tx.fee_delegation = Some(FeeDelegation::with_ratio(
            Address::repeat_byte(0xfe),
            FeeRatio::new(40).unwrap(),
        ));
        let items = tx.signed_items();
        let n = items.len();
        assert_eq!(items[n - 2], vec![40]);
        assert_eq!(items[n - 1], vec![0x80]);
        assert_eq!(decode(&tx), tx);
    }

    #[test]
    fn test_body_decode_per_base() {
        let mut update = NativeTx::new(
            2,
            U256::from(25u64),
            100_000,
            Address::repeat_byte(1),
            NativeBody::AccountUpdate {
                key: AccountKey::Fail,
            },
            Some(FeeDelegation::new(Address::repeat_byte(2))),
        )
        .unwrap();
        update.signatures = TxSignatures::single(TxSignature::new(
            U256::from(37u64),
            U256::one(),
            U256::one(),
        ));
        assert_eq!(decode(&update), update);

        let anchoring = NativeTx::new(
            3,
            U256::one(),
            100_000,
            Address::repeat_byte(1),
            NativeBody::ChainDataAnchoring {
                payload: vec![1, 2, 3],
            },
            None,
        )
        .unwrap();
        assert_eq!(decode(&anchoring), anchoring);
        assert_eq!(decode(&deploy(None, true, CodeFormat::EVM)), deploy(None, true, CodeFormat::EVM));
    }

    #[test]
    fn test_sender_tx_hash_ignores_fee_payer() {
        let mut a = value_transfer(Some(FeeDelegation::new(Address::repeat_byte(1))));
        let mut b = a.clone();
        b.fee_delegation_mut().unwrap().fee_payer = Address::repeat_byte(2);
        assert_eq!(a.sender_tx_hash(), b.sender_tx_hash());
        assert_ne!(a.encode_body(), b.encode_body());
        a.signatures = TxSignatures::single(TxSignature::new(U256::from(38u64), U256::one(), U256::one()));
        assert_ne!(a.sender_tx_hash(), b.sender_tx_hash());
    }

    #[test]
    fn test_sign_preimage_starts_with_type() {
        let tx = value_transfer(Some(FeeDelegation::new(Address::zero())));
        let items = tx.serialize_for_sign();
        assert_eq!(items[0], vec![0x09]);
        assert_eq!(items.len(), 7);
    }

    // =========================================================================
    // Gas
    // =========================================================================

    #[test]
    fn test_intrinsic_gas() {
        let rules = ForkRules::default();
        assert_eq!(value_transfer(None).intrinsic_gas(&rules).unwrap(), 21_000);
        let ratio = FeeRatio::new(10).unwrap();
        assert_eq!(
            value_transfer(Some(FeeDelegation::with_ratio(Address::zero(), ratio)))
                .intrinsic_gas(&rules)
                .unwrap(),
            36_000
        );
        assert_eq!(
            deploy(None, false, CodeFormat::EVM).intrinsic_gas(&rules).unwrap(),
            53_000 + 200
        );
        assert_eq!(
            deploy(None, true, CodeFormat::EVM).intrinsic_gas(&rules).unwrap(),
            53_000 + 4_000_000_000 + 200
        );
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn test_deploy_validation() {
        let state = MockState::default();
        assert!(deploy(None, false, CodeFormat::EVM).validate(&state, 0).is_ok());
        assert_eq!(
            deploy(Some(Address::repeat_byte(9)), false, CodeFormat::EVM).validate(&state, 0),
            Err(TxError::InvalidContractAddress)
        );
        assert_eq!(
            deploy(None, true, CodeFormat::EVM).validate(&state, 0),
            Err(TxError::HumanReadableNotSupported)
        );
        assert_eq!(
            deploy(None, false, CodeFormat(7)).validate(&state, 0),
            Err(TxError::InvalidCodeFormat)
        );
    }

    #[test]
    fn test_value_transfer_to_program_rejected() {
        let state = MockState::default().with_program(Address::repeat_byte(0xbb));
        assert_eq!(
            value_transfer(None).validate(&state, 0),
            Err(TxError::NotForProgramAccount)
        );
        let mut to_precompile = value_transfer(None);
        to_precompile.body = NativeBody::ValueTransfer {
            to: Address::from_low_u64_be(1),
            amount: U256::zero(),
        };
        assert_eq!(
            to_precompile.validate(&MockState::default(), 0),
            Err(TxError::PrecompiledContractAddress)
        );
    }

    #[test]
    fn test_execution_requires_program() {
        let tx = NativeTx::new(
            0,
            U256::zero(),
            100_000,
            Address::repeat_byte(1),
            NativeBody::SmartContractExecution {
                to: Address::repeat_byte(0xcc),
                amount: U256::zero(),
                payload: vec![],
            },
            None,
        )
        .unwrap();
        assert_eq!(
            tx.validate(&MockState::default(), 0),
            Err(TxError::NotProgramAccount)
        );
        let state = MockState::default().with_program(Address::repeat_byte(0xcc));
        assert!(tx.validate(&state, 0).is_ok());
    }

    #[test]
    fn test_account_update_checks_installed_key() {
        let from = Address::repeat_byte(1);
        let tx = NativeTx::new(
            0,
            U256::zero(),
            100_000,
            from,
            NativeBody::AccountUpdate {
                key: AccountKey::Legacy,
            },
            None,
        )
        .unwrap();
        let state = MockState::default().with_key(from, AccountKey::Fail);
        assert_eq!(
            tx.validate(&state, 0),
            Err(TxError::AccountKeyFailNotUpdatable)
        );
        assert_eq!(tx.role_type(), RoleType::AccountUpdate);
    }

    // =========================================================================
    // Execution
    // =========================================================================

    #[test]
    fn test_value_transfer_execute() {
        let tx = value_transfer(None);
        let mut state = MockState::default();
        let mut vm = MockVm::default();
        let sender = AccountRef::new(tx.from);
        let out = tx
            .execute(&sender, &mut vm, &mut state, 0, 30_000, U256::from(10u64))
            .unwrap();
        assert_eq!(out.left_over_gas, 30_000);
        assert_eq!(state.nonce(&tx.from), 1);
        assert_eq!(vm.calls[0].1, Address::repeat_byte(0xbb));
        assert!(vm.calls[0].2.is_empty());
    }

    #[test]
    fn test_anchoring_execute_returns_payload() {
        let tx = NativeTx::new(
            0,
            U256::zero(),
            100_000,
            Address::repeat_byte(1),
            NativeBody::ChainDataAnchoring {
                payload: vec![9, 9],
            },
            None,
        )
        .unwrap();
        let mut state = MockState::default();
        let out = tx
            .execute(
                &AccountRef::new(tx.from),
                &mut MockVm::default(),
                &mut state,
                0,
                5,
                U256::zero(),
            )
            .unwrap();
        assert_eq!(out.ret, vec![9, 9]);
        assert_eq!(state.nonce(&tx.from), 1);
    }

    #[test]
    fn test_contract_address() {
        let tx = deploy(None, false, CodeFormat::EVM);
        assert_eq!(
            tx.contract_address(&tx.from),
            Some(create_address(&tx.from, 0))
        );
        assert_eq!(value_transfer(None).contract_address(&Address::zero()), None);
    }
}
