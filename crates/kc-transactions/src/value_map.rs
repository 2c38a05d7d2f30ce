//! Construction of transactions from keyed field maps.
//!
//! Every key a type needs must be present with the expected value kind;
//! anything missing or mistyped is [`TxError::InvalidValueMap`].

use crate::domain::{
    AccessList, AccessListTx, AccountKey, DynamicFeeTx, FeeDelegation, FeeRatio, LegacyTx,
    NativeBody, NativeTx, TxData, TxError, TxResult, TxType,
};
use crate::params::CodeFormat;
use crate::transaction::Transaction;
use shared_types::{Address, U256};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TxValueKey {
    Nonce,
    To,
    Amount,
    GasLimit,
    GasPrice,
    Data,
    From,
    AnchoredData,
    HumanReadable,
    AccountKey,
    FeePayer,
    FeeRatioOfFeePayer,
    CodeFormat,
    ChainId,
    AccessList,
    GasTipCap,
    GasFeeCap,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxValue {
    U64(u64),
    U256(U256),
    Address(Address),
    /// Recipient that may be absent (contract creation).
    OptionalAddress(Option<Address>),
    Bytes(Vec<u8>),
    Bool(bool),
    AccountKey(AccountKey),
    FeeRatio(FeeRatio),
    CodeFormat(CodeFormat),
    AccessList(AccessList),
}

pub type TxValueMap = HashMap<TxValueKey, TxValue>;

struct Fields<'a> {
    tx_type: TxType,
    values: &'a TxValueMap,
}

impl Fields<'_> {
    fn get(&self, key: TxValueKey) -> TxResult<&TxValue> {
        self.values.get(&key).ok_or_else(|| {
            TxError::InvalidValueMap(format!("{} requires {:?}", self.tx_type.name(), key))
        })
    }

    fn mistyped(&self, key: TxValueKey, expected: &str) -> TxError {
        TxError::InvalidValueMap(format!(
            "{}: {:?} must be {}",
            self.tx_type.name(),
            key,
            expected
        ))
    }

    fn u64(&self, key: TxValueKey) -> TxResult<u64> {
        match self.get(key)? {
            TxValue::U64(v) => Ok(*v),
            _ => Err(self.mistyped(key, "u64")),
        }
    }

    fn u256(&self, key: TxValueKey) -> TxResult<U256> {
        match self.get(key)? {
            TxValue::U256(v) => Ok(*v),
            _ => Err(self.mistyped(key, "U256")),
        }
    }

    fn address(&self, key: TxValueKey) -> TxResult<Address> {
        match self.get(key)? {
            TxValue::Address(v) => Ok(*v),
            TxValue::OptionalAddress(Some(v)) => Ok(*v),
            _ => Err(self.mistyped(key, "an address")),
        }
    }

    fn optional_address(&self, key: TxValueKey) -> TxResult<Option<Address>> {
        match self.get(key)? {
            TxValue::Address(v) => Ok(Some(*v)),
            TxValue::OptionalAddress(v) => Ok(*v),
            _ => Err(self.mistyped(key, "an optional address")),
        }
    }

    fn bytes(&self, key: TxValueKey) -> TxResult<Vec<u8>> {
        match self.get(key)? {
            TxValue::Bytes(v) => Ok(v.clone()),
            _ => Err(self.mistyped(key, "bytes")),
        }
    }

    fn bool(&self, key: TxValueKey) -> TxResult<bool> {
        match self.get(key)? {
            TxValue::Bool(v) => Ok(*v),
            _ => Err(self.mistyped(key, "bool")),
        }
    }

    fn account_key(&self, key: TxValueKey) -> TxResult<AccountKey> {
        match self.get(key)? {
            TxValue::AccountKey(v) => Ok(v.clone()),
            _ => Err(self.mistyped(key, "an account key")),
        }
    }

    fn fee_ratio(&self, key: TxValueKey) -> TxResult<FeeRatio> {
        match self.get(key)? {
            TxValue::FeeRatio(v) => Ok(*v),
            _ => Err(self.mistyped(key, "a fee ratio")),
        }
    }

    fn code_format(&self, key: TxValueKey) -> TxResult<CodeFormat> {
        match self.get(key)? {
            TxValue::CodeFormat(v) => Ok(*v),
            _ => Err(self.mistyped(key, "a code format")),
        }
    }

    fn access_list(&self, key: TxValueKey) -> TxResult<AccessList> {
        match self.get(key)? {
            TxValue::AccessList(v) => Ok(v.clone()),
            _ => Err(self.mistyped(key, "an access list")),
        }
    }

    fn fee_delegation(&self) -> TxResult<Option<FeeDelegation>> {
        if !self.tx_type.is_fee_delegated() {
            return Ok(None);
        }
        let fee_payer = self.address(TxValueKey::FeePayer)?;
        if self.tx_type.is_fee_delegated_with_ratio() {
            let ratio = self.fee_ratio(TxValueKey::FeeRatioOfFeePayer)?;
            Ok(Some(FeeDelegation::with_ratio(fee_payer, ratio)))
        } else {
            Ok(Some(FeeDelegation::new(fee_payer)))
        }
    }

    fn native_body(&self) -> TxResult<NativeBody> {
        use TxValueKey as K;
        let base = self.tx_type.base();
        Ok(match base {
            TxType::VALUE_TRANSFER => NativeBody::ValueTransfer {
                to: self.address(K::To)?,
                amount: self.u256(K::Amount)?,
            },
            TxType::VALUE_TRANSFER_MEMO => NativeBody::ValueTransferMemo {
                to: self.address(K::To)?,
                amount: self.u256(K::Amount)?,
                payload: self.bytes(K::Data)?,
            },
            TxType::ACCOUNT_CREATION => NativeBody::AccountCreation {
                to: self.address(K::To)?,
                amount: self.u256(K::Amount)?,
                human_readable: self.bool(K::HumanReadable)?,
                key: self.account_key(K::AccountKey)?,
            },
            TxType::ACCOUNT_UPDATE => NativeBody::AccountUpdate {
                key: self.account_key(K::AccountKey)?,
            },
            TxType::SMART_CONTRACT_DEPLOY => NativeBody::SmartContractDeploy {
                to: self.optional_address(K::To)?,
                amount: self.u256(K::Amount)?,
                payload: self.bytes(K::Data)?,
                human_readable: self.bool(K::HumanReadable)?,
                code_format: self.code_format(K::CodeFormat)?,
            },
            TxType::SMART_CONTRACT_EXECUTION => NativeBody::SmartContractExecution {
                to: self.address(K::To)?,
                amount: self.u256(K::Amount)?,
                payload: self.bytes(K::Data)?,
            },
            TxType::CANCEL => NativeBody::Cancel,
            TxType::CHAIN_DATA_ANCHORING => NativeBody::ChainDataAnchoring {
                payload: self.bytes(K::AnchoredData)?,
            },
            _ => return Err(TxError::UndefinedTxType(self.tx_type.0)),
        })
    }

    fn build(&self) -> TxResult<TxData> {
        use TxValueKey as K;
        match self.tx_type {
            TxType::LEGACY => Ok(TxData::Legacy(LegacyTx::new(
                self.u64(K::Nonce)?,
                self.optional_address(K::To)?,
                self.u256(K::Amount)?,
                self.u64(K::GasLimit)?,
                self.u256(K::GasPrice)?,
                self.bytes(K::Data)?,
            ))),
            TxType::ETHEREUM_ACCESS_LIST => Ok(TxData::AccessList(AccessListTx {
                chain_id: self.u256(K::ChainId)?,
                nonce: self.u64(K::Nonce)?,
                price: self.u256(K::GasPrice)?,
                gas: self.u64(K::GasLimit)?,
                to: self.optional_address(K::To)?,
                amount: self.u256(K::Amount)?,
                payload: self.bytes(K::Data)?,
                access_list: self.access_list(K::AccessList)?,
                ..Default::default()
            })),
            TxType::ETHEREUM_DYNAMIC_FEE => Ok(TxData::DynamicFee(DynamicFeeTx {
                chain_id: self.u256(K::ChainId)?,
                nonce: self.u64(K::Nonce)?,
                gas_tip_cap: self.u256(K::GasTipCap)?,
                gas_fee_cap: self.u256(K::GasFeeCap)?,
                gas: self.u64(K::GasLimit)?,
                to: self.optional_address(K::To)?,
                amount: self.u256(K::Amount)?,
                payload: self.bytes(K::Data)?,
                access_list: self.access_list(K::AccessList)?,
                ..Default::default()
            })),
            tx_type
                if !tx_type.is_ethereum()
                    && (tx_type.is_decodable() || tx_type.is_account_creation()) =>
            {
                let native = NativeTx::new(
                    self.u64(K::Nonce)?,
                    self.u256(K::GasPrice)?,
                    self.u64(K::GasLimit)?,
                    self.address(K::From)?,
                    self.native_body()?,
                    self.fee_delegation()?,
                )?;
                Ok(TxData::Native(native))
            }
            tx_type => Err(TxError::UndefinedTxType(tx_type.0)),
        }
    }
}

impl Transaction {
    /// Builds an unsigned transaction of `tx_type` from keyed values.
    pub fn from_value_map(tx_type: TxType, values: &TxValueMap) -> TxResult<Self> {
        let data = Fields { tx_type, values }.build()?;
        Ok(Transaction::new(data))
    }
}
