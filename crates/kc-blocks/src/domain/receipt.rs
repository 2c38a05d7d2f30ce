//! # Receipts
//!
//! One in-memory receipt, two encodings:
//!
//! | Form | RLP |
//! |------|-----|
//! | consensus | `[status, gasUsed, bloom, logs]` |
//! | storage | `[status, bloom, txHash, contractAddress, logs, gasUsed]` |
//!
//! The consensus form is what receipt roots commit to. It carries neither the
//! transaction hash nor the deployed address, so those decode as zero.

use super::log::{logs_bloom, Log, LogForStorage};
use crate::ports::DerivableList;
use kc_transactions::{Transaction, TxError, VmError};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Bloom, Hash, StorageSize};
use std::fmt;

// =============================================================================
// Status
// =============================================================================

/// Outcome code stored in a receipt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptStatus(pub u8);

impl ReceiptStatus {
    pub const FAILED: Self = Self(0x00);
    pub const SUCCESSFUL: Self = Self(0x01);
    pub const ERR_DEFAULT: Self = Self(0x02);
    pub const ERR_DEPTH: Self = Self(0x03);
    pub const ERR_CONTRACT_ADDRESS_COLLISION: Self = Self(0x04);
    pub const ERR_CODE_STORE_OUT_OF_GAS: Self = Self(0x05);
    pub const ERR_MAX_CODE_SIZE_EXCEED: Self = Self(0x06);
    pub const ERR_OUT_OF_GAS: Self = Self(0x07);
    pub const ERR_WRITE_PROTECTION: Self = Self(0x08);
    pub const ERR_EXECUTION_REVERTED: Self = Self(0x09);
    pub const ERR_OPCODE_COMPUTATION_COST_LIMIT_REACHED: Self = Self(0x0a);
    pub const ERR_ADDRESS_ALREADY_EXISTS: Self = Self(0x0b);
    pub const ERR_NOT_A_PROGRAM_ACCOUNT: Self = Self(0x0c);
    pub const ERR_NOT_HUMAN_READABLE_ADDRESS: Self = Self(0x0d);
    pub const ERR_FEE_RATIO_OUT_OF_RANGE: Self = Self(0x0e);
    pub const ERR_ACCOUNT_KEY_FAIL_NOT_UPDATABLE: Self = Self(0x0f);
    pub const ERR_DIFFERENT_ACCOUNT_KEY_TYPE: Self = Self(0x10);
    pub const ERR_ACCOUNT_KEY_NIL_UNINITIALIZABLE: Self = Self(0x11);
    pub const ERR_NOT_ON_CURVE: Self = Self(0x12);
    pub const ERR_ZERO_KEY_WEIGHT: Self = Self(0x13);
    pub const ERR_UNSERIALIZABLE_KEY: Self = Self(0x14);
    pub const ERR_DUPLICATED_KEY: Self = Self(0x15);
    pub const ERR_WEIGHTED_SUM_OVERFLOW: Self = Self(0x16);
    pub const ERR_UNSATISFIABLE_THRESHOLD: Self = Self(0x17);
    pub const ERR_ZERO_LENGTH: Self = Self(0x18);
    pub const ERR_LENGTH_TOO_LONG: Self = Self(0x19);
    pub const ERR_NESTED_ROLE_BASED_KEY: Self = Self(0x1a);
    pub const ERR_LEGACY_TX_MUST_BE_WITH_LEGACY_KEY: Self = Self(0x1b);
    pub const ERR_DEPRECATED: Self = Self(0x1c);
    pub const ERR_NOT_SUPPORTED: Self = Self(0x1d);
    pub const ERR_INVALID_CODE_FORMAT: Self = Self(0x1e);
    /// Upper bound; never stored.
    pub const LAST: Self = Self(0x1f);

    /// Status recorded for an execution that failed with `err`.
    pub fn from_error(err: &TxError) -> Self {
        match err {
            TxError::Vm(vm) => Self::from_vm_error(vm),
            TxError::OutOfGas => Self::ERR_OUT_OF_GAS,
            TxError::AccountAlreadyExists => Self::ERR_ADDRESS_ALREADY_EXISTS,
            TxError::NotProgramAccount => Self::ERR_NOT_A_PROGRAM_ACCOUNT,
            TxError::HumanReadableNotSupported => Self::ERR_NOT_HUMAN_READABLE_ADDRESS,
            TxError::FeeRatioOutOfRange(_) => Self::ERR_FEE_RATIO_OUT_OF_RANGE,
            TxError::AccountKeyFailNotUpdatable => Self::ERR_ACCOUNT_KEY_FAIL_NOT_UPDATABLE,
            TxError::DifferentAccountKeyType => Self::ERR_DIFFERENT_ACCOUNT_KEY_TYPE,
            TxError::AccountKeyNilUninitializable => Self::ERR_ACCOUNT_KEY_NIL_UNINITIALIZABLE,
            TxError::NotOnCurve => Self::ERR_NOT_ON_CURVE,
            TxError::ZeroKeyWeight => Self::ERR_ZERO_KEY_WEIGHT,
            TxError::UnserializableKey => Self::ERR_UNSERIALIZABLE_KEY,
            TxError::DuplicatedKey => Self::ERR_DUPLICATED_KEY,
            TxError::WeightedSumOverflow => Self::ERR_WEIGHTED_SUM_OVERFLOW,
            TxError::UnsatisfiableThreshold => Self::ERR_UNSATISFIABLE_THRESHOLD,
            TxError::ZeroLength => Self::ERR_ZERO_LENGTH,
            TxError::LengthTooLong => Self::ERR_LENGTH_TOO_LONG,
            TxError::NestedCompositeType => Self::ERR_NESTED_ROLE_BASED_KEY,
            TxError::LegacyTransactionMustBeWithLegacyKey => {
                Self::ERR_LEGACY_TX_MUST_BE_WITH_LEGACY_KEY
            }
            TxError::TxTypeNotSupported(_) => Self::ERR_NOT_SUPPORTED,
            TxError::InvalidCodeFormat => Self::ERR_INVALID_CODE_FORMAT,
            _ => Self::ERR_DEFAULT,
        }
    }

    fn from_vm_error(err: &VmError) -> Self {
        match err {
            VmError::Depth => Self::ERR_DEPTH,
            VmError::ContractAddressCollision => Self::ERR_CONTRACT_ADDRESS_COLLISION,
            VmError::CodeStoreOutOfGas => Self::ERR_CODE_STORE_OUT_OF_GAS,
            VmError::MaxCodeSizeExceed => Self::ERR_MAX_CODE_SIZE_EXCEED,
            VmError::OutOfGas => Self::ERR_OUT_OF_GAS,
            VmError::WriteProtection => Self::ERR_WRITE_PROTECTION,
            VmError::ExecutionReverted => Self::ERR_EXECUTION_REVERTED,
            VmError::OpcodeComputationCostLimitReached => {
                Self::ERR_OPCODE_COMPUTATION_COST_LIMIT_REACHED
            }
            VmError::Other(_) => Self::ERR_DEFAULT,
        }
    }

    /// Status of an execution result: success, or the code for its error.
    pub fn from_result<T>(result: &Result<T, TxError>) -> Self {
        match result {
            Ok(_) => Self::SUCCESSFUL,
            Err(err) => Self::from_error(err),
        }
    }

    pub fn is_successful(self) -> bool {
        self == Self::SUCCESSFUL
    }

    /// Whether the code is one this chain assigns.
    pub fn is_known(self) -> bool {
        self < Self::LAST
    }
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

impl Encodable for ReceiptStatus {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.append(&self.0);
    }
}

impl Decodable for ReceiptStatus {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        Ok(Self(rlp.as_val()?))
    }
}

// =============================================================================
// Receipt
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub status: ReceiptStatus,
    #[serde(rename = "logsBloom")]
    pub bloom: Bloom,
    pub logs: Vec<Log>,

    #[serde(rename = "transactionHash")]
    pub tx_hash: Hash,
    pub contract_address: Address,
    pub gas_used: u64,
}

/// Receipts of one block, in transaction order.
pub type Receipts = Vec<Receipt>;

impl Receipt {
    pub fn new(status: ReceiptStatus, tx_hash: Hash, gas_used: u64) -> Self {
        Self {
            status,
            tx_hash,
            gas_used,
            ..Default::default()
        }
    }

    /// Replaces the logs and recomputes the bloom.
    pub fn set_logs(&mut self, logs: Vec<Log>) {
        self.bloom = logs_bloom(&logs);
        self.logs = logs;
    }

    /// Approximate memory held by the receipt.
    pub fn size(&self) -> StorageSize {
        let mut size = std::mem::size_of::<Receipt>() + self.logs.len() * std::mem::size_of::<Log>();
        for log in &self.logs {
            size += log.topics.len() * std::mem::size_of::<Hash>() + log.data.len();
        }
        size
    }
}

impl Encodable for Receipt {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(4);
        s.append(&self.status);
        s.append(&self.gas_used);
        s.append(&self.bloom);
        s.append_list(&self.logs);
    }
}

impl Decodable for Receipt {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 4 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            status: rlp.val_at(0)?,
            gas_used: rlp.val_at(1)?,
            bloom: rlp.val_at(2)?,
            logs: rlp.list_at(3)?,
            tx_hash: Hash::zero(),
            contract_address: Address::zero(),
        })
    }
}

/// Storage encoding of a [`Receipt`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReceiptForStorage(pub Receipt);

impl From<Receipt> for ReceiptForStorage {
    fn from(receipt: Receipt) -> Self {
        Self(receipt)
    }
}

impl From<ReceiptForStorage> for Receipt {
    fn from(stored: ReceiptForStorage) -> Self {
        stored.0
    }
}

impl Encodable for ReceiptForStorage {
    fn rlp_append(&self, s: &mut RlpStream) {
        let r = &self.0;
        s.begin_list(6);
        s.append(&r.status);
        s.append(&r.bloom);
        s.append(&r.tx_hash);
        s.append(&r.contract_address);
        s.begin_list(r.logs.len());
        for log in &r.logs {
            s.append(&LogForStorage(log.clone()));
        }
        s.append(&r.gas_used);
    }
}

impl Decodable for ReceiptForStorage {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 6 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self(Receipt {
            status: rlp.val_at(0)?,
            bloom: rlp.val_at(1)?,
            tx_hash: rlp.val_at(2)?,
            contract_address: rlp.val_at(3)?,
            logs: rlp
                .list_at::<LogForStorage>(4)?
                .into_iter()
                .map(Log::from)
                .collect(),
            gas_used: rlp.val_at(5)?,
        }))
    }
}

impl DerivableList for &[Receipt] {
    fn len(&self) -> usize {
        <[Receipt]>::len(self)
    }

    fn get_rlp(&self, index: usize) -> Vec<u8> {
        rlp::encode(&self[index]).to_vec()
    }
}

impl DerivableList for Receipts {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get_rlp(&self, index: usize) -> Vec<u8> {
        rlp::encode(&self[index]).to_vec()
    }
}

/// Union of the blooms of `receipts`.
pub fn create_bloom(receipts: &[Receipt]) -> Bloom {
    let mut bloom = Bloom::zero();
    for receipt in receipts {
        for log in &receipt.logs {
            log.accrue_into(&mut bloom);
        }
    }
    bloom
}

/// Records the deployed address when `tx` creates a contract.
pub fn fill_contract_address(tx: &Transaction, from: &Address, receipt: &mut Receipt) {
    if let Some(address) = tx.contract_address(from) {
        receipt.contract_address = address;
    }
}
