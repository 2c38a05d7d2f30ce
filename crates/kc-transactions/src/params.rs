//! Protocol constants for intrinsic gas and contract code formats.

use serde::{Deserialize, Serialize};
use shared_types::{Address, U256};

/// Base cost of every Ethereum-family transaction.
pub const TX_GAS: u64 = 21_000;
/// Base cost of a contract creation.
pub const TX_GAS_CONTRACT_CREATION: u64 = 53_000;
/// Per zero payload byte before Istanbul (Ethereum family).
pub const TX_DATA_ZERO_GAS: u64 = 4;
/// Per non-zero payload byte before Istanbul (Ethereum family).
pub const TX_DATA_NON_ZERO_GAS: u64 = 68;
/// Flat per-byte payload cost.
pub const TX_DATA_GAS: u64 = 100;

pub const TX_GAS_VALUE_TRANSFER: u64 = 21_000;
pub const TX_GAS_CONTRACT_EXECUTION: u64 = 21_000;
pub const TX_GAS_ACCOUNT_CREATION: u64 = 21_000;
pub const TX_GAS_ACCOUNT_UPDATE: u64 = 21_000;
pub const TX_GAS_CANCEL: u64 = 21_000;
pub const TX_CHAIN_DATA_ANCHORING_GAS: u64 = 21_000;

/// Surcharge for fee-delegated transactions.
pub const TX_GAS_FEE_DELEGATED: u64 = 10_000;
/// Surcharge for fee-delegated transactions carrying a fee ratio.
pub const TX_GAS_FEE_DELEGATED_WITH_RATIO: u64 = 15_000;
/// Surcharge for registering a human-readable address.
pub const TX_GAS_HUMAN_READABLE: u64 = 4_000_000_000;

/// Installing one public key.
pub const TX_ACCOUNT_CREATION_GAS_PER_KEY: u64 = 20_000;
/// Validating each additional signature or key.
pub const TX_VALIDATION_GAS_PER_KEY: u64 = 15_000;

/// EIP-2930 access list pricing.
pub const TX_ACCESS_LIST_ADDRESS_GAS: u64 = 2_400;
pub const TX_ACCESS_LIST_STORAGE_KEY_GAS: u64 = 1_900;

/// Highest address reserved for precompiled contracts.
pub const PRECOMPILED_ADDRESS_LIMIT: u64 = 0x3ff;

/// Code format of a deployed contract.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeFormat(pub u8);

impl CodeFormat {
    pub const EVM: CodeFormat = CodeFormat(0);
    /// One past the last defined format.
    pub const LAST: CodeFormat = CodeFormat(1);

    /// Whether the format is one this node can execute.
    pub fn validate(&self) -> bool {
        self.0 < Self::LAST.0
    }
}

impl std::fmt::Display for CodeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            CodeFormat::EVM => write!(f, "CodeFormatEVM"),
            _ => write!(f, "UndefinedCodeFormat"),
        }
    }
}

/// Whether `address` falls in the precompiled range `0x0..=0x3ff`.
pub fn is_precompiled_contract_address(address: &Address) -> bool {
    U256::from_big_endian(address.as_bytes()) <= U256::from(PRECOMPILED_ADDRESS_LIMIT)
}
