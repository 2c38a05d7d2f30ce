//! # Transaction Type Tags
//!
//! Native types are spaced eight apart. The low two bits select the
//! fee-delegated mirror (`+1`) and the fee-delegated-with-ratio mirror
//! (`+2`). Ethereum typed transactions live under the `0x78` envelope byte.
//!
//! | Base | Tag | Delegated | With ratio |
//! |------|-----|-----------|------------|
//! | Legacy | 0x00 | - | - |
//! | ValueTransfer | 0x08 | 0x09 | 0x0a |
//! | ValueTransferMemo | 0x10 | 0x11 | 0x12 |
//! | AccountCreation | 0x18 | - | - |
//! | AccountUpdate | 0x20 | 0x21 | 0x22 |
//! | SmartContractDeploy | 0x28 | 0x29 | 0x2a |
//! | SmartContractExecution | 0x30 | 0x31 | 0x32 |
//! | Cancel | 0x38 | 0x39 | 0x3a |
//! | ChainDataAnchoring | 0x48 | 0x49 | 0x4a |
//! | EthereumAccessList | 0x7801 | - | - |
//! | EthereumDynamicFee | 0x7802 | - | - |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of low bits reserved for the delegation mirrors.
pub const SUB_TX_TYPE_BITS: u16 = 3;

/// Envelope byte of EIP-2718 style typed transactions.
pub const ETHEREUM_TX_TYPE_ENVELOPE: u8 = 0x78;

const FEE_DELEGATION_BIT_MASK: u16 = 1;
const FEE_DELEGATION_WITH_RATIO_BIT_MASK: u16 = 2;

/// A transaction type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxType(pub u16);

#[allow(missing_docs)]
impl TxType {
    pub const LEGACY: TxType = TxType(0x00);

    pub const VALUE_TRANSFER: TxType = TxType(0x08);
    pub const FEE_DELEGATED_VALUE_TRANSFER: TxType = TxType(0x09);
    pub const FEE_DELEGATED_VALUE_TRANSFER_WITH_RATIO: TxType = TxType(0x0a);

    pub const VALUE_TRANSFER_MEMO: TxType = TxType(0x10);
    pub const FEE_DELEGATED_VALUE_TRANSFER_MEMO: TxType = TxType(0x11);
    pub const FEE_DELEGATED_VALUE_TRANSFER_MEMO_WITH_RATIO: TxType = TxType(0x12);

    pub const ACCOUNT_CREATION: TxType = TxType(0x18);

    pub const ACCOUNT_UPDATE: TxType = TxType(0x20);
    pub const FEE_DELEGATED_ACCOUNT_UPDATE: TxType = TxType(0x21);
    pub const FEE_DELEGATED_ACCOUNT_UPDATE_WITH_RATIO: TxType = TxType(0x22);

    pub const SMART_CONTRACT_DEPLOY: TxType = TxType(0x28);
    pub const FEE_DELEGATED_SMART_CONTRACT_DEPLOY: TxType = TxType(0x29);
    pub const FEE_DELEGATED_SMART_CONTRACT_DEPLOY_WITH_RATIO: TxType = TxType(0x2a);

    pub const SMART_CONTRACT_EXECUTION: TxType = TxType(0x30);
    pub const FEE_DELEGATED_SMART_CONTRACT_EXECUTION: TxType = TxType(0x31);
    pub const FEE_DELEGATED_SMART_CONTRACT_EXECUTION_WITH_RATIO: TxType = TxType(0x32);

    pub const CANCEL: TxType = TxType(0x38);
    pub const FEE_DELEGATED_CANCEL: TxType = TxType(0x39);
    pub const FEE_DELEGATED_CANCEL_WITH_RATIO: TxType = TxType(0x3a);

    /// Reserved.
    pub const BATCH: TxType = TxType(0x40);

    pub const CHAIN_DATA_ANCHORING: TxType = TxType(0x48);
    pub const FEE_DELEGATED_CHAIN_DATA_ANCHORING: TxType = TxType(0x49);
    pub const FEE_DELEGATED_CHAIN_DATA_ANCHORING_WITH_RATIO: TxType = TxType(0x4a);

    pub const KLAYTN_LAST: TxType = TxType(0x50);

    pub const ETHEREUM_ACCESS_LIST: TxType = TxType(0x7801);
    pub const ETHEREUM_DYNAMIC_FEE: TxType = TxType(0x7802);
    pub const ETHEREUM_LAST: TxType = TxType(0x7803);

    /// The tag with the delegation bits cleared.
    pub fn base(self) -> TxType {
        if self.is_eth_typed() {
            return self;
        }
        TxType(self.0 & !((1 << SUB_TX_TYPE_BITS) - 1))
    }

    /// The low byte, used as the wire tag of native types and as the
    /// subtype of Ethereum typed transactions.
    pub fn tag_byte(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub fn is_legacy(self) -> bool {
        self == Self::LEGACY
    }

    pub fn is_eth_typed(self) -> bool {
        (self.0 & 0xff00) == (u16::from(ETHEREUM_TX_TYPE_ENVELOPE) << 8)
    }

    pub fn is_ethereum(self) -> bool {
        self.is_legacy() || self.is_eth_typed()
    }

    pub fn is_fee_delegated(self) -> bool {
        (self.0 & (FEE_DELEGATION_BIT_MASK | FEE_DELEGATION_WITH_RATIO_BIT_MASK)) != 0
            && !self.is_ethereum()
    }

    pub fn is_fee_delegated_with_ratio(self) -> bool {
        (self.0 & FEE_DELEGATION_WITH_RATIO_BIT_MASK) != 0 && !self.is_ethereum()
    }

    pub fn is_account_creation(self) -> bool {
        self == Self::ACCOUNT_CREATION
    }

    pub fn is_account_update(self) -> bool {
        self.base() == Self::ACCOUNT_UPDATE
    }

    pub fn is_contract_deploy(self) -> bool {
        self.base() == Self::SMART_CONTRACT_DEPLOY
    }

    pub fn is_cancel(self) -> bool {
        self.base() == Self::CANCEL
    }

    pub fn is_chain_data_anchoring(self) -> bool {
        self.base() == Self::CHAIN_DATA_ANCHORING
    }

    /// Whether a payload of this type can be decoded off the wire.
    ///
    /// Account creation is reserved and the batch slot was never assigned.
    pub fn is_decodable(self) -> bool {
        !matches!(self.name(), "UndefinedTxType" | "TxTypeAccountCreation" | "TxTypeBatch")
    }

    /// The canonical name, e.g. `TxTypeFeeDelegatedValueTransferWithRatio`.
    pub fn name(self) -> &'static str {
        match self {
            Self::LEGACY => "TxTypeLegacyTransaction",
            Self::VALUE_TRANSFER => "TxTypeValueTransfer",
            Self::FEE_DELEGATED_VALUE_TRANSFER => "TxTypeFeeDelegatedValueTransfer",
            Self::FEE_DELEGATED_VALUE_TRANSFER_WITH_RATIO => {
                "TxTypeFeeDelegatedValueTransferWithRatio"
            }
            Self::VALUE_TRANSFER_MEMO => "TxTypeValueTransferMemo",
            Self::FEE_DELEGATED_VALUE_TRANSFER_MEMO => "TxTypeFeeDelegatedValueTransferMemo",
            Self::FEE_DELEGATED_VALUE_TRANSFER_MEMO_WITH_RATIO => {
                "TxTypeFeeDelegatedValueTransferMemoWithRatio"
            }
            Self::ACCOUNT_CREATION => "TxTypeAccountCreation",
            Self::ACCOUNT_UPDATE => "TxTypeAccountUpdate",
            Self::FEE_DELEGATED_ACCOUNT_UPDATE => "TxTypeFeeDelegatedAccountUpdate",
            Self::FEE_DELEGATED_ACCOUNT_UPDATE_WITH_RATIO => {
                "TxTypeFeeDelegatedAccountUpdateWithRatio"
            }
            Self::SMART_CONTRACT_DEPLOY => "TxTypeSmartContractDeploy",
            Self::FEE_DELEGATED_SMART_CONTRACT_DEPLOY => "TxTypeFeeDelegatedSmartContractDeploy",
            Self::FEE_DELEGATED_SMART_CONTRACT_DEPLOY_WITH_RATIO => {
                "TxTypeFeeDelegatedSmartContractDeployWithRatio"
            }
            Self::SMART_CONTRACT_EXECUTION => "TxTypeSmartContractExecution",
            Self::FEE_DELEGATED_SMART_CONTRACT_EXECUTION => {
                "TxTypeFeeDelegatedSmartContractExecution"
            }
            Self::FEE_DELEGATED_SMART_CONTRACT_EXECUTION_WITH_RATIO => {
                "TxTypeFeeDelegatedSmartContractExecutionWithRatio"
            }
            Self::CANCEL => "TxTypeCancel",
            Self::FEE_DELEGATED_CANCEL => "TxTypeFeeDelegatedCancel",
            Self::FEE_DELEGATED_CANCEL_WITH_RATIO => "TxTypeFeeDelegatedCancelWithRatio",
            Self::BATCH => "TxTypeBatch",
            Self::CHAIN_DATA_ANCHORING => "TxTypeChainDataAnchoring",
            Self::FEE_DELEGATED_CHAIN_DATA_ANCHORING => "TxTypeFeeDelegatedChainDataAnchoring",
            Self::FEE_DELEGATED_CHAIN_DATA_ANCHORING_WITH_RATIO => {
                "TxTypeFeeDelegatedChainDataAnchoringWithRatio"
            }
            Self::ETHEREUM_ACCESS_LIST => "TxTypeEthereumAccessList",
            Self::ETHEREUM_DYNAMIC_FEE => "TxTypeEthereumDynamicFee",
            _ => "UndefinedTxType",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
