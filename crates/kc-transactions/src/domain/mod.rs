//! Domain layer: transaction variants, keys, signatures and their rules.

pub mod access_list;
pub mod account_key;
pub mod anchoring;
pub mod errors;
pub mod eth_typed;
pub mod fee;
pub mod gas;
pub mod legacy;
pub mod native;
pub mod signature;
pub mod tx_data;
pub mod tx_type;

pub use access_list::{AccessList, AccessTuple};
pub use account_key::{
    check_replaceable, AccountKey, AccountKeyType, RoleType, WeightedPublicKey,
    MAX_NUM_KEYS_FOR_MULTI_SIG,
};
pub use anchoring::{
    decode_anchoring_data, AnchoringData, AnchoringDataInternal, AnchoringDataInternalType0,
    AnchoringDataLegacy,
};
pub use errors::{TxError, TxResult, VmError};
pub use eth_typed::{AccessListTx, DynamicFeeTx};
pub use fee::{calc_fee_with_ratio, FeeRatio, MAX_FEE_RATIO};
pub use legacy::LegacyTx;
pub use native::{FeeDelegation, NativeBody, NativeTx};
pub use signature::{derive_chain_id, TxSignature, TxSignatures};
pub use tx_data::{TxData, TxInternalData};
pub use tx_type::{TxType, ETHEREUM_TX_TYPE_ENVELOPE};
