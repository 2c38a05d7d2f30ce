//! Intrinsic gas arithmetic shared by every transaction variant.
//!
//! All additions are overflow-checked; an overflow surfaces as
//! [`TxError::OutOfGas`].

use super::access_list::AccessList;
use super::errors::{TxError, TxResult};
use crate::config::ForkRules;
use crate::params::{
    TX_ACCESS_LIST_ADDRESS_GAS, TX_ACCESS_LIST_STORAGE_KEY_GAS, TX_DATA_GAS, TX_DATA_NON_ZERO_GAS,
    TX_DATA_ZERO_GAS, TX_GAS, TX_GAS_CONTRACT_CREATION,
};

/// `gas + len(data) * TxDataGas`.
pub fn intrinsic_gas_payload(gas: u64, data: &[u8]) -> TxResult<u64> {
    let length = data.len() as u64;
    length
        .checked_mul(TX_DATA_GAS)
        .and_then(|cost| gas.checked_add(cost))
        .ok_or(TxError::OutOfGas)
}

/// Pre-Istanbul payload pricing: zero and non-zero bytes differ.
pub fn intrinsic_gas_payload_legacy(gas: u64, data: &[u8]) -> TxResult<u64> {
    if data.is_empty() {
        return Ok(gas);
    }
    let non_zero = data.iter().filter(|b| **b != 0).count() as u64;
    let zero = data.len() as u64 - non_zero;
    let gas = non_zero
        .checked_mul(TX_DATA_NON_ZERO_GAS)
        .and_then(|cost| gas.checked_add(cost))
        .ok_or(TxError::OutOfGas)?;
    zero.checked_mul(TX_DATA_ZERO_GAS)
        .and_then(|cost| gas.checked_add(cost))
        .ok_or(TxError::OutOfGas)
}

/// Intrinsic gas of Ethereum-family transactions.
pub fn ethereum_intrinsic_gas(
    data: &[u8],
    access_list: Option<&AccessList>,
    contract_creation: bool,
    rules: &ForkRules,
) -> TxResult<u64> {
    let base = if contract_creation {
        TX_GAS_CONTRACT_CREATION
    } else {
        TX_GAS
    };
    let mut gas = if rules.is_istanbul {
        intrinsic_gas_payload(base, data)?
    } else {
        intrinsic_gas_payload_legacy(base, data)?
    };
    if let Some(list) = access_list {
        let addresses = (list.len() as u64).saturating_mul(TX_ACCESS_LIST_ADDRESS_GAS);
        let keys = (list.storage_keys() as u64).saturating_mul(TX_ACCESS_LIST_STORAGE_KEY_GAS);
        gas = gas
            .checked_add(addresses)
            .and_then(|g| g.checked_add(keys))
            .ok_or(TxError::OutOfGas)?;
    }
    Ok(gas)
}
