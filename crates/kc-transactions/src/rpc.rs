//! # JSON Codec
//!
//! `to_json` is the RPC projection of a transaction plus its identifying
//! hashes. `from_json` reads the same document back: the fields go through
//! the value-map builder, then the signatures are attached and range checked
//! exactly as on the wire path.
//!
//! | JSON field | Value key |
//! |------------|-----------|
//! | `nonce`, `gas` | `Nonce`, `GasLimit` |
//! | `gasPrice`, `maxPriorityFeePerGas`, `maxFeePerGas` | `GasPrice`, `GasTipCap`, `GasFeeCap` |
//! | `to`, `value`, `input` | `To`, `Amount`, `Data` / `AnchoredData` |
//! | `from`, `feePayer`, `feeRatio` | `From`, `FeePayer`, `FeeRatioOfFeePayer` |
//! | `humanReadable`, `key`, `codeFormat` | `HumanReadable`, `AccountKey`, `CodeFormat` |
//! | `chainId`, `accessList` | `ChainId`, `AccessList` |

use crate::domain::{AccessList, AccountKey, FeeRatio, TxError, TxResult, TxSignature, TxSignatures, TxType};
use crate::params::CodeFormat;
use crate::transaction::Transaction;
use crate::value_map::{TxValue, TxValueKey, TxValueMap};
use serde_json::{Map, Value};
use shared_types::{parse_hex_bytes, parse_hex_u256, parse_hex_u64, Address, U256};

fn json_err(field: &str, detail: impl std::fmt::Display) -> TxError {
    TxError::Json(format!("{field}: {detail}"))
}

fn str_field<'a>(map: &'a Map<String, Value>, field: &str) -> TxResult<Option<&'a str>> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(json_err(field, format!("expected a string, got {other}"))),
    }
}

fn u256_field(map: &Map<String, Value>, field: &str) -> TxResult<Option<U256>> {
    str_field(map, field)?
        .map(|s| parse_hex_u256(s).map_err(|e| json_err(field, e)))
        .transpose()
}

fn u64_field(map: &Map<String, Value>, field: &str) -> TxResult<Option<u64>> {
    str_field(map, field)?
        .map(|s| parse_hex_u64(s).map_err(|e| json_err(field, e)))
        .transpose()
}

fn bytes_field(map: &Map<String, Value>, field: &str) -> TxResult<Option<Vec<u8>>> {
    str_field(map, field)?
        .map(|s| parse_hex_bytes(s).map_err(|e| json_err(field, e)))
        .transpose()
}

fn address_field(map: &Map<String, Value>, field: &str) -> TxResult<Option<Address>> {
    map.get(field)
        .filter(|v| !v.is_null())
        .map(|v| serde_json::from_value(v.clone()).map_err(|e| json_err(field, e)))
        .transpose()
}

fn signatures_field(map: &Map<String, Value>, field: &str) -> TxResult<Option<TxSignatures>> {
    let Some(value) = map.get(field).filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let entries = value
        .as_array()
        .ok_or_else(|| json_err(field, "expected an array"))?;
    entries
        .iter()
        .map(|entry| {
            let sig = entry
                .as_object()
                .ok_or_else(|| json_err(field, "expected a {V, R, S} object"))?;
            let part = |name: &str| {
                u256_field(sig, name)?.ok_or_else(|| json_err(field, format!("missing {name}")))
            };
            Ok(TxSignature::new(part("V")?, part("R")?, part("S")?))
        })
        .collect::<TxResult<Vec<_>>>()
        .map(|sigs| Some(TxSignatures::new(sigs)))
}

fn value_map(map: &Map<String, Value>) -> TxResult<TxValueMap> {
    let mut values = TxValueMap::new();
    let mut put = |key: TxValueKey, value: Option<TxValue>| {
        if let Some(value) = value {
            values.insert(key, value);
        }
    };

    put(TxValueKey::Nonce, u64_field(map, "nonce")?.map(TxValue::U64));
    put(TxValueKey::GasLimit, u64_field(map, "gas")?.map(TxValue::U64));
    put(TxValueKey::GasPrice, u256_field(map, "gasPrice")?.map(TxValue::U256));
    put(
        TxValueKey::GasTipCap,
        u256_field(map, "maxPriorityFeePerGas")?.map(TxValue::U256),
    );
    put(TxValueKey::GasFeeCap, u256_field(map, "maxFeePerGas")?.map(TxValue::U256));
    put(TxValueKey::ChainId, u256_field(map, "chainId")?.map(TxValue::U256));
    put(TxValueKey::Amount, u256_field(map, "value")?.map(TxValue::U256));
    if map.contains_key("to") {
        put(
            TxValueKey::To,
            Some(TxValue::OptionalAddress(address_field(map, "to")?)),
        );
    }
    if let Some(input) = bytes_field(map, "input")? {
        put(TxValueKey::AnchoredData, Some(TxValue::Bytes(input.clone())));
        put(TxValueKey::Data, Some(TxValue::Bytes(input)));
    }
    put(TxValueKey::From, address_field(map, "from")?.map(TxValue::Address));
    put(TxValueKey::FeePayer, address_field(map, "feePayer")?.map(TxValue::Address));
    if let Some(ratio) = u64_field(map, "feeRatio")? {
        let ratio = u8::try_from(ratio)
            .map_err(|_| TxError::FeeRatioOutOfRange(u8::MAX))
            .and_then(FeeRatio::new)?;
        put(TxValueKey::FeeRatioOfFeePayer, Some(TxValue::FeeRatio(ratio)));
    }
    if let Some(flag) = map.get("humanReadable") {
        let flag = flag
            .as_bool()
            .ok_or_else(|| json_err("humanReadable", "expected a bool"))?;
        put(TxValueKey::HumanReadable, Some(TxValue::Bool(flag)));
    }
    if let Some(key) = bytes_field(map, "key")? {
        put(TxValueKey::AccountKey, Some(TxValue::AccountKey(AccountKey::decode(&key)?)));
    }
    if let Some(format) = u64_field(map, "codeFormat")? {
        let format = u8::try_from(format).map_err(|e| json_err("codeFormat", e))?;
        put(TxValueKey::CodeFormat, Some(TxValue::CodeFormat(CodeFormat(format))));
    }
    if let Some(list) = map.get("accessList").filter(|v| !v.is_null()) {
        let list: AccessList =
            serde_json::from_value(list.clone()).map_err(|e| json_err("accessList", e))?;
        put(TxValueKey::AccessList, Some(TxValue::AccessList(list)));
    }
    Ok(values)
}

impl Transaction {
    /// RPC projection with `hash`, the declared `from` of native types and,
    /// when delegated, `senderTxHash`.
    pub fn to_json(&self) -> Value {
        let mut map = self.rpc_output();
        if let Ok(from) = self.from() {
            map.insert("from".into(), serde_json::json!(from));
        }
        map.insert("hash".into(), serde_json::json!(self.hash()));
        if let Some(sender_tx_hash) = self.sender_tx_hash() {
            map.insert("senderTxHash".into(), serde_json::json!(sender_tx_hash));
        }
        Value::Object(map)
    }

    /// Parses a document produced by [`Transaction::to_json`].
    pub fn from_json(value: &Value) -> TxResult<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| TxError::Json("expected a JSON object".into()))?;
        let type_int = map
            .get("typeInt")
            .and_then(Value::as_u64)
            .ok_or_else(|| json_err("typeInt", "missing"))?;
        let tx_type = TxType(
            u16::try_from(type_int).map_err(|_| TxError::UndefinedTxType(u16::MAX))?,
        );

        let mut tx = Transaction::from_value_map(tx_type, &value_map(map)?)?;
        if let Some(signatures) = signatures_field(map, "signatures")? {
            tx.set_signatures(signatures);
        }
        if let Some(signatures) = signatures_field(map, "feePayerSignatures")? {
            tx.set_fee_payer_signatures(signatures)?;
        }
        tx.data().check_signature_values()?;
        Ok(tx)
    }

    pub fn from_json_str(input: &str) -> TxResult<Self> {
        let value: Value = serde_json::from_str(input).map_err(|e| TxError::Json(e.to_string()))?;
        Self::from_json(&value)
    }
}
