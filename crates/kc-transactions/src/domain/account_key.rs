//! # Account Keys
//!
//! The key policy attached to an account decides which recovered public keys
//! may act for it and how much validation costs.
//!
//! ## Serialized form
//!
//! `Nil` is the empty string `0x80`. Every other key is `rlp(type) || rlp(body)`:
//!
//! | Type | Id | Body |
//! |------|----|------|
//! | Legacy | 1 | `[]` |
//! | Public | 2 | 33-byte compressed key |
//! | Fail | 3 | `[]` |
//! | WeightedMultiSig | 4 | `[threshold, [[weight, key33], ...]]` |
//! | RoleBased | 5 | `[serialized_key, ...]` (byte strings) |
//!
//! Transaction bodies carry this serialization as a single byte string.

use super::errors::{TxError, TxResult};
use crate::config::ForkRules;
use crate::params::{TX_ACCOUNT_CREATION_GAS_PER_KEY, TX_VALIDATION_GAS_PER_KEY};
use rlp::{Rlp, RlpStream};
use shared_crypto::Secp256k1PublicKey;
use shared_types::{to_hex, Address, ItemKind, RlpReader};
use std::collections::HashSet;
use tracing::debug;

/// Upper bound on keys in a weighted multi-sig key.
pub const MAX_NUM_KEYS_FOR_MULTI_SIG: usize = 10;

/// Account key type ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AccountKeyType {
    Nil = 0,
    Legacy = 1,
    Public = 2,
    Fail = 3,
    WeightedMultiSig = 4,
    RoleBased = 5,
}

impl AccountKeyType {
    pub fn is_legacy(self) -> bool {
        self == AccountKeyType::Legacy
    }
}

impl TryFrom<u8> for AccountKeyType {
    type Error = TxError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Nil,
            1 => Self::Legacy,
            2 => Self::Public,
            3 => Self::Fail,
            4 => Self::WeightedMultiSig,
            5 => Self::RoleBased,
            other => return Err(TxError::UndefinedAccountKeyType(other)),
        })
    }
}

/// Which signing role a key answers for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoleType {
    Transaction = 0,
    AccountUpdate = 1,
    FeePayer = 2,
}

/// Number of defined roles.
pub const ROLE_LAST: usize = 3;

/// A key with its voting weight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeightedPublicKey {
    pub weight: u64,
    pub key: Secp256k1PublicKey,
}

/// Account key policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountKey {
    /// No key; only valid as "keep the current key" inside a role update.
    Nil,
    /// The account address itself is the key.
    Legacy,
    /// A single public key.
    Public(Secp256k1PublicKey),
    /// Nothing can sign for this account.
    Fail,
    /// Weighted signatures must reach the threshold.
    WeightedMultiSig {
        threshold: u64,
        keys: Vec<WeightedPublicKey>,
    },
    /// One key per role; missing roles fall back to the transaction role.
    RoleBased(Vec<AccountKey>),
}

impl Default for AccountKey {
    fn default() -> Self {
        AccountKey::Legacy
    }
}

impl AccountKey {
    pub fn key_type(&self) -> AccountKeyType {
        match self {
            AccountKey::Nil => AccountKeyType::Nil,
            AccountKey::Legacy => AccountKeyType::Legacy,
            AccountKey::Public(_) => AccountKeyType::Public,
            AccountKey::Fail => AccountKeyType::Fail,
            AccountKey::WeightedMultiSig { .. } => AccountKeyType::WeightedMultiSig,
            AccountKey::RoleBased(_) => AccountKeyType::RoleBased,
        }
    }

    /// Only role-based keys nest other keys.
    pub fn is_composite(&self) -> bool {
        matches!(self, AccountKey::RoleBased(_))
    }

    fn key_for_role(keys: &[AccountKey], role: RoleType) -> Option<&AccountKey> {
        keys.get(role as usize).or_else(|| keys.first())
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Serialized `type || body` form.
    pub fn encode(&self) -> Vec<u8> {
        if let AccountKey::Nil = self {
            return vec![0x80];
        }
        let mut out = rlp::encode(&(self.key_type() as u8)).to_vec();
        out.extend_from_slice(&self.encode_body());
        out
    }

    fn encode_body(&self) -> Vec<u8> {
        match self {
            AccountKey::Nil | AccountKey::Legacy | AccountKey::Fail => {
                RlpStream::new_list(0).out().to_vec()
            }
            AccountKey::Public(key) => rlp::encode(&key.to_compressed().to_vec()).to_vec(),
            AccountKey::WeightedMultiSig { threshold, keys } => {
                let mut s = RlpStream::new_list(2);
                s.append(threshold);
                s.begin_list(keys.len());
                for weighted in keys {
                    s.begin_list(2);
                    s.append(&weighted.weight);
                    s.append(&weighted.key.to_compressed().to_vec());
                }
                s.out().to_vec()
            }
            AccountKey::RoleBased(keys) => {
                let mut s = RlpStream::new_list(keys.len());
                for key in keys {
                    s.append(&key.encode());
                }
                s.out().to_vec()
            }
        }
    }

    /// Parses the serialized form.
    pub fn decode(bytes: &[u8]) -> TxResult<Self> {
        if bytes == [0x80] {
            return Ok(AccountKey::Nil);
        }
        let mut reader = RlpReader::new(bytes);
        let raw_type: u8 = reader.decode_next()?;
        let key_type = AccountKeyType::try_from(raw_type)?;
        let body = reader.raw_next()?;
        reader.finish()?;
        Self::decode_body(key_type, body)
    }

    fn decode_body(key_type: AccountKeyType, body: &[u8]) -> TxResult<Self> {
        let rlp = Rlp::new(body);
        match key_type {
            AccountKeyType::Nil => Err(TxError::UndefinedAccountKeyType(0)),
            AccountKeyType::Legacy | AccountKeyType::Fail => {
                if !rlp.is_list() || rlp.item_count()? != 0 {
                    return Err(TxError::UnserializableKey);
                }
                Ok(if key_type == AccountKeyType::Legacy {
                    AccountKey::Legacy
                } else {
                    AccountKey::Fail
                })
            }
            AccountKeyType::Public => {
                let raw: Vec<u8> = rlp.as_val()?;
                Ok(AccountKey::Public(parse_public_key(&raw)?))
            }
            AccountKeyType::WeightedMultiSig => {
                if rlp.item_count()? != 2 {
                    return Err(TxError::UnserializableKey);
                }
                let threshold: u64 = rlp.val_at(0)?;
                let list = rlp.at(1)?;
                let mut keys = Vec::with_capacity(list.item_count()?);
                for item in list.iter() {
                    if item.item_count()? != 2 {
                        return Err(TxError::UnserializableKey);
                    }
                    let weight: u64 = item.val_at(0)?;
                    let raw: Vec<u8> = item.val_at(1)?;
                    keys.push(WeightedPublicKey {
                        weight,
                        key: parse_public_key(&raw)?,
                    });
                }
                Ok(AccountKey::WeightedMultiSig { threshold, keys })
            }
            AccountKeyType::RoleBased => {
                let mut reader = RlpReader::new(body);
                reader.list_header()?;
                let mut keys = Vec::new();
                while !reader.at_end() {
                    if let ItemKind::List(_) = reader.kind()? {
                        return Err(TxError::UnserializableKey);
                    }
                    let inner: Vec<u8> = reader.decode_next()?;
                    keys.push(AccountKey::decode(&inner)?);
                }
                reader.list_end()?;
                Ok(AccountKey::RoleBased(keys))
            }
        }
    }

    // =========================================================================
    // Gas
    // =========================================================================

    /// Gas charged for installing this key on an account.
    pub fn account_creation_gas(&self) -> TxResult<u64> {
        match self {
            AccountKey::Nil | AccountKey::Legacy | AccountKey::Fail => Ok(0),
            AccountKey::Public(_) => Ok(TX_ACCOUNT_CREATION_GAS_PER_KEY),
            AccountKey::WeightedMultiSig { keys, .. } => {
                if keys.len() > MAX_NUM_KEYS_FOR_MULTI_SIG {
                    return Err(TxError::MaxKeysExceed(keys.len()));
                }
                Ok(keys.len() as u64 * TX_ACCOUNT_CREATION_GAS_PER_KEY)
            }
            AccountKey::RoleBased(keys) => keys.iter().try_fold(0u64, |acc, key| {
                Ok(acc.saturating_add(key.account_creation_gas()?))
            }),
        }
    }

    /// Gas charged for validating `num_sigs` signatures against this key.
    pub fn sig_validation_gas(
        &self,
        rules: &ForkRules,
        role: RoleType,
        num_sigs: usize,
    ) -> TxResult<u64> {
        match self {
            AccountKey::WeightedMultiSig { keys, .. } => {
                let num_keys = keys.len();
                if num_keys > MAX_NUM_KEYS_FOR_MULTI_SIG {
                    return Err(TxError::MaxKeysExceedInValidation(num_keys));
                }
                if num_keys == 0 {
                    return Err(TxError::ZeroLength);
                }
                let extra = if rules.is_istanbul {
                    num_sigs.saturating_sub(1)
                } else {
                    num_keys - 1
                };
                Ok(extra as u64 * TX_VALIDATION_GAS_PER_KEY)
            }
            AccountKey::RoleBased(keys) => match Self::key_for_role(keys, role) {
                Some(key) => key.sig_validation_gas(rules, role, num_sigs),
                None => Err(TxError::ZeroLength),
            },
            _ => Ok(0),
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Whether `recovered` keys may act for `from` in `role`.
    pub fn validate(
        &self,
        rules: &ForkRules,
        role: RoleType,
        recovered: &[Secp256k1PublicKey],
        from: &Address,
    ) -> bool {
        match self {
            AccountKey::Nil | AccountKey::Fail => false,
            AccountKey::Legacy => recovered.len() == 1 && recovered[0].to_address() == *from,
            AccountKey::Public(key) => recovered.len() == 1 && recovered[0] == *key,
            AccountKey::WeightedMultiSig { threshold, keys } => {
                validate_weighted(rules, *threshold, keys, recovered)
            }
            AccountKey::RoleBased(keys) => match Self::key_for_role(keys, role) {
                Some(key) => key.validate(rules, role, recovered, from),
                None => false,
            },
        }
    }

    /// Whether this key may be installed on a fresh account.
    pub fn check_installable(&self) -> TxResult<()> {
        match self {
            AccountKey::Nil => Err(TxError::AccountKeyNilUninitializable),
            AccountKey::Legacy | AccountKey::Public(_) | AccountKey::Fail => Ok(()),
            AccountKey::WeightedMultiSig { threshold, keys } => {
                check_weighted_installable(*threshold, keys)
            }
            AccountKey::RoleBased(keys) => {
                if keys.is_empty() {
                    return Err(TxError::ZeroLength);
                }
                if keys.len() > ROLE_LAST {
                    return Err(TxError::LengthTooLong);
                }
                for key in keys {
                    if key.is_composite() {
                        return Err(TxError::NestedCompositeType);
                    }
                    key.check_installable()?;
                }
                Ok(())
            }
        }
    }

    /// Whether `new_key` may replace this key in place.
    pub fn check_updatable(&self, new_key: &AccountKey) -> TxResult<()> {
        match (self, new_key) {
            (AccountKey::Nil, _) => Err(TxError::AccountKeyNilUninitializable),
            (AccountKey::Fail, _) => Err(TxError::AccountKeyFailNotUpdatable),
            (AccountKey::Legacy, AccountKey::Legacy) => Ok(()),
            (AccountKey::Public(_), AccountKey::Public(_)) => Ok(()),
            (AccountKey::WeightedMultiSig { .. }, AccountKey::WeightedMultiSig { .. }) => {
                new_key.check_installable()
            }
            (AccountKey::RoleBased(old), AccountKey::RoleBased(new)) => {
                if new.is_empty() {
                    return Err(TxError::ZeroLength);
                }
                if new.len() > ROLE_LAST {
                    return Err(TxError::LengthTooLong);
                }
                for (i, key) in new.iter().enumerate() {
                    if key.is_composite() {
                        return Err(TxError::NestedCompositeType);
                    }
                    match old.get(i) {
                        None => key.check_installable()?,
                        Some(_) if key.key_type() == AccountKeyType::Nil => {}
                        Some(current) => check_replaceable(current, key)?,
                    }
                }
                Ok(())
            }
            _ => Err(TxError::DifferentAccountKeyType),
        }
    }

    /// Applies `new_key` after [`check_replaceable`] passed.
    ///
    /// Role-based keys merge role by role; `Nil` roles keep the current key.
    pub fn update(&mut self, new_key: &AccountKey) -> TxResult<()> {
        check_replaceable(self, new_key)?;
        match (self, new_key) {
            (AccountKey::RoleBased(old), AccountKey::RoleBased(new)) => {
                for (i, key) in new.iter().enumerate() {
                    if i >= old.len() {
                        old.push(key.clone());
                    } else if key.key_type() != AccountKeyType::Nil {
                        old[i] = key.clone();
                    }
                }
            }
            (current, new) => *current = new.clone(),
        }
        Ok(())
    }

    /// JSON projection `{"keyType": n, "key": {...}}`.
    pub fn to_json(&self) -> serde_json::Value {
        let key = match self {
            AccountKey::Nil | AccountKey::Legacy | AccountKey::Fail => serde_json::json!({}),
            AccountKey::Public(key) => public_key_json(key),
            AccountKey::WeightedMultiSig { threshold, keys } => serde_json::json!({
                "threshold": threshold,
                "keys": keys
                    .iter()
                    .map(|k| serde_json::json!({"weight": k.weight, "key": public_key_json(&k.key)}))
                    .collect::<Vec<_>>(),
            }),
            AccountKey::RoleBased(keys) => {
                serde_json::Value::Array(keys.iter().map(AccountKey::to_json).collect())
            }
        };
        serde_json::json!({ "keyType": self.key_type() as u8, "key": key })
    }
}

/// Checks an update against the currently installed key.
///
/// Same-type keys run the type's update rule; a different type is installed
/// from scratch.
pub fn check_replaceable(old: &AccountKey, new: &AccountKey) -> TxResult<()> {
    if old.key_type() == new.key_type() {
        old.check_updatable(new)
    } else {
        new.check_installable()
    }
}

fn parse_public_key(raw: &[u8]) -> TxResult<Secp256k1PublicKey> {
    if raw.len() != 33 {
        return Err(TxError::UnserializableKey);
    }
    Secp256k1PublicKey::from_sec1_bytes(raw).map_err(|_| TxError::NotOnCurve)
}

fn public_key_json(key: &Secp256k1PublicKey) -> serde_json::Value {
    let raw = key.to_uncompressed();
    serde_json::json!({ "x": to_hex(&raw[1..33]), "y": to_hex(&raw[33..]) })
}

fn validate_weighted(
    rules: &ForkRules,
    threshold: u64,
    keys: &[WeightedPublicKey],
    recovered: &[Secp256k1PublicKey],
) -> bool {
    if rules.is_istanbul && recovered.len() > keys.len() {
        debug!(
            num_sigs = recovered.len(),
            num_keys = keys.len(),
            "multisig validation failed: more signatures than keys"
        );
        return false;
    }

    let unique: HashSet<[u8; 33]> = recovered.iter().map(|k| k.to_compressed()).collect();
    let mut matched = 0usize;
    let mut weighted_sum = 0u64;
    for weighted in keys {
        if unique.contains(&weighted.key.to_compressed()) {
            weighted_sum = weighted_sum.saturating_add(weighted.weight);
            matched += 1;
        }
    }

    if rules.is_istanbul && matched < unique.len() {
        debug!(matched, unique = unique.len(), "multisig validation failed: unknown signer");
        return false;
    }
    if weighted_sum < threshold {
        debug!(weighted_sum, threshold, "multisig validation failed: threshold not reached");
        return false;
    }
    true
}

fn check_weighted_installable(threshold: u64, keys: &[WeightedPublicKey]) -> TxResult<()> {
    if keys.is_empty() {
        return Err(TxError::ZeroLength);
    }
    if keys.len() > MAX_NUM_KEYS_FOR_MULTI_SIG {
        return Err(TxError::MaxKeysExceed(keys.len()));
    }
    let mut seen = HashSet::new();
    let mut sum = 0u64;
    for weighted in keys {
        if weighted.weight == 0 {
            return Err(TxError::ZeroKeyWeight);
        }
        if !seen.insert(weighted.key.to_compressed()) {
            return Err(TxError::DuplicatedKey);
        }
        sum = sum
            .checked_add(weighted.weight)
            .ok_or(TxError::WeightedSumOverflow)?;
    }
    if sum < threshold {
        return Err(TxError::UnsatisfiableThreshold);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::Secp256k1KeyPair;

    fn pubkey() -> Secp256k1PublicKey {
        Secp256k1KeyPair::generate().public_key()
    }

    fn istanbul() -> ForkRules {
        ForkRules {
            is_istanbul: true,
            is_eth_tx_type: true,
        }
    }

    fn multisig(threshold: u64, weights: &[u64]) -> (AccountKey, Vec<Secp256k1PublicKey>) {
        let pubs: Vec<_> = weights.iter().map(|_| pubkey()).collect();
        let keys = weights
            .iter()
            .zip(pubs.iter())
            .map(|(w, k)| WeightedPublicKey { weight: *w, key: *k })
            .collect();
        (AccountKey::WeightedMultiSig { threshold, keys }, pubs)
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    #[test]
    fn test_simple_serializations() {
        assert_eq!(AccountKey::Nil.encode(), vec![0x80]);
        assert_eq!(AccountKey::Legacy.encode(), vec![0x01, 0xc0]);
        assert_eq!(AccountKey::Fail.encode(), vec![0x03, 0xc0]);
        assert_eq!(AccountKey::decode(&[0x01, 0xc0]).unwrap(), AccountKey::Legacy);
        assert_eq!(AccountKey::decode(&[0x80]).unwrap(), AccountKey::Nil);
    }

    #[test]
    fn test_public_key_serialization() {
        let key = pubkey();
        let encoded = AccountKey::Public(key).encode();
        assert_eq!(encoded[0], 0x02);
        assert_eq!(encoded[1], 0xa1);
        assert_eq!(encoded.len(), 2 + 33);
        assert_eq!(AccountKey::decode(&encoded).unwrap(), AccountKey::Public(key));
    }

    #[test]
    fn test_composite_serialization() {
        let (multi, _) = multisig(2, &[1, 1, 1]);
        let role = AccountKey::RoleBased(vec![AccountKey::Legacy, multi.clone(), AccountKey::Nil]);
        assert_eq!(AccountKey::decode(&multi.encode()).unwrap(), multi);
        assert_eq!(AccountKey::decode(&role.encode()).unwrap(), role);
    }

    #[test]
    fn test_undefined_type_rejected() {
        assert_eq!(
            AccountKey::decode(&[0x09, 0xc0]),
            Err(TxError::UndefinedAccountKeyType(9))
        );
    }

    // =========================================================================
    // Gas
    // =========================================================================

    #[test]
    fn test_creation_gas() {
        let (multi, _) = multisig(1, &[1, 1, 1]);
        assert_eq!(multi.account_creation_gas().unwrap(), 60_000);
        assert_eq!(AccountKey::Public(pubkey()).account_creation_gas().unwrap(), 20_000);
        let role = AccountKey::RoleBased(vec![AccountKey::Public(pubkey()), multi]);
        assert_eq!(role.account_creation_gas().unwrap(), 80_000);

        let (too_many, _) = multisig(1, &[1; 11]);
        assert_eq!(too_many.account_creation_gas(), Err(TxError::MaxKeysExceed(11)));
    }

    #[test]
    fn test_validation_gas_by_fork() {
        let (multi, _) = multisig(1, &[1, 1, 1, 1]);
        let pre = ForkRules::default();
        assert_eq!(multi.sig_validation_gas(&istanbul(), RoleType::Transaction, 2).unwrap(), 15_000);
        assert_eq!(multi.sig_validation_gas(&pre, RoleType::Transaction, 2).unwrap(), 45_000);
        assert_eq!(AccountKey::Legacy.sig_validation_gas(&pre, RoleType::Transaction, 1).unwrap(), 0);
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn test_legacy_and_public_validate() {
        let pair = Secp256k1KeyPair::generate();
        let rules = istanbul();
        assert!(AccountKey::Legacy.validate(&rules, RoleType::Transaction, &[pair.public_key()], &pair.address()));
        assert!(!AccountKey::Legacy.validate(&rules, RoleType::Transaction, &[pair.public_key()], &Address::zero()));
        let public = AccountKey::Public(pair.public_key());
        assert!(public.validate(&rules, RoleType::Transaction, &[pair.public_key()], &Address::zero()));
        assert!(!public.validate(&rules, RoleType::Transaction, &[pubkey()], &Address::zero()));
        assert!(!AccountKey::Fail.validate(&rules, RoleType::Transaction, &[pair.public_key()], &pair.address()));
    }

    #[test]
    fn test_multisig_threshold() {
        let (multi, pubs) = multisig(3, &[1, 2, 2]);
        let rules = istanbul();
        let from = Address::zero();
        assert!(!multi.validate(&rules, RoleType::Transaction, &pubs[..1], &from));
        assert!(multi.validate(&rules, RoleType::Transaction, &pubs[..2], &from));
        // an unknown signer fails after Istanbul
        let mut with_stranger = pubs[..2].to_vec();
        with_stranger.push(pubkey());
        assert!(!multi.validate(&rules, RoleType::Transaction, &with_stranger, &from));
        assert!(multi.validate(&ForkRules::default(), RoleType::Transaction, &with_stranger, &from));
    }

    #[test]
    fn test_role_based_falls_back_to_transaction_key() {
        let tx_key = Secp256k1KeyPair::generate();
        let fee_key = Secp256k1KeyPair::generate();
        let role = AccountKey::RoleBased(vec![
            AccountKey::Public(tx_key.public_key()),
            AccountKey::Public(fee_key.public_key()),
        ]);
        let rules = istanbul();
        let from = Address::zero();
        assert!(role.validate(&rules, RoleType::Transaction, &[tx_key.public_key()], &from));
        assert!(role.validate(&rules, RoleType::AccountUpdate, &[fee_key.public_key()], &from));
        // no fee payer role: default key applies
        assert!(role.validate(&rules, RoleType::FeePayer, &[tx_key.public_key()], &from));
    }

    // =========================================================================
    // Installation and update
    // =========================================================================

    #[test]
    fn test_multisig_installable_errors() {
        let (zero_weight, _) = multisig(1, &[1, 0]);
        assert_eq!(zero_weight.check_installable(), Err(TxError::ZeroKeyWeight));
        let (unsatisfiable, _) = multisig(5, &[1, 1]);
        assert_eq!(unsatisfiable.check_installable(), Err(TxError::UnsatisfiableThreshold));
        let key = pubkey();
        let dup = AccountKey::WeightedMultiSig {
            threshold: 1,
            keys: vec![
                WeightedPublicKey { weight: 1, key },
                WeightedPublicKey { weight: 1, key },
            ],
        };
        assert_eq!(dup.check_installable(), Err(TxError::DuplicatedKey));
        let overflow = AccountKey::WeightedMultiSig {
            threshold: 1,
            keys: vec![
                WeightedPublicKey { weight: u64::MAX, key: pubkey() },
                WeightedPublicKey { weight: 1, key: pubkey() },
            ],
        };
        assert_eq!(overflow.check_installable(), Err(TxError::WeightedSumOverflow));
        let empty = AccountKey::WeightedMultiSig { threshold: 1, keys: vec![] };
        assert_eq!(empty.check_installable(), Err(TxError::ZeroLength));
    }

    #[test]
    fn test_role_based_installable_errors() {
        assert_eq!(AccountKey::RoleBased(vec![]).check_installable(), Err(TxError::ZeroLength));
        assert_eq!(
            AccountKey::RoleBased(vec![AccountKey::Legacy; 4]).check_installable(),
            Err(TxError::LengthTooLong)
        );
        let nested = AccountKey::RoleBased(vec![AccountKey::RoleBased(vec![AccountKey::Legacy])]);
        assert_eq!(nested.check_installable(), Err(TxError::NestedCompositeType));
        assert_eq!(
            AccountKey::RoleBased(vec![AccountKey::Nil]).check_installable(),
            Err(TxError::AccountKeyNilUninitializable)
        );
    }

    #[test]
    fn test_replaceable() {
        assert!(check_replaceable(&AccountKey::Legacy, &AccountKey::Public(pubkey())).is_ok());
        assert_eq!(
            check_replaceable(&AccountKey::Fail, &AccountKey::Fail),
            Err(TxError::AccountKeyFailNotUpdatable)
        );
        assert_eq!(
            check_replaceable(&AccountKey::Legacy, &AccountKey::Nil),
            Err(TxError::AccountKeyNilUninitializable)
        );
    }

    #[test]
    fn test_role_based_update_keeps_nil_roles() {
        let first = AccountKey::Public(pubkey());
        let second = AccountKey::Public(pubkey());
        let mut key = AccountKey::RoleBased(vec![first.clone(), AccountKey::Legacy]);
        let update = AccountKey::RoleBased(vec![AccountKey::Nil, second.clone(), AccountKey::Legacy]);
        key.update(&update).unwrap();
        assert_eq!(
            key,
            AccountKey::RoleBased(vec![first, second, AccountKey::Legacy])
        );
    }
}
