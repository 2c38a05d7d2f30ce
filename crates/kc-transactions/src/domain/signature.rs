//! # Transaction Signatures
//!
//! `(V, R, S)` triples as carried on the wire. A sender may attach several
//! (multi-sig accounts); a legacy transaction always carries exactly one.
//!
//! ## V conventions
//!
//! | Family | Stored V | Recovery id |
//! |--------|----------|-------------|
//! | EIP-155 (legacy and native) | `recid + 35 + 2·chainId` | `V - 2·chainId - 8 - 27` |
//! | Typed (access list, dynamic fee) | `recid` | `V + 27 - 27` |
//! | Pre-EIP-155 | `recid + 27` | `V - 27` |

use super::errors::{TxError, TxResult};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use shared_crypto::{recover_pubkey, validate_signature_values, Secp256k1PublicKey, Secp256k1Signature};
use shared_types::{Hash, U256};

/// Derives the chain id a `V` value was produced for.
///
/// 27 and 28 are unprotected (chain id 0). Values below 35 that are not
/// 27/28 saturate to 0 instead of wrapping, so [`validate_signature`]
/// rejects them: a `V` such as 3 never decodes.
pub fn derive_chain_id(v: &U256) -> U256 {
    if v.bits() <= 64 {
        let v = v.low_u64();
        if v == 27 || v == 28 {
            return U256::zero();
        }
        return U256::from(v.saturating_sub(35) / 2);
    }
    (*v - U256::from(35u64)) / U256::from(2u64)
}

/// Range check applied to every signature when a transaction is decoded.
///
/// Strips the EIP-155 offset derived from `v` itself and checks the result
/// with the homestead rule off.
pub fn validate_signature(v: &U256, r: &U256, s: &U256) -> bool {
    if v.bits() > 64 {
        return false;
    }
    let chain_id = derive_chain_id(v);
    let offset = chain_id
        .checked_mul(U256::from(2u64))
        .and_then(|c| c.checked_add(U256::from(35u64)));
    let recovery = match offset.and_then(|o| v.checked_sub(o)) {
        Some(value) if value.bits() <= 8 => value.low_u64() as u8,
        _ => return false,
    };
    validate_signature_values(recovery, r, s, false)
}

/// Recovers a public key from a hash and a `V` already shifted to the
/// `27/28` convention.
pub fn recover_plain(
    sighash: &Hash,
    r: &U256,
    s: &U256,
    vb: &U256,
    homestead: bool,
) -> TxResult<Secp256k1PublicKey> {
    if vb.bits() > 8 {
        return Err(TxError::InvalidSig);
    }
    let v = (vb.low_u64() as u8)
        .checked_sub(27)
        .ok_or(TxError::InvalidSig)?;
    if !validate_signature_values(v, r, s, homestead) {
        return Err(TxError::InvalidSig);
    }
    let signature = Secp256k1Signature::from_values(r, s, v);
    Ok(recover_pubkey(sighash, &signature)?)
}

/// One `(V, R, S)` triple.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSignature {
    #[serde(rename = "V")]
    pub v: U256,
    #[serde(rename = "R")]
    pub r: U256,
    #[serde(rename = "S")]
    pub s: U256,
}

impl TxSignature {
    pub fn new(v: U256, r: U256, s: U256) -> Self {
        Self { v, r, s }
    }

    /// Chain id encoded in `V`.
    pub fn chain_id(&self) -> U256 {
        derive_chain_id(&self.v)
    }

    /// Decode-time range check.
    pub fn validate(&self) -> bool {
        validate_signature(&self.v, &self.r, &self.s)
    }

    /// Range check for typed transactions, whose `V` is the bare recovery id.
    pub fn validate_typed(&self) -> bool {
        self.v.bits() <= 8 && validate_signature_values(self.v.low_u64() as u8, &self.r, &self.s, false)
    }

    /// Recovers the signer key; `vfunc` maps the stored `V` to `27/28`.
    pub fn recover_pubkey<F>(
        &self,
        sighash: &Hash,
        homestead: bool,
        vfunc: F,
    ) -> TxResult<Secp256k1PublicKey>
    where
        F: Fn(&U256) -> TxResult<U256>,
    {
        let v = vfunc(&self.v)?;
        recover_plain(sighash, &self.r, &self.s, &v, homestead)
    }
}

impl Encodable for TxSignature {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.v);
        s.append(&self.r);
        s.append(&self.s);
    }
}

impl Decodable for TxSignature {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            v: rlp.val_at(0)?,
            r: rlp.val_at(1)?,
            s: rlp.val_at(2)?,
        })
    }
}

/// Ordered signature list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxSignatures(pub Vec<TxSignature>);

impl TxSignatures {
    pub fn new(signatures: Vec<TxSignature>) -> Self {
        Self(signatures)
    }

    pub fn single(signature: TxSignature) -> Self {
        Self(vec![signature])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TxSignature> {
        self.0.iter()
    }

    /// Chain id of the first signature, zero when unsigned.
    pub fn chain_id(&self) -> U256 {
        self.0.first().map(TxSignature::chain_id).unwrap_or_default()
    }

    /// Every signature passes the range check and all agree on the chain id.
    pub fn validate(&self) -> bool {
        let Some(first) = self.0.first() else {
            return false;
        };
        let chain_id = first.chain_id();
        self.0
            .iter()
            .all(|sig| sig.chain_id() == chain_id && sig.validate())
    }

    /// Recovers one key per signature, in order.
    pub fn recover_pubkeys<F>(
        &self,
        sighash: &Hash,
        homestead: bool,
        vfunc: F,
    ) -> TxResult<Vec<Secp256k1PublicKey>>
    where
        F: Fn(&U256) -> TxResult<U256>,
    {
        if self.0.is_empty() {
            return Err(TxError::InvalidSig);
        }
        self.0
            .iter()
            .map(|sig| sig.recover_pubkey(sighash, homestead, &vfunc))
            .collect()
    }

    /// JSON form used by RPC projections.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.0
                .iter()
                .map(|sig| {
                    serde_json::json!({
                        "V": format!("{:#x}", sig.v),
                        "R": format!("{:#x}", sig.r),
                        "S": format!("{:#x}", sig.s),
                    })
                })
                .collect(),
        )
    }
}

impl Encodable for TxSignatures {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(self.0.len());
        for sig in &self.0 {
            s.append(sig);
        }
    }
}

impl Decodable for TxSignatures {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        if !rlp.is_list() {
            return Err(DecoderError::RlpExpectedToBeList);
        }
        Ok(Self(rlp.as_list()?))
    }
}

impl From<Vec<TxSignature>> for TxSignatures {
    fn from(signatures: Vec<TxSignature>) -> Self {
        Self(signatures)
    }
}
