//! Fee ratio of fee-delegated transactions.
//!
//! A ratio is the percentage of the fee borne by the fee payer. Variants
//! without a ratio field behave as [`MAX_FEE_RATIO`].

use super::errors::{TxError, TxResult};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use shared_types::U256;

/// Fee payer pays everything.
pub const MAX_FEE_RATIO: u8 = 100;

/// A fee ratio. [`FeeRatio::new`] only builds ratios in `1..=99`; the wire
/// decoder keeps whatever byte it reads and [`FeeRatio::check`] rejects it
/// at validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FeeRatio(u8);

impl FeeRatio {
    pub fn new(ratio: u8) -> TxResult<Self> {
        if Self::is_valid(ratio) {
            Ok(Self(ratio))
        } else {
            Err(TxError::FeeRatioOutOfRange(ratio))
        }
    }

    pub fn is_valid(ratio: u8) -> bool {
        (1..=99).contains(&ratio)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn check(self) -> TxResult<()> {
        if Self::is_valid(self.0) {
            Ok(())
        } else {
            Err(TxError::FeeRatioOutOfRange(self.0))
        }
    }
}

impl TryFrom<u8> for FeeRatio {
    type Error = TxError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        FeeRatio::new(value)
    }
}

impl From<FeeRatio> for u8 {
    fn from(ratio: FeeRatio) -> Self {
        ratio.0
    }
}

impl Encodable for FeeRatio {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.append(&self.0);
    }
}

impl Decodable for FeeRatio {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        Ok(Self(rlp.as_val()?))
    }
}

/// Splits `fee` into `(fee_payer_share, sender_share)`.
///
/// Ratios above [`MAX_FEE_RATIO`] are clamped.
pub fn calc_fee_with_ratio(ratio: u8, fee: U256) -> (U256, U256) {
    let ratio = ratio.min(MAX_FEE_RATIO);
    let payer = fee * U256::from(ratio) / U256::from(MAX_FEE_RATIO);
    (payer, fee - payer)
}
