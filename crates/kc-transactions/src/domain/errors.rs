//! Transaction error types.
//!
//! One enum covers decoding, signature recovery, validation and execution.
//! The execution-time kinds map one to one onto receipt statuses.

use super::tx_type::TxType;
use shared_crypto::CryptoError;
use shared_types::CodecError;
use thiserror::Error;

/// Errors raised by the interpreter through the [`Vm`](crate::ports::Vm) port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VmError {
    #[error("max call depth exceeded")]
    Depth,

    #[error("contract address collision")]
    ContractAddressCollision,

    #[error("contract creation code storage out of gas")]
    CodeStoreOutOfGas,

    #[error("evm: max code size exceeded")]
    MaxCodeSizeExceed,

    #[error("out of gas")]
    OutOfGas,

    #[error("evm: write protection")]
    WriteProtection,

    #[error("evm: execution reverted")]
    ExecutionReverted,

    #[error("reached the opcode computation cost limit")]
    OpcodeComputationCostLimitReached,

    /// Anything the interpreter reports that has no dedicated status.
    #[error("vm: {0}")]
    Other(String),
}

/// Transaction error type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TxError {
    // =========================================================================
    // Encoding
    // =========================================================================
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("undefined tx type: {0:#x}")]
    UndefinedTxType(u16),

    #[error("transaction type not supported: {0}")]
    TxTypeNotSupported(TxType),

    #[error("tx fields should be filled with valid values: {0}")]
    InvalidValueMap(String),

    #[error("unknown anchoring tx type: {0}")]
    UnknownAnchoringTxType(u8),

    #[error("invalid transaction type for anchored data")]
    InvalidTxTypeForAnchoredData,

    #[error("should not be called by a legacy transaction")]
    LegacyTransaction,

    #[error("not a fee delegation type transaction")]
    NotFeeDelegationTransaction,

    #[error("invalid json: {0}")]
    Json(String),

    // =========================================================================
    // Signatures
    // =========================================================================
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("invalid transaction v, r, s values")]
    InvalidSig,

    #[error("invalid transaction v, r, s values of the sender")]
    InvalidSigSender,

    #[error("invalid transaction v, r, s values of the fee payer")]
    InvalidSigFeePayer,

    #[error("invalid chain id for signer")]
    InvalidChainId,

    // =========================================================================
    // Validation
    // =========================================================================
    #[error("account already exists")]
    AccountAlreadyExists,

    #[error("invalid smart contract address")]
    InvalidContractAddress,

    #[error("the address of a precompiled contract is not allowed")]
    PrecompiledContractAddress,

    #[error("human-readable address is not supported now")]
    HumanReadableNotSupported,

    #[error("smart contract code format is invalid")]
    InvalidCodeFormat,

    #[error("not a program account (e.g., an account having code and storage)")]
    NotProgramAccount,

    #[error("not for a program account (e.g., an account having code and storage)")]
    NotForProgramAccount,

    #[error("fee ratio is out of range [1, 99]: {0}")]
    FeeRatioOutOfRange(u8),

    #[error("a legacy transaction must be with a legacy account key")]
    LegacyTransactionMustBeWithLegacyKey,

    #[error("intrinsic gas too low")]
    IntrinsicGas,

    #[error("out of gas")]
    OutOfGas,

    // =========================================================================
    // Account keys
    // =========================================================================
    #[error("undefined account key type: {0}")]
    UndefinedAccountKeyType(u8),

    #[error("failed to serialize the account key")]
    UnserializableKey,

    #[error("AccountKeyNil cannot be initialized to an account")]
    AccountKeyNilUninitializable,

    #[error("AccountKeyFail is not updatable")]
    AccountKeyFailNotUpdatable,

    #[error("different account key type")]
    DifferentAccountKeyType,

    #[error("public key is not on curve")]
    NotOnCurve,

    #[error("key weight is zero")]
    ZeroKeyWeight,

    #[error("duplicated key")]
    DuplicatedKey,

    #[error("weighted sum overflow")]
    WeightedSumOverflow,

    #[error("unsatisfiable threshold")]
    UnsatisfiableThreshold,

    #[error("zero length")]
    ZeroLength,

    #[error("length too long")]
    LengthTooLong,

    #[error("nested composite type")]
    NestedCompositeType,

    #[error("the number of keys exceeds the limit ({0})")]
    MaxKeysExceed(usize),

    #[error("the number of signatures exceeds the limit ({0})")]
    MaxKeysExceedInValidation(usize),

    // =========================================================================
    // Execution
    // =========================================================================
    #[error(transparent)]
    Vm(#[from] VmError),
}

impl From<rlp::DecoderError> for TxError {
    fn from(err: rlp::DecoderError) -> Self {
        TxError::Codec(CodecError::from(err))
    }
}

/// Result alias used throughout the crate.
pub type TxResult<T> = Result<T, TxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_converts() {
        let err: TxError = CodecError::EndOfList.into();
        assert!(matches!(err, TxError::Codec(CodecError::EndOfList)));
        let err: TxError = rlp::DecoderError::RlpIsTooShort.into();
        assert!(matches!(err, TxError::Codec(CodecError::Rlp(_))));
    }

    #[test]
    fn test_vm_error_converts() {
        let err: TxError = VmError::ExecutionReverted.into();
        assert_eq!(err, TxError::Vm(VmError::ExecutionReverted));
        assert_eq!(err.to_string(), "evm: execution reverted");
    }
}
