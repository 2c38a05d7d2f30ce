//! # Error Types
//!
//! Codec failures surfaced by the RLP bindings and hex helpers.

use rlp::DecoderError;
use thiserror::Error;

/// Errors raised while encoding or decoding canonical byte forms.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CodecError {
    /// Underlying RLP decoder rejected the input.
    #[error("rlp: {0:?}")]
    Rlp(DecoderError),

    /// A list was expected at the current position.
    #[error("rlp: expected list")]
    ExpectedList,

    /// A string was expected at the current position.
    #[error("rlp: expected string")]
    ExpectedString,

    /// No more items in the current list.
    #[error("rlp: end of list")]
    EndOfList,

    /// Declared length runs past the end of the input.
    #[error("rlp: value size exceeds available input")]
    UnexpectedEnd,

    /// `list_end` was called while items remained.
    #[error("rlp: call of list_end not positioned at end of list ({remaining} bytes left)")]
    ListNotConsumed { remaining: usize },

    /// `list_end` was called with no open list.
    #[error("rlp: call of list_end outside of any list")]
    NoOpenList,

    /// Bytes left over after a complete value.
    #[error("rlp: input contains {trailing} bytes after value")]
    TrailingBytes { trailing: usize },

    /// Item larger than the configured input limit.
    #[error("rlp: value size {size} exceeds limit {limit}")]
    ValueTooLarge { size: usize, limit: usize },

    /// Fixed-width value with the wrong length.
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Malformed hex string.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl From<DecoderError> for CodecError {
    fn from(err: DecoderError) -> Self {
        CodecError::Rlp(err)
    }
}
