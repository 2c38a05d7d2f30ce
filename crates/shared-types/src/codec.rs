//! # RLP Codec Bindings
//!
//! Thin layer over the `rlp` crate:
//!
//! - `encode` / `decode` for whole values (decode rejects trailing bytes)
//! - `RlpReader`, a streaming reader over a sequence of concatenated items
//!   with `list_header` / `decode_next` / `list_end`
//! - helpers for nil-able addresses, which encode as the empty string
//!
//! Canonical-form enforcement (minimal integers, minimal length prefixes,
//! single bytes below 0x80 not wrapped in a string header) comes from the
//! underlying decoder and applies to every value read through this module.

use crate::entities::Address;
use crate::errors::CodecError;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

/// Encodes a value into its canonical RLP bytes.
pub fn encode<T: Encodable>(value: &T) -> Vec<u8> {
    rlp::encode(value).to_vec()
}

/// Decodes exactly one value; bytes after the value are an error.
pub fn decode<T: Decodable>(bytes: &[u8]) -> Result<T, CodecError> {
    let rlp = Rlp::new(bytes);
    let info = rlp.payload_info()?;
    let total = info.header_len + info.value_len;
    if total > bytes.len() {
        return Err(CodecError::UnexpectedEnd);
    }
    if total < bytes.len() {
        return Err(CodecError::TrailingBytes {
            trailing: bytes.len() - total,
        });
    }
    Ok(rlp.as_val()?)
}

/// Opens a streaming reader over `data`, bounding every item by `size_hint`.
pub fn stream(data: &[u8], size_hint: usize) -> RlpReader<'_> {
    RlpReader::with_limit(data, size_hint)
}

/// Appends an optional address; `None` becomes the empty string.
pub fn append_optional_address(s: &mut RlpStream, address: &Option<Address>) {
    match address {
        Some(addr) => {
            s.append(addr);
        }
        None => {
            s.append_empty_data();
        }
    }
}

/// Reads an optional address written by [`append_optional_address`].
pub fn decode_optional_address(rlp: &Rlp<'_>) -> Result<Option<Address>, DecoderError> {
    if rlp.is_data() && rlp.is_empty() {
        return Ok(None);
    }
    rlp.as_val().map(Some)
}

/// Shape of the next item in a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// A single byte below 0x80, encoded as itself.
    Byte(u8),
    /// A string with the given payload length.
    String(usize),
    /// A list with the given payload length.
    List(usize),
}

/// Streaming reader over concatenated RLP items.
///
/// Unlike [`Rlp`], which indexes into a single list, the reader walks a byte
/// sequence item by item. That is what typed transaction envelopes need: their
/// wire form is one or two tag bytes followed by the body list.
#[derive(Debug, Clone)]
pub struct RlpReader<'a> {
    data: &'a [u8],
    pos: usize,
    /// End offsets of the lists currently entered, innermost last.
    ends: Vec<usize>,
    limit: usize,
}

impl<'a> RlpReader<'a> {
    /// Creates a reader bounded by the input length.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_limit(data, data.len())
    }

    /// Creates a reader that rejects items extending past `limit` bytes.
    pub fn with_limit(data: &'a [u8], limit: usize) -> Self {
        Self {
            data,
            pos: 0,
            ends: Vec::new(),
            limit: limit.min(data.len()),
        }
    }

    fn current_end(&self) -> usize {
        self.ends.last().copied().unwrap_or(self.limit)
    }

    /// Header length and total length of the item at the cursor.
    fn next_item(&self) -> Result<(usize, usize), CodecError> {
        let end = self.current_end();
        if self.pos >= end {
            return Err(CodecError::EndOfList);
        }
        let info = Rlp::new(&self.data[self.pos..]).payload_info()?;
        let total = info.header_len + info.value_len;
        if self.pos + total > self.data.len() {
            return Err(CodecError::UnexpectedEnd);
        }
        if self.pos + total > end {
            return Err(CodecError::ValueTooLarge {
                size: total,
                limit: end - self.pos,
            });
        }
        Ok((info.header_len, total))
    }

    /// Peeks at the next item without consuming it.
    pub fn kind(&self) -> Result<ItemKind, CodecError> {
        let (header_len, total) = self.next_item()?;
        let first = self.data[self.pos];
        Ok(match first {
            0x00..=0x7f => ItemKind::Byte(first),
            0x80..=0xbf => ItemKind::String(total - header_len),
            _ => ItemKind::List(total - header_len),
        })
    }

    /// Enters the list at the cursor and returns its payload size.
    pub fn list_header(&mut self) -> Result<usize, CodecError> {
        let (header_len, total) = self.next_item()?;
        if self.data[self.pos] < 0xc0 {
            return Err(CodecError::ExpectedList);
        }
        self.ends.push(self.pos + total);
        self.pos += header_len;
        Ok(total - header_len)
    }

    /// Leaves the innermost list; every item in it must have been read.
    pub fn list_end(&mut self) -> Result<(), CodecError> {
        let end = self.ends.pop().ok_or(CodecError::NoOpenList)?;
        if self.pos != end {
            return Err(CodecError::ListNotConsumed {
                remaining: end.saturating_sub(self.pos),
            });
        }
        Ok(())
    }

    /// Returns the raw bytes of the next item and advances past it.
    pub fn raw_next(&mut self) -> Result<&'a [u8], CodecError> {
        let (_, total) = self.next_item()?;
        let raw = &self.data[self.pos..self.pos + total];
        self.pos += total;
        Ok(raw)
    }

    /// Decodes the next item as `T`.
    pub fn decode_next<T: Decodable>(&mut self) -> Result<T, CodecError> {
        let raw = self.raw_next()?;
        Ok(Rlp::new(raw).as_val()?)
    }

    /// Decodes the next item as a nil-able address.
    pub fn decode_next_optional_address(&mut self) -> Result<Option<Address>, CodecError> {
        let raw = self.raw_next()?;
        Ok(decode_optional_address(&Rlp::new(raw))?)
    }

    /// Whether the cursor sits at the end of the current list (or input).
    pub fn at_end(&self) -> bool {
        self.pos >= self.current_end()
    }

    /// Byte offset of the cursor from the start of the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Asserts that the whole input has been consumed.
    pub fn finish(self) -> Result<(), CodecError> {
        if !self.ends.is_empty() {
            return Err(CodecError::ListNotConsumed {
                remaining: self.current_end().saturating_sub(self.pos),
            });
        }
        if self.pos < self.data.len() {
            return Err(CodecError::TrailingBytes {
                trailing: self.data.len() - self.pos,
            });
        }
        Ok(())
    }
}
