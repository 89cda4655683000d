//! Bounds-checked reader over a macaroon byte buffer.

use crate::error::L402Error;

/// Longest LEB128 encoding of a `u64`.
const MAX_VARINT_LEN: usize = 10;

/// A forward-only cursor that checks the remaining length before every read.
///
/// Reads past the end fail with [`L402Error::TruncatedEnvelope`]; they are
/// never clamped to what is left.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) const fn position(&self) -> usize {
        self.pos
    }

    pub(crate) const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, L402Error> {
        let byte = self.read_bytes(1)?;
        Ok(byte[0])
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], L402Error> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(L402Error::TruncatedEnvelope {
                offset: self.pos,
                needed: len,
                remaining,
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Reads an unsigned LEB128 varint.
    pub(crate) fn read_uvarint(&mut self) -> Result<u64, L402Error> {
        let start = self.pos;
        let mut value = 0u64;
        for index in 0..MAX_VARINT_LEN {
            let byte = self.read_u8()?;
            if index == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(L402Error::InvalidPacket {
                    offset: start,
                    reason: "varint overflows u64",
                });
            }
            value |= u64::from(byte & 0x7f) << (7 * index);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(L402Error::InvalidPacket {
            offset: start,
            reason: "varint longer than 10 bytes",
        })
    }

    /// Reads a varint length prefix followed by that many bytes.
    pub(crate) fn read_length_prefixed(&mut self) -> Result<&'a [u8], L402Error> {
        let len = self.read_uvarint()?;
        // A length that does not fit in usize can never fit in the buffer either.
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        self.read_bytes(len)
    }
}
