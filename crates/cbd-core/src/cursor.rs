//! Output buffer and bounds-checked input cursor shared by the encoder,
//! decoder and dictionary.

use crate::error::{CbdError, Result};
use crate::varint::{decode_varint, encode_varint};

/// Growable output buffer. Owns the bytes until [`Writer::into_bytes`].
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    pub fn write_u16_be(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_varint(&mut self, value: u64) {
        encode_varint(value, &mut self.buf);
    }

    /// Varint byte length followed by the UTF-8 bytes.
    pub fn write_str(&mut self, s: &str) {
        self.write_varint(s.len() as u64);
        self.buf.extend_from_slice(s.as_bytes());
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Read cursor over a borrowed byte slice. Every read is bounds-checked and
/// reports the offset at which it started.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos == self.buf.len()
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = *self
            .buf
            .get(self.pos)
            .ok_or_else(|| CbdError::malformed(self.pos, "unexpected end of buffer"))?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        decode_varint(self.buf, &mut self.pos)
    }

    /// Read a varint that will be used as an in-memory length or count.
    pub fn read_len(&mut self) -> Result<usize> {
        let start = self.pos;
        let value = self.read_varint()?;
        usize::try_from(value)
            .map_err(|_| CbdError::malformed(start, format!("length {value} does not fit in memory")))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(CbdError::malformed(
                self.pos,
                format!("need {len} bytes, {} remain", self.remaining()),
            ));
        }
        let buf = self.buf;
        let bytes = &buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Varint byte length followed by that many bytes of UTF-8.
    pub fn read_str(&mut self) -> Result<&'a str> {
        let len = self.read_len()?;
        let start = self.pos;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map_err(|e| CbdError::malformed(start, format!("invalid UTF-8: {e}")))
    }
}
