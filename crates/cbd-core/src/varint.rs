//! Base-128 variable-length integers.
//!
//! Seven payload bits per byte, least significant group first; the high bit
//! (0x80) marks a continuation. Values 0..=127 take a single byte.

use crate::error::{CbdError, Result};

/// Encode an unsigned integer into `buf`.
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    while value > 0x7F {
        buf.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Encode a signed integer, rejecting negatives: the format has no sign bit.
pub fn encode_signed(value: i64, buf: &mut Vec<u8>) -> Result<()> {
    let value = u64::try_from(value).map_err(|_| CbdError::NegativeValue(value.to_string()))?;
    encode_varint(value, buf);
    Ok(())
}

/// Number of bytes `encode_varint` writes for `value`.
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Decode a varint from `buf` starting at `*pos`, advancing `*pos` past it.
///
/// Fails on a buffer that ends before the terminating byte and on values
/// that do not fit in 64 bits.
pub fn decode_varint(buf: &[u8], pos: &mut usize) -> Result<u64> {
    let start = *pos;
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        let Some(&byte) = buf.get(*pos) else {
            return Err(CbdError::malformed(start, "truncated varint"));
        };
        *pos += 1;

        let payload = (byte & 0x7F) as u64;
        if shift >= 64 || (shift == 63 && payload > 1) {
            return Err(CbdError::malformed(start, "varint overflows 64 bits"));
        }
        result |= payload << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}
