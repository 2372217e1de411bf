//! Value decoder: rebuilds a [`Value`] tree from tagged binary records.
//!
//! The inverse of [`crate::encoder`]. Key indices are resolved through the
//! dictionary read from the document header.
//!
//! Nothing in the input is trusted: every read is bounds-checked, declared
//! element counts are validated against the bytes that remain (each element
//! needs at least one byte, each object pair at least two) before any
//! allocation, and nesting is capped at `max_depth`.

use crate::cursor::Reader;
use crate::dictionary::{IndexSet, KeyDictionary};
use crate::error::{CbdError, Result};
use crate::format::TypeCode;
use crate::types::{insert_pair, Number, Value};

/// Decode one value from `reader`, leaving the cursor just past it.
pub fn decode_value(
    reader: &mut Reader<'_>,
    dict: &KeyDictionary,
    max_depth: usize,
) -> Result<Value> {
    let decoder = Decoder { dict, max_depth };
    decoder.read(reader, 0)
}

struct Decoder<'d> {
    dict: &'d KeyDictionary,
    max_depth: usize,
}

impl Decoder<'_> {
    fn read(&self, reader: &mut Reader<'_>, depth: usize) -> Result<Value> {
        let offset = reader.position();
        let tag = reader.read_u8()?;
        let code = TypeCode::from_tag(tag)
            .map_err(|code| CbdError::UnknownTypeCode { code, tag, offset })?;

        match code {
            TypeCode::Null => Ok(Value::Null),
            TypeCode::Bool => Ok(Value::Bool(tag & 1 == 1)),
            TypeCode::Number => Ok(Value::Number(Number::from(reader.read_varint()?))),
            TypeCode::String => Ok(Value::String(reader.read_str()?.to_string())),
            TypeCode::Array => {
                self.enter(depth)?;
                let count = read_count(reader, 1)?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.read(reader, depth + 1)?);
                }
                Ok(Value::Array(items))
            }
            TypeCode::Object => {
                self.enter(depth)?;
                let count = read_count(reader, 2)?;
                let mut map = Vec::with_capacity(count);
                let mut seen = IndexSet::default();
                for _ in 0..count {
                    let (idx, key) = self.read_key(reader)?;
                    let child = self.read(reader, depth + 1)?;
                    if seen.insert(idx) {
                        map.push((key.to_string(), child));
                    } else {
                        // Repeated index: last value wins, first position kept.
                        insert_pair(&mut map, key.to_string(), child);
                    }
                }
                Ok(Value::Object(map))
            }
        }
    }

    fn read_key<'d>(&'d self, reader: &mut Reader<'_>) -> Result<(usize, &'d str)> {
        let offset = reader.position();
        let idx = reader.read_len()?;
        let key = self.dict.key_at(idx).ok_or_else(|| {
            CbdError::malformed(
                offset,
                format!(
                    "key index {idx} out of range (dictionary has {} entries)",
                    self.dict.len()
                ),
            )
        })?;
        Ok((idx, key))
    }

    fn enter(&self, depth: usize) -> Result<()> {
        if depth >= self.max_depth {
            return Err(CbdError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }
        Ok(())
    }
}

/// Read a container count and reject it if the remaining bytes cannot hold
/// that many entries of at least `min_entry_len` bytes each.
fn read_count(reader: &mut Reader<'_>, min_entry_len: usize) -> Result<usize> {
    let offset = reader.position();
    let count = reader.read_len()?;
    let fits = count
        .checked_mul(min_entry_len)
        .is_some_and(|needed| needed <= reader.remaining());
    if !fits {
        return Err(CbdError::malformed(
            offset,
            format!(
                "declared {count} entries but only {} bytes remain",
                reader.remaining()
            ),
        ));
    }
    Ok(count)
}
