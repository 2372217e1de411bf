//! Value encoder: writes a [`Value`] tree as tagged binary records.
//!
//! Each value starts with a tag byte whose top three bits select the type:
//!
//! | Type   | Tag          | Payload                                           |
//! |--------|--------------|---------------------------------------------------|
//! | Null   | `0x00`       | none                                              |
//! | Bool   | `0x20`/`0x21`| bit 0 carries the value                           |
//! | Number | `0x40`       | varint (floats truncated toward zero)             |
//! | String | `0x60`       | varint byte length, UTF-8 bytes                   |
//! | Array  | `0x81`       | varint count, elements                            |
//! | Object | `0xA1`       | varint count, then per pair: varint key index, value |
//!
//! Object keys are replaced by their 1-based index in the document's
//! [`KeyDictionary`].

use crate::cursor::Writer;
use crate::dictionary::{IndexSet, KeyDictionary};
use crate::error::{CbdError, Result};
use crate::format::{TAG_ARRAY, TAG_BOOL, TAG_NULL, TAG_NUMBER, TAG_OBJECT, TAG_STRING};
use crate::types::Value;

/// Encode `value` into `out`, resolving object keys through `dict`.
///
/// Fails with [`CbdError::MissingKey`] if `dict` lacks a key (use
/// [`KeyDictionary::collect`] on the same value to build a complete one),
/// with [`CbdError::DuplicateKey`] if an object repeats a key, and with
/// [`CbdError::DepthLimitExceeded`] past `max_depth` nested containers.
pub fn encode_value(
    value: &Value,
    dict: &KeyDictionary,
    out: &mut Writer,
    max_depth: usize,
) -> Result<()> {
    let encoder = Encoder { dict, max_depth };
    encoder.write(value, out, 0)
}

struct Encoder<'d> {
    dict: &'d KeyDictionary,
    max_depth: usize,
}

impl Encoder<'_> {
    fn write(&self, value: &Value, out: &mut Writer, depth: usize) -> Result<()> {
        match value {
            Value::Null => out.write_u8(TAG_NULL),
            Value::Bool(b) => out.write_u8(TAG_BOOL | u8::from(*b)),
            Value::Number(n) => {
                // A rejected number must not leave its tag behind.
                let wire = n.to_wire()?;
                out.write_u8(TAG_NUMBER);
                out.write_varint(wire);
            }
            Value::String(s) => {
                out.write_u8(TAG_STRING);
                out.write_str(s);
            }
            Value::Array(items) => {
                self.enter(depth)?;
                out.write_u8(TAG_ARRAY);
                out.write_varint(items.len() as u64);
                for item in items {
                    self.write(item, out, depth + 1)?;
                }
            }
            Value::Object(map) => {
                self.enter(depth)?;
                out.write_u8(TAG_OBJECT);
                out.write_varint(map.len() as u64);
                let mut seen = IndexSet::default();
                for (key, child) in map {
                    let idx = self
                        .dict
                        .index_of(key)
                        .ok_or_else(|| CbdError::MissingKey(key.clone()))?;
                    if !seen.insert(idx) {
                        return Err(CbdError::DuplicateKey(key.clone()));
                    }
                    out.write_varint(idx as u64);
                    self.write(child, out, depth + 1)?;
                }
            }
        }
        Ok(())
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
