//! Document-scoped key dictionary.
//!
//! Every object key in a document is stored once, in first-encounter order,
//! and objects refer to keys by 1-based index. Index 0 is never assigned.
//!
//! Wire format (the entry count lives in the header byte):
//! `[len: varint, utf8_bytes...]*`

use std::collections::{HashMap, HashSet};

use crate::cursor::{Reader, Writer};
use crate::error::{CbdError, Result};
use crate::format::MAX_DICT_KEYS;
use crate::types::Value;

#[derive(Debug, Default, Clone)]
pub struct KeyDictionary {
    /// key -> index (1-based) for O(1) dedup and encoder lookups.
    index: HashMap<String, usize>,
    /// Ordered keys; `keys[i]` has index `i + 1`.
    keys: Vec<String>,
}

impl KeyDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every object key in `value`, depth-first: an object's key is
    /// recorded before its value is visited, arrays are walked in order.
    pub fn collect(value: &Value, max_depth: usize) -> Result<Self> {
        let mut dict = Self::new();
        dict.collect_into(value, 0, max_depth)?;
        Ok(dict)
    }

    fn collect_into(&mut self, value: &Value, depth: usize, max_depth: usize) -> Result<()> {
        match value {
            Value::Object(map) => {
                if depth >= max_depth {
                    return Err(CbdError::DepthLimitExceeded { limit: max_depth });
                }
                for (key, child) in map {
                    self.get_or_insert(key);
                    self.collect_into(child, depth + 1, max_depth)?;
                }
            }
            Value::Array(items) => {
                if depth >= max_depth {
                    return Err(CbdError::DepthLimitExceeded { limit: max_depth });
                }
                for child in items {
                    self.collect_into(child, depth + 1, max_depth)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Return the index of `key`, assigning the next one if it is new.
    pub fn get_or_insert(&mut self, key: &str) -> usize {
        if let Some(&idx) = self.index.get(key) {
            return idx;
        }
        self.keys.push(key.to_string());
        let idx = self.keys.len();
        self.index.insert(key.to_string(), idx);
        idx
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Look up a key by its 1-based index.
    pub fn key_at(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.keys.get(i))
            .map(String::as_str)
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The entry count as stored in the header byte.
    pub fn header_size(&self) -> Result<u8> {
        u8::try_from(self.keys.len()).map_err(|_| CbdError::TooManyKeys {
            count: self.keys.len(),
            max: MAX_DICT_KEYS,
        })
    }

    /// Write the entries (not the count) to `out`.
    pub fn write_entries(&self, out: &mut Writer) {
        for key in &self.keys {
            out.write_str(key);
        }
    }

    /// Read `count` entries written by [`KeyDictionary::write_entries`].
    pub fn read_entries(reader: &mut Reader<'_>, count: usize) -> Result<Self> {
        let mut dict = Self::new();
        for _ in 0..count {
            let offset = reader.position();
            let key = reader.read_str()?;
            if dict.index.contains_key(key) {
                return Err(CbdError::malformed(
                    offset,
                    format!("duplicate dictionary key {key:?}"),
                ));
            }
            dict.get_or_insert(key);
        }
        Ok(dict)
    }
}

/// Dictionary indices already used by one object.
///
/// Indices below 256 live in a fixed bitmap; larger ones spill into a
/// hash set.
#[derive(Debug, Default)]
pub(crate) struct IndexSet {
    bits: [u64; 4],
    spill: HashSet<usize>,
}

impl IndexSet {
    /// Add `idx`, returning `false` if it was already present.
    pub(crate) fn insert(&mut self, idx: usize) -> bool {
        if idx < 256 {
            let mask = 1u64 << (idx % 64);
            let word = &mut self.bits[idx / 64];
            let fresh = *word & mask == 0;
            *word |= mask;
            fresh
        } else {
            self.spill.insert(idx)
        }
    }
}
