//! The value tree that CBD documents encode.
//!
//! Mirrors JSON types. Objects are `Vec<(String, Value)>` to keep insertion
//! order without pulling in `IndexMap`; use [`Value::object`] or
//! [`ObjectBuilder`] to keep keys unique.

use std::collections::HashMap;
use std::fmt;

use crate::error::{CbdError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    /// Key-value pairs in insertion order. Keys must be unique: the encoder
    /// rejects a repeated key with [`CbdError::DuplicateKey`].
    Object(Vec<(String, Value)>),
}

/// A numeric value as supplied by the caller.
///
/// Negative integers and floats are representable so adapters can hand over
/// their input unchanged; the encoder coerces them with [`Number::to_wire`].
/// Decoding always yields non-negative integers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Number {
    n: N,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum N {
    PosInt(u64),
    /// Always < 0.
    NegInt(i64),
    Float(f64),
}

/// 2^64 as f64; every finite float below it truncates into `u64`.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

impl Number {
    pub fn from_f64(f: f64) -> Self {
        Number { n: N::Float(f) }
    }

    pub fn is_integer(&self) -> bool {
        !matches!(self.n, N::Float(_))
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self.n {
            N::PosInt(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.n {
            N::PosInt(n) => i64::try_from(n).ok(),
            N::NegInt(n) => Some(n),
            N::Float(_) => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self.n {
            N::PosInt(n) => n as f64,
            N::NegInt(n) => n as f64,
            N::Float(f) => f,
        }
    }

    /// Coerce to the unsigned integer written on the wire.
    ///
    /// Floats are truncated toward zero, so `3.9` becomes `3` and `-0.5`
    /// becomes `0`. This is lossy.
    pub fn to_wire(&self) -> Result<u64> {
        match self.n {
            N::PosInt(n) => Ok(n),
            N::NegInt(n) => Err(CbdError::NegativeValue(n.to_string())),
            N::Float(f) => {
                if !f.is_finite() {
                    return Err(CbdError::NumberOutOfRange(f.to_string()));
                }
                let truncated = f.trunc();
                if truncated < 0.0 {
                    return Err(CbdError::NegativeValue(f.to_string()));
                }
                if truncated >= U64_LIMIT {
                    return Err(CbdError::NumberOutOfRange(f.to_string()));
                }
                Ok(truncated as u64)
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.n {
            N::PosInt(n) => write!(f, "{n}"),
            N::NegInt(n) => write!(f, "{n}"),
            N::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number { n: N::PosInt(n) }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        match u64::try_from(n) {
            Ok(n) => Number { n: N::PosInt(n) },
            Err(_) => Number { n: N::NegInt(n) },
        }
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::from(n as u64)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::from(n as i64)
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Number::from_f64(f)
    }
}

impl Value {
    /// Build an object from pairs. A repeated key keeps its first position and
    /// takes the last value.
    pub fn object<K, V, I>(pairs: I) -> Value
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut builder = ObjectBuilder::new();
        for (k, v) in pairs {
            builder.insert(k.into(), v.into());
        }
        builder.finish()
    }

    pub fn array<V, I>(items: I) -> Value
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Look up a key in an object. `None` for non-objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }
}

/// Collects object pairs with unique keys in insertion order.
///
/// A repeated key keeps its first position and takes the last value, like
/// [`insert_pair`], but lookups go through a hash index so wide objects
/// build in linear time.
#[derive(Debug, Default)]
pub struct ObjectBuilder {
    pairs: Vec<(String, Value)>,
    positions: HashMap<String, usize>,
}

impl ObjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, key: String, value: Value) {
        match self.positions.get(&key) {
            Some(&pos) => self.pairs[pos].1 = value,
            None => {
                self.positions.insert(key.clone(), self.pairs.len());
                self.pairs.push((key, value));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn finish(self) -> Value {
        Value::Object(self.pairs)
    }
}

/// Insert into an ordered pair list, replacing the value of an existing key
/// in place. Scans the list; prefer [`ObjectBuilder`] for wide objects.
pub fn insert_pair(map: &mut Vec<(String, Value)>, key: String, value: Value) {
    match map.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => map.push((key, value)),
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Number(f.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_truncates_toward_zero() {
        assert_eq!(Number::from(3.9).to_wire().unwrap(), 3);
        assert_eq!(Number::from(0.99).to_wire().unwrap(), 0);
        assert_eq!(Number::from(-0.5).to_wire().unwrap(), 0);
    }

    #[test]
    fn test_negative_numbers_rejected() {
        assert!(matches!(
            Number::from(-5i64).to_wire(),
            Err(CbdError::NegativeValue(_))
        ));
        assert!(matches!(
            Number::from(-1.5).to_wire(),
            Err(CbdError::NegativeValue(_))
        ));
    }

    #[test]
    fn test_out_of_range_floats() {
        for f in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e20] {
            assert!(matches!(
                Number::from(f).to_wire(),
                Err(CbdError::NumberOutOfRange(_))
            ));
        }
    }

    #[test]
    fn test_non_negative_i64_is_pos_int() {
        assert_eq!(Number::from(7i64), Number::from(7u64));
        assert_eq!(Number::from(7i64).as_u64(), Some(7));
    }

    #[test]
    fn test_object_replaces_duplicate_keys_in_place() {
        let v = Value::object([("a", 1), ("b", 2), ("a", 3)]);
        let map = v.as_object().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[0], ("a".to_string(), Value::from(3)));
        assert_eq!(v.get("b"), Some(&Value::from(2)));
    }

    #[test]
    fn test_builder_matches_insert_pair() {
        let mut builder = ObjectBuilder::with_capacity(4);
        let mut pairs = Vec::new();
        for (k, v) in [("x", 1), ("y", 2), ("x", 3), ("z", 4), ("y", 5)] {
            builder.insert(k.to_string(), Value::from(v));
            insert_pair(&mut pairs, k.to_string(), Value::from(v));
        }
        assert_eq!(builder.len(), 3);
        assert_eq!(builder.finish(), Value::Object(pairs));
        assert!(ObjectBuilder::new().is_empty());
    }
}
