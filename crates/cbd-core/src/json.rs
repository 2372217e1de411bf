//! JSON ⇄ CBD bridge.
//!
//! [`Value`] implements `serde::Serialize` and `serde::Deserialize`, so any
//! serde format can produce or consume it. JSON objects keep their key order
//! (serde_json is built with `preserve_order`).
//!
//! Numbers from JSON are carried as-is into the [`Value`]; negative numbers
//! are rejected and floats truncated only when the value is serialized to CBD.
//!
//! # Example
//! ```
//! use cbd_core::{cbd_to_json, json_to_cbd};
//!
//! let bytes = json_to_cbd(r#"{"name":"Alice","scores":[95,87]}"#).unwrap();
//! assert_eq!(&bytes[..2], [0xCB, 0xD1]);
//! assert_eq!(cbd_to_json(&bytes).unwrap(), r#"{"name":"Alice","scores":[95,87]}"#);
//! ```

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::document::{deserialize, serialize};
use crate::error::Result;
use crate::types::{Number, ObjectBuilder, Value};

/// Parse JSON text and serialize it as a CBD document.
pub fn json_to_cbd(json: &str) -> Result<Vec<u8>> {
    let value: Value = serde_json::from_str(json)?;
    serialize(&value)
}

/// Deserialize a CBD document into compact JSON text.
pub fn cbd_to_json(bytes: &[u8]) -> Result<String> {
    let value = deserialize(bytes)?;
    Ok(serde_json::to_string(&value)?)
}

/// Deserialize a CBD document into pretty-printed JSON text.
pub fn cbd_to_json_pretty(bytes: &[u8]) -> Result<String> {
    let value = deserialize(bytes)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

impl Value {
    /// Convert from a `serde_json::Value`. Infallible for any JSON value.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(Number::from_json(&n)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert into a `serde_json::Value`. Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => n.to_json(),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl Number {
    fn from_json(n: &serde_json::Number) -> Number {
        if let Some(u) = n.as_u64() {
            Number::from(u)
        } else if let Some(i) = n.as_i64() {
            Number::from(i)
        } else {
            Number::from_f64(n.as_f64().unwrap_or(f64::NAN))
        }
    }

    fn to_json(self) -> serde_json::Value {
        if let Some(u) = self.as_u64() {
            serde_json::Value::from(u)
        } else if let Some(i) = self.as_i64() {
            serde_json::Value::from(i)
        } else {
            serde_json::Number::from_f64(self.as_f64())
                .map_or(serde_json::Value::Null, serde_json::Value::Number)
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if let Some(u) = self.as_u64() {
            serializer.serialize_u64(u)
        } else if let Some(i) = self.as_i64() {
            serializer.serialize_i64(i)
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (k, v) in pairs {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Value, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON-compatible value")
    }

    fn visit_unit<E>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Value, D::Error> {
        Deserialize::deserialize(d)
    }

    fn visit_bool<E>(self, b: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_u64<E>(self, n: u64) -> std::result::Result<Value, E> {
        Ok(Value::from(n))
    }

    fn visit_i64<E>(self, n: i64) -> std::result::Result<Value, E> {
        Ok(Value::from(n))
    }

    fn visit_f64<E>(self, f: f64) -> std::result::Result<Value, E> {
        Ok(Value::from(f))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(s.to_string()))
    }

    fn visit_string<E>(self, s: String) -> std::result::Result<Value, E> {
        Ok(Value::String(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Value, A::Error> {
        let capacity = access.size_hint().unwrap_or(0).min(4096);
        let mut builder = ObjectBuilder::with_capacity(capacity);
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            builder.insert(key, value);
        }
        Ok(builder.finish())
    }
}
