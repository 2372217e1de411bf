//! Wire formats the CLI converts CBD to and from, all driven through the
//! serde impls on [`Value`].

use anyhow::Result;
use cbd_core::Value;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Cbor,
    Msgpack,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Format::Json => "JSON",
            Format::Cbor => "CBOR",
            Format::Msgpack => "MessagePack",
        }
    }

    /// Parse a document in this format.
    pub fn read_value(self, bytes: &[u8]) -> Result<Value> {
        let value = match self {
            Format::Json => serde_json::from_slice(bytes)?,
            Format::Cbor => ciborium::from_reader(bytes)?,
            Format::Msgpack => rmp_serde::from_slice(bytes)?,
        };
        Ok(value)
    }

    /// Write `value` in this format. `pretty` only affects JSON.
    pub fn write_value(self, value: &Value, pretty: bool) -> Result<Vec<u8>> {
        let bytes = match self {
            Format::Json if pretty => serde_json::to_vec_pretty(value)?,
            Format::Json => serde_json::to_vec(value)?,
            Format::Cbor => {
                let mut buf = Vec::new();
                ciborium::into_writer(value, &mut buf)?;
                buf
            }
            Format::Msgpack => rmp_serde::to_vec(value)?,
        };
        Ok(bytes)
    }
}
