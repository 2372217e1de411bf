//! # cbd-core
//!
//! Pure-Rust encoder and decoder for **CBD (Compact Binary Document)**.
//!
//! CBD is a binary encoding for JSON-compatible values. Object keys are
//! collected into a document-scoped dictionary and written once; objects then
//! refer to them by index. Integers and lengths are base-128 varints, and each
//! value carries a one-byte tag whose top three bits select its type.
//!
//! ## Quick start
//!
//! ```rust
//! use cbd_core::{deserialize, serialize, Value};
//!
//! let value = Value::object([
//!     ("name", Value::from("John")),
//!     ("age", Value::from(30)),
//!     ("scores", Value::array([95, 87, 92])),
//!     ("active", Value::from(true)),
//! ]);
//!
//! let bytes = serialize(&value).unwrap();
//! assert_eq!(&bytes[..4], [0xCB, 0xD1, 0x01, 0x04]);
//! assert_eq!(deserialize(&bytes).unwrap(), value);
//! ```
//!
//! Numbers are always written as unsigned integers: floats are truncated
//! toward zero and negative numbers are rejected with
//! [`CbdError::NegativeValue`].
//!
//! ## Modules
//!
//! - [`document`]: envelope, `serialize` / `deserialize`, options, `inspect`
//! - [`encoder`] / [`decoder`]: tagged value records
//! - [`dictionary`]: the key dictionary
//! - [`varint`]: base-128 integers
//! - [`cursor`]: `Writer` / `Reader` buffers
//! - [`json`]: serde support and JSON text helpers
//! - [`format`]: wire constants
//! - [`error`]: error type
//! - [`types`]: the `Value` tree

pub mod cursor;
pub mod decoder;
pub mod dictionary;
pub mod document;
pub mod encoder;
pub mod error;
pub mod format;
pub mod json;
pub mod types;
pub mod varint;

pub use dictionary::KeyDictionary;
pub use document::{
    deserialize, deserialize_with, inspect, read_header, serialize, serialize_with,
    DecodeOptions, DocumentInfo, EncodeOptions, Header,
};
pub use error::{CbdError, Result};
pub use json::{cbd_to_json, cbd_to_json_pretty, json_to_cbd};
pub use types::{Number, ObjectBuilder, Value};
