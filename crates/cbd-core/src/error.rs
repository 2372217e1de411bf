//! Error types for CBD encoding and decoding operations.

use thiserror::Error;

/// Errors that can occur during CBD encoding or decoding.
#[derive(Error, Debug)]
pub enum CbdError {
    /// A negative number reached the varint layer, which has no sign bit.
    #[error("negative number {0} cannot be encoded as a varint")]
    NegativeValue(String),

    /// A float that cannot be truncated into the unsigned 64-bit range
    /// (NaN, infinity, or >= 2^64).
    #[error("number {0} is outside the encodable range")]
    NumberOutOfRange(String),

    /// A foreign value with no CBD tag was handed to an adapter
    /// (e.g. a Python `set`, or a non-string object key).
    #[error("unsupported value type: {0}")]
    UnsupportedType(String),

    /// The document header carries the wrong magic or version.
    #[error("invalid CBD format: {0}")]
    InvalidFormat(String),

    /// The top three bits of a tag byte name no known type.
    #[error("unknown type code {code} (tag byte 0x{tag:02X}) at offset {offset}")]
    UnknownTypeCode { code: u8, tag: u8, offset: usize },

    /// The document uses more distinct keys than the one-byte header field holds.
    #[error("document uses {count} distinct keys, at most {max} are allowed")]
    TooManyKeys { count: usize, max: usize },

    /// A read ran past the end of the buffer or found structurally invalid data.
    #[error("malformed buffer at offset {offset}: {message}")]
    MalformedBuffer { offset: usize, message: String },

    /// Strict decoding finished the root value with bytes left over.
    #[error("{remaining} trailing bytes after the root value at offset {offset}")]
    TrailingData { offset: usize, remaining: usize },

    /// Nesting deeper than the configured limit.
    #[error("nesting depth exceeds the limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// The encoder was given a dictionary that does not contain an object key.
    #[error("key {0:?} is missing from the dictionary")]
    MissingKey(String),

    /// An object holds the same key twice.
    #[error("key {0:?} appears more than once in one object")]
    DuplicateKey(String),

    /// JSON text could not be parsed or produced (bridge path).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CbdError {
    pub(crate) fn malformed(offset: usize, message: impl Into<String>) -> Self {
        CbdError::MalformedBuffer {
            offset,
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout cbd-core.
pub type Result<T> = std::result::Result<T, CbdError>;
