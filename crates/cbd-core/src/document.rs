//! Document envelope: header, dictionary and root value.
//!
//! ```text
//! [0xCB 0xD1][0x01][dict_size: u8][dictionary entries][root value]
//! ```
//!
//! [`serialize`] and [`deserialize`] are the public entry points; the `_with`
//! variants take [`EncodeOptions`] / [`DecodeOptions`].

use tracing::debug;

use crate::cursor::{Reader, Writer};
use crate::decoder::decode_value;
use crate::dictionary::KeyDictionary;
use crate::encoder::encode_value;
use crate::error::{CbdError, Result};
use crate::format::{DEFAULT_MAX_DEPTH, HEADER_LEN, MAGIC, VERSION};
use crate::types::Value;

/// Settings for [`serialize_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Maximum number of nested arrays/objects.
    pub max_depth: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EncodeOptions {
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Settings for [`deserialize_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum number of nested arrays/objects.
    pub max_depth: usize,
    /// Reject bytes left over after the root value.
    pub strict: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict: true,
        }
    }
}

impl DecodeOptions {
    /// Defaults, but trailing bytes are ignored.
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// The fixed four-byte document header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: u16,
    pub version: u8,
    pub dict_size: u8,
}

impl Header {
    fn write(&self, out: &mut Writer) {
        out.write_u16_be(self.magic);
        out.write_u8(self.version);
        out.write_u8(self.dict_size);
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        if reader.remaining() < HEADER_LEN {
            return Err(CbdError::malformed(
                0,
                format!(
                    "document is {} bytes, the header alone needs {HEADER_LEN}",
                    reader.remaining()
                ),
            ));
        }
        let header = Header {
            magic: reader.read_u16_be()?,
            version: reader.read_u8()?,
            dict_size: reader.read_u8()?,
        };
        if header.magic != MAGIC {
            return Err(CbdError::InvalidFormat(format!(
                "bad magic 0x{:04X} (expected 0x{MAGIC:04X})",
                header.magic
            )));
        }
        if header.version != VERSION {
            return Err(CbdError::InvalidFormat(format!(
                "unsupported version {} (expected {VERSION})",
                header.version
            )));
        }
        Ok(header)
    }
}

/// Header and dictionary of a document, without decoding the root value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub header: Header,
    pub keys: Vec<String>,
    /// Offset of the root value's tag byte.
    pub body_offset: usize,
    pub total_len: usize,
}

impl DocumentInfo {
    pub fn body_len(&self) -> usize {
        self.total_len - self.body_offset
    }
}

/// Serialize a value into a CBD document with default options.
pub fn serialize(value: &Value) -> Result<Vec<u8>> {
    serialize_with(value, &EncodeOptions::default())
}

/// Serialize a value into a CBD document.
///
/// Fails with [`CbdError::TooManyKeys`] when the value uses more than 255
/// distinct object keys, and with [`CbdError::NegativeValue`] on any negative
/// number. Floats are truncated toward zero.
pub fn serialize_with(value: &Value, options: &EncodeOptions) -> Result<Vec<u8>> {
    let dict = KeyDictionary::collect(value, options.max_depth)?;
    let header = Header {
        magic: MAGIC,
        version: VERSION,
        dict_size: dict.header_size()?,
    };

    let mut out = Writer::new();
    header.write(&mut out);
    dict.write_entries(&mut out);
    let body_offset = out.len();
    encode_value(value, &dict, &mut out, options.max_depth)?;

    debug!(
        keys = dict.len(),
        dictionary_bytes = body_offset - HEADER_LEN,
        total_bytes = out.len(),
        "serialized CBD document"
    );
    Ok(out.into_bytes())
}

/// Deserialize a CBD document with default (strict) options.
pub fn deserialize(bytes: &[u8]) -> Result<Value> {
    deserialize_with(bytes, &DecodeOptions::default())
}

/// Deserialize a CBD document.
pub fn deserialize_with(bytes: &[u8], options: &DecodeOptions) -> Result<Value> {
    let mut reader = Reader::new(bytes);
    let header = Header::read(&mut reader)?;
    let dict = KeyDictionary::read_entries(&mut reader, header.dict_size as usize)?;
    let value = decode_value(&mut reader, &dict, options.max_depth)?;

    if !reader.is_at_end() {
        if options.strict {
            return Err(CbdError::TrailingData {
                offset: reader.position(),
                remaining: reader.remaining(),
            });
        }
        debug!(
            remaining = reader.remaining(),
            "ignoring trailing bytes after root value"
        );
    }

    debug!(
        keys = dict.len(),
        total_bytes = bytes.len(),
        "deserialized CBD document"
    );
    Ok(value)
}

/// Validate and return the header alone.
pub fn read_header(bytes: &[u8]) -> Result<Header> {
    Header::read(&mut Reader::new(bytes))
}

/// Read the header and dictionary of a document, stopping at the root value.
pub fn inspect(bytes: &[u8]) -> Result<DocumentInfo> {
    let mut reader = Reader::new(bytes);
    let header = Header::read(&mut reader)?;
    let dict = KeyDictionary::read_entries(&mut reader, header.dict_size as usize)?;
    Ok(DocumentInfo {
        header,
        keys: dict.keys().to_vec(),
        body_offset: reader.position(),
        total_len: bytes.len(),
    })
}
