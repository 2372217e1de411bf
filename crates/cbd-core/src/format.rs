//! Wire-format constants: envelope header and tag byte layout.
//!
//! ```text
//! [0xCB 0xD1][version: u8][dict_size: u8][dictionary entries][root value]
//! ```
//!
//! Every value starts with a tag byte whose top three bits carry the type code.

/// Magic number, written big-endian as the first two bytes.
pub const MAGIC: u16 = 0xCBD1;

/// Current (and only) format version.
pub const VERSION: u8 = 0x01;

/// Fixed header size: magic (2) + version (1) + dictionary size (1).
pub const HEADER_LEN: usize = 4;

/// The dictionary size lives in one byte.
pub const MAX_DICT_KEYS: usize = u8::MAX as usize;

/// Default nesting limit for the dictionary pass, encoder and decoder.
pub const DEFAULT_MAX_DEPTH: usize = 256;

pub const TAG_NULL: u8 = 0x00;
pub const TAG_BOOL: u8 = 0x20;
pub const TAG_NUMBER: u8 = 0x40;
pub const TAG_STRING: u8 = 0x60;
/// Containers set the low bit.
pub const TAG_ARRAY: u8 = 0x81;
pub const TAG_OBJECT: u8 = 0xA1;

/// Type code carried in the top three bits of a tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TypeCode {
    Null = 0,
    Bool = 1,
    Number = 2,
    String = 3,
    Array = 4,
    Object = 5,
}

impl TypeCode {
    /// Extract the type code from a tag byte. `Err` carries the raw code (6 or 7).
    pub fn from_tag(tag: u8) -> Result<Self, u8> {
        match tag >> 5 {
            0 => Ok(TypeCode::Null),
            1 => Ok(TypeCode::Bool),
            2 => Ok(TypeCode::Number),
            3 => Ok(TypeCode::String),
            4 => Ok(TypeCode::Array),
            5 => Ok(TypeCode::Object),
            other => Err(other),
        }
    }
}
