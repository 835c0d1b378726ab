use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Encoded size of one [`FieldDescriptor`]: id (4) + offset (2) + size (2).
pub const DESCRIPTOR_SIZE: usize = 8;

/// Location of one field inside a record's byte image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    /// Caller-assigned field id, stable across schema versions.
    pub id: u32,
    /// Byte offset of the field within the record image.
    pub offset: u16,
    /// Byte length of the field.
    pub size: u16,
}

impl FieldDescriptor {
    pub const fn new(id: u32, offset: u16, size: u16) -> Self {
        Self { id, offset, size }
    }

    /// Exclusive end of the field's byte range.
    pub fn end(&self) -> usize {
        self.offset as usize + self.size as usize
    }

    /// Encode in the producing machine's native byte order.
    ///
    /// ```text
    /// ┌──────────┬──────────┬──────────┐
    /// │ id (4B)  │ off (2B) │ size (2B)│
    /// └──────────┴──────────┴──────────┘
    /// ```
    pub fn to_ne_bytes(&self) -> [u8; DESCRIPTOR_SIZE] {
        let mut out = [0u8; DESCRIPTOR_SIZE];
        out[0..4].copy_from_slice(&self.id.to_ne_bytes());
        out[4..6].copy_from_slice(&self.offset.to_ne_bytes());
        out[6..8].copy_from_slice(&self.size.to_ne_bytes());
        out
    }

    /// Decode a descriptor written by [`FieldDescriptor::to_ne_bytes`].
    pub fn from_ne_bytes(raw: [u8; DESCRIPTOR_SIZE]) -> Self {
        Self {
            id: u32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]),
            offset: u16::from_ne_bytes([raw[4], raw[5]]),
            size: u16::from_ne_bytes([raw[6], raw[7]]),
        }
    }
}

/// Element type of a fixed-size field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// Fixed-length byte array (`bytes[N]`).
    Bytes(usize),
}

impl FieldType {
    /// Size of one value in bytes.
    pub fn size(&self) -> usize {
        match self {
            FieldType::I8 | FieldType::U8 => 1,
            FieldType::I16 | FieldType::U16 => 2,
            FieldType::I32 | FieldType::U32 | FieldType::F32 => 4,
            FieldType::I64 | FieldType::U64 | FieldType::F64 => 8,
            FieldType::Bytes(len) => *len,
        }
    }

    /// Required alignment, following C struct layout rules.
    pub fn align(&self) -> usize {
        match self {
            FieldType::Bytes(_) => 1,
            scalar => scalar.size(),
        }
    }

    pub fn is_bytes(&self) -> bool {
        matches!(self, FieldType::Bytes(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::I8 => f.write_str("i8"),
            FieldType::U8 => f.write_str("u8"),
            FieldType::I16 => f.write_str("i16"),
            FieldType::U16 => f.write_str("u16"),
            FieldType::I32 => f.write_str("i32"),
            FieldType::U32 => f.write_str("u32"),
            FieldType::I64 => f.write_str("i64"),
            FieldType::U64 => f.write_str("u64"),
            FieldType::F32 => f.write_str("f32"),
            FieldType::F64 => f.write_str("f64"),
            FieldType::Bytes(len) => write!(f, "bytes[{len}]"),
        }
    }
}

impl FromStr for FieldType {
    type Err = SchemaError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_ascii_lowercase();
        let ty = match normalized.as_str() {
            "i8" => FieldType::I8,
            "u8" => FieldType::U8,
            "i16" => FieldType::I16,
            "u16" => FieldType::U16,
            "i32" => FieldType::I32,
            "u32" => FieldType::U32,
            "i64" => FieldType::I64,
            "u64" => FieldType::U64,
            "f32" => FieldType::F32,
            "f64" => FieldType::F64,
            other => parse_bytes_type(other)
                .ok_or_else(|| SchemaError::InvalidFieldType(input.to_string()))?,
        };
        Ok(ty)
    }
}

fn parse_bytes_type(input: &str) -> Option<FieldType> {
    let len = input.strip_prefix("bytes[")?.strip_suffix(']')?;
    len.trim().parse::<usize>().ok().map(FieldType::Bytes)
}

impl TryFrom<String> for FieldType {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.to_string()
    }
}

/// One entry of a declared field list, before layout compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Disabled fields get no storage and no descriptor.
    pub enabled: bool,
    pub id: u32,
    pub ty: FieldType,
    pub name: String,
}

impl FieldSpec {
    pub fn enabled(id: u32, ty: FieldType, name: impl Into<String>) -> Self {
        Self {
            enabled: true,
            id,
            ty,
            name: name.into(),
        }
    }

    pub fn disabled(id: u32, ty: FieldType, name: impl Into<String>) -> Self {
        Self {
            enabled: false,
            id,
            ty,
            name: name.into(),
        }
    }
}
