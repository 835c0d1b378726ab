use std::fmt;

use bytes::BytesMut;
use fieldframe_schema::{FieldLayout, FieldType, Schema};

use crate::codec::{decode_frame, encode_frame, DecodeReport};
use crate::config::DecodeConfig;
use crate::error::{FrameError, Result};

/// Fixed-width scalar that can live in a record field.
pub trait Scalar: Copy {
    /// Field type this scalar is stored as.
    const TYPE: FieldType;

    fn write_ne(self, dst: &mut [u8]);

    fn read_ne(src: &[u8]) -> Self;
}

macro_rules! impl_scalar {
    ($($ty:ty => $field_type:ident),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const TYPE: FieldType = FieldType::$field_type;

                fn write_ne(self, dst: &mut [u8]) {
                    dst.copy_from_slice(&self.to_ne_bytes());
                }

                fn read_ne(src: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(src);
                    <$ty>::from_ne_bytes(raw)
                }
            }
        )*
    };
}

impl_scalar! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Bytes(Vec<u8>),
}

impl Value {
    fn read(ty: FieldType, src: &[u8]) -> Self {
        match ty {
            FieldType::I8 => Value::I8(i8::read_ne(src)),
            FieldType::U8 => Value::U8(u8::read_ne(src)),
            FieldType::I16 => Value::I16(i16::read_ne(src)),
            FieldType::U16 => Value::U16(u16::read_ne(src)),
            FieldType::I32 => Value::I32(i32::read_ne(src)),
            FieldType::U32 => Value::U32(u32::read_ne(src)),
            FieldType::I64 => Value::I64(i64::read_ne(src)),
            FieldType::U64 => Value::U64(u64::read_ne(src)),
            FieldType::F32 => Value::F32(f32::read_ne(src)),
            FieldType::F64 => Value::F64(f64::read_ne(src)),
            FieldType::Bytes(_) => Value::Bytes(src.to_vec()),
        }
    }

    /// Bytes of a byte-array value with trailing zero padding removed.
    pub fn trimmed_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => {
                let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
                Some(&bytes[..end])
            }
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I8(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Bytes(_) => {
                let trimmed = self.trimmed_bytes().unwrap_or_default();
                f.write_str(&String::from_utf8_lossy(trimmed))
            }
        }
    }
}

/// Owned byte image of one record, bound to its schema.
///
/// The image has exactly the schema's record size. Scalars are stored in
/// native byte order at the offsets the schema computed, so the image is what
/// a `#[repr(C)]` struct with the same fields would look like in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'s> {
    schema: &'s Schema,
    image: Vec<u8>,
}

impl<'s> Record<'s> {
    /// A record with every byte, padding included, set to zero.
    pub fn zeroed(schema: &'s Schema) -> Self {
        Self {
            schema,
            image: vec![0u8; schema.record_size()],
        }
    }

    /// Wrap an existing image; its length must match the schema.
    pub fn from_image(schema: &'s Schema, image: Vec<u8>) -> Result<Self> {
        if image.len() != schema.record_size() {
            return Err(FrameError::RecordSizeMismatch {
                expected: schema.record_size(),
                actual: image.len(),
            });
        }
        Ok(Self { schema, image })
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.image
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    pub fn into_image(self) -> Vec<u8> {
        self.image
    }

    fn layout(&self, name: &str) -> Result<&'s FieldLayout> {
        self.schema
            .field(name)
            .ok_or_else(|| FrameError::UnknownField(name.to_string()))
    }

    fn typed_layout(&self, name: &str, requested: FieldType) -> Result<&'s FieldLayout> {
        let layout = self.layout(name)?;
        if layout.ty != requested {
            return Err(FrameError::FieldType {
                name: name.to_string(),
                declared: layout.ty,
                requested,
            });
        }
        Ok(layout)
    }

    /// Write a scalar field.
    pub fn set<T: Scalar>(&mut self, name: &str, value: T) -> Result<()> {
        let range = self.typed_layout(name, T::TYPE)?.range();
        value.write_ne(&mut self.image[range]);
        Ok(())
    }

    /// Read a scalar field.
    pub fn get<T: Scalar>(&self, name: &str) -> Result<T> {
        let range = self.typed_layout(name, T::TYPE)?.range();
        Ok(T::read_ne(&self.image[range]))
    }

    /// Copy `value` into a byte-array field, zero-filling the remainder.
    pub fn set_bytes(&mut self, name: &str, value: &[u8]) -> Result<()> {
        let layout = self.layout(name)?;
        if !layout.ty.is_bytes() {
            return Err(FrameError::FieldType {
                name: name.to_string(),
                declared: layout.ty,
                requested: FieldType::Bytes(value.len()),
            });
        }
        let field = &mut self.image[layout.range()];
        if value.len() > field.len() {
            return Err(FrameError::ValueTooLong {
                name: name.to_string(),
                len: value.len(),
                capacity: field.len(),
            });
        }
        field[..value.len()].copy_from_slice(value);
        field[value.len()..].fill(0);
        Ok(())
    }

    /// Raw bytes of any field.
    pub fn bytes(&self, name: &str) -> Result<&[u8]> {
        let range = self.layout(name)?.range();
        Ok(&self.image[range])
    }

    /// Store a dynamically typed value; its variant must match the field type.
    pub fn set_value(&mut self, name: &str, value: &Value) -> Result<()> {
        match value {
            Value::I8(v) => self.set(name, *v),
            Value::U8(v) => self.set(name, *v),
            Value::I16(v) => self.set(name, *v),
            Value::U16(v) => self.set(name, *v),
            Value::I32(v) => self.set(name, *v),
            Value::U32(v) => self.set(name, *v),
            Value::I64(v) => self.set(name, *v),
            Value::U64(v) => self.set(name, *v),
            Value::F32(v) => self.set(name, *v),
            Value::F64(v) => self.set(name, *v),
            Value::Bytes(v) => self.set_bytes(name, v),
        }
    }

    /// Read any field as a [`Value`].
    pub fn value(&self, name: &str) -> Result<Value> {
        let layout = self.layout(name)?;
        Ok(Value::read(layout.ty, &self.image[layout.range()]))
    }

    /// All fields in declaration order.
    pub fn values(&self) -> impl Iterator<Item = (&'s str, Value)> + '_ {
        let schema: &'s Schema = self.schema;
        schema.fields().iter().map(move |layout| {
            (
                layout.name.as_str(),
                Value::read(layout.ty, &self.image[layout.range()]),
            )
        })
    }

    /// Encode this record as a frame of its schema.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        encode_frame(self.schema, &self.image, dst)
    }

    /// Decode a frame into this record, keeping fields the frame lacks.
    pub fn decode_from(&mut self, frame: &[u8], config: &DecodeConfig) -> Result<DecodeReport> {
        decode_frame(self.schema, frame, &mut self.image, config)
    }
}

#[cfg(test)]
mod tests {
    use once_cell::sync::Lazy;

    use super::*;

    static STREAM_1: Lazy<Schema> = Lazy::new(|| {
        Schema::builder(1)
            .field(1, FieldType::I32, "field1")
            .disabled(2, FieldType::F32, "field2")
            .field(3, FieldType::Bytes(20), "field3")
            .build()
            .unwrap()
    });

    static STREAM_2: Lazy<Schema> = Lazy::new(|| {
        Schema::builder(1)
            .field(1, FieldType::I32, "field1")
            .field(3, FieldType::Bytes(20), "field3")
            .field(4, FieldType::Bytes(20), "field4")
            .build()
            .unwrap()
    });

    #[test]
    fn scalar_set_get() {
        let mut record = Record::zeroed(&STREAM_1);
        record.set("field1", 42i32).unwrap();
        assert_eq!(record.get::<i32>("field1").unwrap(), 42);
        assert_eq!(&record.as_bytes()[0..4], &42i32.to_ne_bytes());
    }

    #[test]
    fn scalar_type_mismatch() {
        let mut record = Record::zeroed(&STREAM_1);
        let err = record.set("field1", 1u32).unwrap_err();
        assert!(matches!(
            err,
            FrameError::FieldType {
                declared: FieldType::I32,
                requested: FieldType::U32,
                ..
            }
        ));
        assert!(record.get::<f64>("field1").is_err());
    }

    #[test]
    fn unknown_field_name() {
        let record = Record::zeroed(&STREAM_1);
        assert!(matches!(
            record.value("field2"),
            Err(FrameError::UnknownField(name)) if name == "field2"
        ));
    }

    #[test]
    fn bytes_are_zero_filled() {
        let mut record = Record::zeroed(&STREAM_1);
        record.set_bytes("field3", b"a much longer value").unwrap();
        record.set_bytes("field3", b"short").unwrap();
        let field = record.bytes("field3").unwrap();
        assert_eq!(&field[..5], b"short");
        assert!(field[5..].iter().all(|b| *b == 0));
    }

    #[test]
    fn bytes_too_long() {
        let mut record = Record::zeroed(&STREAM_1);
        let err = record.set_bytes("field3", &[1u8; 21]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::ValueTooLong {
                len: 21,
                capacity: 20,
                ..
            }
        ));
        assert!(record.set_bytes("field1", b"x").is_err());
    }

    #[test]
    fn values_in_declaration_order() {
        let mut record = Record::zeroed(&STREAM_1);
        record.set("field1", 7i32).unwrap();
        record
            .set_value("field3", &Value::Bytes(b"hi".to_vec()))
            .unwrap();

        let values: Vec<(&str, String)> = record
            .values()
            .map(|(name, value)| (name, value.to_string()))
            .collect();
        assert_eq!(
            values,
            vec![("field1", "7".to_string()), ("field3", "hi".to_string())]
        );
    }

    #[test]
    fn from_image_checks_size() {
        assert!(Record::from_image(&STREAM_1, vec![0u8; 24]).is_ok());
        assert!(matches!(
            Record::from_image(&STREAM_1, vec![0u8; 23]),
            Err(FrameError::RecordSizeMismatch { .. })
        ));
    }

    #[test]
    fn concrete_scenario_roundtrip() {
        let mut obj1 = Record::zeroed(&STREAM_1);
        obj1.set("field1", 42i32).unwrap();
        obj1.set_bytes("field3", b"Hello, World!").unwrap();

        let mut buf = BytesMut::new();
        obj1.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), 48);

        let mut obj2 = Record::zeroed(&STREAM_1);
        obj2.decode_from(&buf, &DecodeConfig::default()).unwrap();
        assert_eq!(obj2.get::<i32>("field1").unwrap(), 42);
        let field3 = obj2.bytes("field3").unwrap();
        assert_eq!(&field3[..13], b"Hello, World!");
        assert!(field3[13..].iter().all(|b| *b == 0));
        assert_eq!(obj1, obj2);
    }

    #[test]
    fn missing_field_keeps_destination_value() {
        let mut older = Record::zeroed(&STREAM_1);
        older.set("field1", 5i32).unwrap();
        older.set_bytes("field3", b"v1").unwrap();
        let mut buf = BytesMut::new();
        older.encode(&mut buf).unwrap();

        let mut zeroed = Record::zeroed(&STREAM_2);
        zeroed.decode_from(&buf, &DecodeConfig::default()).unwrap();
        assert_eq!(zeroed.get::<i32>("field1").unwrap(), 5);
        assert_eq!(zeroed.value("field3").unwrap().to_string(), "v1");
        assert!(zeroed.bytes("field4").unwrap().iter().all(|b| *b == 0));

        let mut prefilled = Record::zeroed(&STREAM_2);
        prefilled.set_bytes("field4", b"default").unwrap();
        prefilled
            .decode_from(&buf, &DecodeConfig::default())
            .unwrap();
        assert_eq!(prefilled.value("field4").unwrap().to_string(), "default");
    }

    #[test]
    fn trimmed_bytes_only_for_byte_values() {
        assert_eq!(
            Value::Bytes(b"ab\0\0".to_vec()).trimmed_bytes(),
            Some(&b"ab"[..])
        );
        assert_eq!(Value::Bytes(vec![0, 0]).trimmed_bytes(), Some(&b""[..]));
        assert_eq!(Value::U8(1).trimmed_bytes(), None);
    }
}
