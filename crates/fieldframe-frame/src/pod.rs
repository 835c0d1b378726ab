//! Frames for plain `#[repr(C)]` structs.
//!
//! A struct whose memory image matches a schema's compiled layout can be
//! encoded and decoded directly, without going through [`Record`](crate::Record).
//! The schema must declare the same fields in the same order as the struct,
//! and the struct must be [`bytemuck::Pod`], i.e. contain no implicit padding.

use bytemuck::Pod;
use bytes::BytesMut;
use fieldframe_schema::Schema;

use crate::codec::{decode_frame, encode_frame, DecodeReport};
use crate::config::DecodeConfig;
use crate::error::Result;

/// Encode a struct's memory image as a frame of `schema`.
pub fn encode_pod<T: Pod>(schema: &Schema, value: &T, dst: &mut BytesMut) -> Result<()> {
    encode_frame(schema, bytemuck::bytes_of(value), dst)
}

/// Decode a frame of `schema` into a struct's memory image.
pub fn decode_pod<T: Pod>(
    schema: &Schema,
    frame: &[u8],
    value: &mut T,
    config: &DecodeConfig,
) -> Result<DecodeReport> {
    decode_frame(schema, frame, bytemuck::bytes_of_mut(value), config)
}

#[cfg(test)]
mod tests {
    use bytemuck::Zeroable;
    use fieldframe_schema::FieldType;
    use once_cell::sync::Lazy;

    use super::*;
    use crate::error::FrameError;

    #[repr(C)]
    #[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
    struct Stream1 {
        field1: i32,
        field3: [u8; 20],
    }

    #[repr(C)]
    #[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
    struct Stream1Reordered {
        field3: [u8; 20],
        field1: i32,
    }

    static STREAM_1: Lazy<Schema> = Lazy::new(|| {
        Schema::builder(1)
            .field(1, FieldType::I32, "field1")
            .disabled(2, FieldType::F32, "field2")
            .field(3, FieldType::Bytes(20), "field3")
            .build()
            .unwrap()
    });

    static STREAM_1_REORDERED: Lazy<Schema> = Lazy::new(|| {
        Schema::builder(1)
            .field(3, FieldType::Bytes(20), "field3")
            .field(1, FieldType::I32, "field1")
            .build()
            .unwrap()
    });

    fn hello() -> Stream1 {
        let mut field3 = [0u8; 20];
        field3[..13].copy_from_slice(b"Hello, World!");
        Stream1 {
            field1: 42,
            field3,
        }
    }

    #[test]
    fn struct_roundtrip() {
        let obj1 = hello();
        let mut buf = BytesMut::new();
        encode_pod(&STREAM_1, &obj1, &mut buf).unwrap();
        assert_eq!(buf.len(), 48);

        let mut obj2 = Stream1::zeroed();
        let report = decode_pod(&STREAM_1, &buf, &mut obj2, &DecodeConfig::default()).unwrap();
        assert_eq!(obj2, obj1);
        assert_eq!(report.matched, 2);
    }

    #[test]
    fn declaration_order_does_not_matter() {
        let mut buf = BytesMut::new();
        encode_pod(&STREAM_1, &hello(), &mut buf).unwrap();

        let mut reordered = Stream1Reordered::zeroed();
        decode_pod(
            &STREAM_1_REORDERED,
            &buf,
            &mut reordered,
            &DecodeConfig::default(),
        )
        .unwrap();
        assert_eq!(reordered.field1, 42);
        assert_eq!(reordered.field3, hello().field3);

        let mut back = BytesMut::new();
        encode_pod(&STREAM_1_REORDERED, &reordered, &mut back).unwrap();
        let mut original = Stream1::zeroed();
        decode_pod(&STREAM_1, &back, &mut original, &DecodeConfig::default()).unwrap();
        assert_eq!(original, hello());
    }

    #[test]
    fn struct_size_must_match_schema() {
        let mut buf = BytesMut::new();
        let err = encode_pod(&STREAM_1, &0u64, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::RecordSizeMismatch {
                expected: 24,
                actual: 8
            }
        ));
    }
}
