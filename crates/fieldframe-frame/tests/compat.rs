use bytes::BytesMut;
use fieldframe_frame::{decode_frame, encode_frame, DecodeConfig, FrameView, Record};
use fieldframe_schema::{FieldDescriptor, FieldType, Schema, DESCRIPTOR_SIZE};
use proptest::prelude::*;

fn mixed_schema() -> Schema {
    Schema::builder(11)
        .field(1, FieldType::U8, "flag")
        .field(2, FieldType::F64, "reading")
        .field(3, FieldType::I16, "delta")
        .field(4, FieldType::Bytes(5), "tag")
        .field(5, FieldType::U32, "sequence")
        .build()
        .expect("mixed schema is well formed")
}

fn field_bytes<'a>(record: &'a Record<'_>, name: &str) -> &'a [u8] {
    record.bytes(name).expect("field exists")
}

proptest! {
    #[test]
    fn roundtrip_preserves_every_field(
        flag in any::<u8>(),
        reading in any::<f64>(),
        delta in any::<i16>(),
        tag in proptest::collection::vec(any::<u8>(), 0..=5),
        sequence in any::<u32>(),
    ) {
        let schema = mixed_schema();
        let mut original = Record::zeroed(&schema);
        original.set("flag", flag).unwrap();
        original.set("reading", reading).unwrap();
        original.set("delta", delta).unwrap();
        original.set_bytes("tag", &tag).unwrap();
        original.set("sequence", sequence).unwrap();

        let mut buf = BytesMut::new();
        original.encode(&mut buf).unwrap();

        let mut decoded = Record::zeroed(&schema);
        decoded.decode_from(&buf, &DecodeConfig::default()).unwrap();

        for layout in schema.fields() {
            prop_assert_eq!(
                field_bytes(&decoded, &layout.name),
                field_bytes(&original, &layout.name)
            );
        }
    }

    #[test]
    fn wrong_stream_id_never_mutates(stream_id in any::<u32>(), fill in any::<u8>()) {
        prop_assume!(stream_id != 11);
        let schema = mixed_schema();
        let mut buf = BytesMut::new();
        encode_frame(&schema, &vec![0u8; schema.record_size()], &mut buf).unwrap();
        buf[0..4].copy_from_slice(&stream_id.to_ne_bytes());

        let mut record = vec![fill; schema.record_size()];
        let result = decode_frame(&schema, &buf, &mut record, &DecodeConfig::default());
        prop_assert!(result.is_err());
        prop_assert!(record.iter().all(|b| *b == fill));
    }

    #[test]
    fn arbitrary_bytes_never_panic(frame in proptest::collection::vec(any::<u8>(), 0..128)) {
        let schema = mixed_schema();
        let mut record = vec![0u8; schema.record_size()];
        let before = record.clone();
        if decode_frame(&schema, &frame, &mut record, &DecodeConfig::trusting()).is_err() {
            prop_assert_eq!(record, before);
        }
    }
}

#[test]
fn unknown_incoming_field_is_ignored() {
    let writer = Schema::builder(2)
        .field(1, FieldType::I32, "field1")
        .field(7, FieldType::Bytes(8), "extra")
        .build()
        .unwrap();
    let reader = Schema::builder(2)
        .field(1, FieldType::I32, "field1")
        .build()
        .unwrap();

    let mut sent = Record::zeroed(&writer);
    sent.set("field1", 99i32).unwrap();
    sent.set_bytes("extra", b"ignored!").unwrap();
    let mut buf = BytesMut::new();
    sent.encode(&mut buf).unwrap();

    let mut received = Record::zeroed(&reader);
    let report = received
        .decode_from(&buf, &DecodeConfig::default())
        .unwrap();
    assert_eq!(received.get::<i32>("field1").unwrap(), 99);
    assert_eq!(report.matched, 1);
    assert_eq!(report.skipped, 1);
}

#[test]
fn extra_descriptor_in_forged_table_is_ignored() {
    let schema = Schema::builder(2)
        .field(1, FieldType::I32, "field1")
        .build()
        .unwrap();

    let mut frame = Vec::new();
    frame.extend_from_slice(&2u32.to_ne_bytes());
    frame.extend_from_slice(&2u32.to_ne_bytes());
    frame.extend_from_slice(&FieldDescriptor::new(40, 0, 4).to_ne_bytes());
    frame.extend_from_slice(&FieldDescriptor::new(1, 4, 4).to_ne_bytes());
    frame.extend_from_slice(&0x0BAD_F00Du32.to_ne_bytes());
    frame.extend_from_slice(&17i32.to_ne_bytes());

    let mut record = Record::zeroed(&schema);
    record.decode_from(&frame, &DecodeConfig::default()).unwrap();
    assert_eq!(record.get::<i32>("field1").unwrap(), 17);
}

#[test]
fn order_independent_between_versions() {
    let forward = Schema::builder(5)
        .field(1, FieldType::U16, "a")
        .field(2, FieldType::U64, "b")
        .field(3, FieldType::Bytes(3), "c")
        .build()
        .unwrap();
    let backward = Schema::builder(5)
        .field(3, FieldType::Bytes(3), "c")
        .field(2, FieldType::U64, "b")
        .field(1, FieldType::U16, "a")
        .build()
        .unwrap();

    let mut sent = Record::zeroed(&forward);
    sent.set("a", 0xBEEFu16).unwrap();
    sent.set("b", u64::MAX - 1).unwrap();
    sent.set_bytes("c", b"xyz").unwrap();
    let mut buf = BytesMut::new();
    sent.encode(&mut buf).unwrap();

    let mut received = Record::zeroed(&backward);
    received
        .decode_from(&buf, &DecodeConfig::default())
        .unwrap();
    assert_eq!(received.get::<u16>("a").unwrap(), 0xBEEF);
    assert_eq!(received.get::<u64>("b").unwrap(), u64::MAX - 1);
    assert_eq!(received.bytes("c").unwrap(), b"xyz");

    let mut reply = BytesMut::new();
    received.encode(&mut reply).unwrap();
    let mut echoed = Record::zeroed(&forward);
    echoed.decode_from(&reply, &DecodeConfig::default()).unwrap();
    assert_eq!(echoed, sent);
}

#[test]
fn incoming_table_order_is_followed() {
    // Two descriptors with the same id: the later one wins because entries
    // are applied in wire order.
    let schema = Schema::builder(8)
        .field(1, FieldType::U8, "value")
        .build()
        .unwrap();

    let mut frame = Vec::new();
    frame.extend_from_slice(&8u32.to_ne_bytes());
    frame.extend_from_slice(&2u32.to_ne_bytes());
    frame.extend_from_slice(&FieldDescriptor::new(1, 0, 1).to_ne_bytes());
    frame.extend_from_slice(&FieldDescriptor::new(1, 1, 1).to_ne_bytes());
    frame.extend_from_slice(&[10, 20]);

    let view = FrameView::parse(&frame).unwrap();
    assert_eq!(view.raw_data().len(), 2);
    assert_eq!(view.len(), 8 + 2 * DESCRIPTOR_SIZE + 2);

    let mut record = Record::zeroed(&schema);
    let report = record.decode_from(&frame, &DecodeConfig::default()).unwrap();
    assert_eq!(record.get::<u8>("value").unwrap(), 20);
    assert_eq!(report.matched, 2);
}
