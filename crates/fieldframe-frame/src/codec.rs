use bytes::{Buf, BufMut, BytesMut};
use fieldframe_schema::{FieldDescriptor, Schema, DESCRIPTOR_SIZE};

use crate::config::DecodeConfig;
use crate::error::{FrameError, Result};

/// Frame header: stream id (4) + meta count (4) = 8 bytes.
pub const HEADER_SIZE: usize = 8;

/// Total wire size of a frame for `schema`.
pub fn frame_size(schema: &Schema) -> usize {
    HEADER_SIZE + schema.table().len() * DESCRIPTOR_SIZE + schema.record_size()
}

/// Encode a record image into the wire format.
///
/// Wire format (all integers in native byte order):
/// ```text
/// ┌────────────┬────────────┬──────────────────────┬─────────────────────┐
/// │ Stream ID  │ Meta count │ Meta entries         │ Raw data            │
/// │ (4B)       │ (4B)       │ (8B x meta count)    │ (record size bytes) │
/// └────────────┴────────────┴──────────────────────┴─────────────────────┘
/// ```
///
/// `image` is copied verbatim, padding included.
pub fn encode_frame(schema: &Schema, image: &[u8], dst: &mut BytesMut) -> Result<()> {
    check_image(schema, image)?;
    dst.reserve(frame_size(schema));
    put_frame(schema, image, dst);
    Ok(())
}

/// Encode into a caller-supplied buffer without allocating.
///
/// Returns the number of bytes written.
pub fn encode_frame_into(schema: &Schema, image: &[u8], dst: &mut [u8]) -> Result<usize> {
    check_image(schema, image)?;
    let needed = frame_size(schema);
    if dst.len() < needed {
        return Err(FrameError::BufferTooSmall {
            needed,
            available: dst.len(),
        });
    }
    let mut cursor = &mut dst[..needed];
    put_frame(schema, image, &mut cursor);
    Ok(needed)
}

fn check_image(schema: &Schema, image: &[u8]) -> Result<()> {
    if image.len() != schema.record_size() {
        return Err(FrameError::RecordSizeMismatch {
            expected: schema.record_size(),
            actual: image.len(),
        });
    }
    Ok(())
}

fn put_frame<B: BufMut>(schema: &Schema, image: &[u8], dst: &mut B) {
    dst.put_u32_ne(schema.stream_id());
    dst.put_u32_ne(schema.meta_count());
    for descriptor in schema.table() {
        dst.put_slice(&descriptor.to_ne_bytes());
    }
    dst.put_slice(image);
}

/// Read the stream id of a frame without parsing the rest.
pub fn peek_stream_id(frame: &[u8]) -> Result<u32> {
    if frame.len() < 4 {
        return Err(FrameError::Truncated {
            needed: 4,
            available: frame.len(),
        });
    }
    let mut cursor = frame;
    Ok(cursor.get_u32_ne())
}

/// Borrowed, schema-independent view of an encoded frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    stream_id: u32,
    meta_count: u32,
    table: &'a [u8],
    raw: &'a [u8],
}

impl<'a> FrameView<'a> {
    /// Split a frame into header, metadata table and raw data.
    ///
    /// Everything after the table is treated as raw data.
    pub fn parse(frame: &'a [u8]) -> Result<Self> {
        if frame.len() < HEADER_SIZE {
            return Err(FrameError::Truncated {
                needed: HEADER_SIZE,
                available: frame.len(),
            });
        }

        let mut header = &frame[..HEADER_SIZE];
        let stream_id = header.get_u32_ne();
        let meta_count = header.get_u32_ne();

        let table_end = (meta_count as usize)
            .checked_mul(DESCRIPTOR_SIZE)
            .and_then(|len| len.checked_add(HEADER_SIZE))
            .unwrap_or(usize::MAX);
        if frame.len() < table_end {
            return Err(FrameError::Truncated {
                needed: table_end,
                available: frame.len(),
            });
        }

        Ok(Self {
            stream_id,
            meta_count,
            table: &frame[HEADER_SIZE..table_end],
            raw: &frame[table_end..],
        })
    }

    pub fn stream_id(&self) -> u32 {
        self.stream_id
    }

    pub fn meta_count(&self) -> u32 {
        self.meta_count
    }

    /// Incoming descriptors, in wire order.
    pub fn descriptors(&self) -> impl Iterator<Item = FieldDescriptor> + 'a {
        let table: &'a [u8] = self.table;
        table.chunks_exact(DESCRIPTOR_SIZE).map(|chunk| {
            let mut raw = [0u8; DESCRIPTOR_SIZE];
            raw.copy_from_slice(chunk);
            FieldDescriptor::from_ne_bytes(raw)
        })
    }

    /// The raw data section (the writer's record image).
    pub fn raw_data(&self) -> &'a [u8] {
        self.raw
    }

    /// Bytes a descriptor points at, if they lie inside the raw data.
    pub fn field_bytes(&self, descriptor: &FieldDescriptor) -> Option<&'a [u8]> {
        let raw: &'a [u8] = self.raw;
        raw.get(descriptor.offset as usize..descriptor.end())
    }

    /// Total frame length covered by this view.
    pub fn len(&self) -> usize {
        HEADER_SIZE + self.table.len() + self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of a successful decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeReport {
    /// Incoming fields copied into the record.
    pub matched: usize,
    /// Incoming fields with no local counterpart.
    pub skipped: usize,
    /// Matched fields whose local and incoming sizes differ.
    pub size_mismatches: usize,
}

/// Decode a frame into a record image.
///
/// Each incoming descriptor is matched to a local one by id, in the order the
/// writer sent them. Matched fields are copied from the frame's raw data at the
/// incoming offset to the record at the local offset; unknown ids are skipped.
/// Local fields that the frame does not carry keep the value `record` already
/// held, so callers wanting defaults must initialize the record first.
///
/// The frame is fully validated before the first byte of `record` is written:
/// on error the record is left unchanged.
pub fn decode_frame(
    schema: &Schema,
    frame: &[u8],
    record: &mut [u8],
    config: &DecodeConfig,
) -> Result<DecodeReport> {
    check_image(schema, record)?;

    let found = peek_stream_id(frame)?;
    if found != schema.stream_id() {
        return Err(FrameError::StreamIdMismatch {
            expected: schema.stream_id(),
            found,
        });
    }

    let view = FrameView::parse(frame)?;
    let raw = view.raw_data();
    let policy = config.size_policy;

    let mut report = DecodeReport::default();
    for incoming in view.descriptors() {
        let Some(local) = schema.find(incoming.id) else {
            report.skipped += 1;
            continue;
        };
        let len = policy.copy_len(local.size, incoming.size);
        let offset = incoming.offset as usize;
        if offset + len > raw.len() {
            return Err(FrameError::FieldOutOfBounds {
                id: incoming.id,
                offset,
                len,
                available: raw.len(),
            });
        }
        report.matched += 1;
        if local.size != incoming.size {
            report.size_mismatches += 1;
        }
    }

    for incoming in view.descriptors() {
        let Some(local) = schema.find(incoming.id) else {
            tracing::trace!(id = incoming.id, "skipping unknown field");
            continue;
        };
        if local.size != incoming.size {
            tracing::warn!(
                id = incoming.id,
                local_size = local.size,
                incoming_size = incoming.size,
                policy = ?policy,
                "field size differs between writer and reader"
            );
        }
        let len = policy.copy_len(local.size, incoming.size);
        let src = incoming.offset as usize;
        let dst = local.offset as usize;
        record[dst..dst + len].copy_from_slice(&raw[src..src + len]);
    }

    tracing::debug!(
        stream_id = schema.stream_id(),
        matched = report.matched,
        skipped = report.skipped,
        "decoded frame"
    );
    Ok(report)
}
