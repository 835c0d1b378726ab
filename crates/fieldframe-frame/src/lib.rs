//! Self-describing record frames with id-based field reconciliation.
//!
//! A frame carries a record's raw memory image together with the table that
//! says where each field lives in it:
//! - a 4-byte stream id, checked by the decoder before anything else
//! - a 4-byte descriptor count
//! - one 8-byte `(id, offset, size)` descriptor per field
//! - the record image, padding included
//!
//! Decoding matches incoming descriptors to local ones by id, so a reader
//! compiled against a newer or older version of a schema still picks up every
//! field both versions share.

pub mod codec;
pub mod config;
pub mod error;
pub mod pod;
pub mod record;

pub use codec::{
    decode_frame, encode_frame, encode_frame_into, frame_size, peek_stream_id, DecodeReport,
    FrameView, HEADER_SIZE,
};
pub use config::{DecodeConfig, SizePolicy};
pub use error::{ErrorKind, FrameError, Result};
pub use pod::{decode_pod, encode_pod};
pub use record::{Record, Scalar, Value};
