//! Versioned binary record frames with self-describing field tables.
//!
//! fieldframe serializes fixed-layout records into frames that carry their own
//! field table, so readers and writers built against different versions of a
//! schema can still exchange data field by field.
//!
//! # Crate Structure
//!
//! - [`schema`]: Field types, schema compilation, metadata lookup, registry
//! - [`frame`]: Frame encoding/decoding and record images

/// Re-export schema types.
pub mod schema {
    pub use fieldframe_schema::*;
}

/// Re-export frame types.
pub mod frame {
    pub use fieldframe_frame::*;
}

pub use fieldframe_frame::{decode_frame, encode_frame, DecodeConfig, FrameError, Record};
pub use fieldframe_schema::{FieldType, Schema, SchemaError};
