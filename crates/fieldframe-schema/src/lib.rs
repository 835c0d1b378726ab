//! Field schemas for fieldframe.
//!
//! A schema binds a stream id to an ordered list of fixed-size fields. Compiling
//! it drops disabled fields, lays the rest out with C struct rules and produces
//! the metadata table that every frame of the schema carries:
//! one `(id, offset, size)` descriptor per enabled field.
//!
//! Field ids, not positions, identify fields across schema versions. Removing a
//! field from a newer version shrinks the layout and the table but leaves the
//! remaining ids alone, which is what lets older and newer peers read each
//! other's frames.

pub mod config;
pub mod def;
pub mod error;
pub mod registry;
pub mod schema;
pub mod types;

pub use config::RegistryConfig;
pub use def::{FieldDef, SchemaDef};
pub use error::{Result, SchemaError};
pub use registry::{load_schema_file, SchemaRegistry};
pub use schema::{FieldLayout, Schema, SchemaBuilder};
pub use types::{FieldDescriptor, FieldSpec, FieldType, DESCRIPTOR_SIZE};
