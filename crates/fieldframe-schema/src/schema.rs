use std::collections::HashSet;

use crate::error::{Result, SchemaError};
use crate::types::{FieldDescriptor, FieldSpec, FieldType};

/// Layout information for one enabled field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: String,
    pub ty: FieldType,
    pub descriptor: FieldDescriptor,
}

impl FieldLayout {
    pub fn id(&self) -> u32 {
        self.descriptor.id
    }

    /// Byte range of the field inside the record image.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.descriptor.offset as usize..self.descriptor.end()
    }
}

/// A compiled schema: stream id, metadata table and record layout.
///
/// Schemas are immutable once built and are meant to be created once per
/// process and shared, e.g. behind a `once_cell::sync::Lazy`:
///
/// ```
/// use fieldframe_schema::{FieldType, Schema};
/// use once_cell::sync::Lazy;
///
/// static TELEMETRY: Lazy<Schema> = Lazy::new(|| {
///     Schema::builder(7)
///         .field(1, FieldType::U32, "sequence")
///         .field(2, FieldType::F64, "reading")
///         .build()
///         .expect("telemetry schema is well formed")
/// });
///
/// assert_eq!(TELEMETRY.record_size(), 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    stream_id: u32,
    fields: Vec<FieldLayout>,
    table: Vec<FieldDescriptor>,
    record_size: usize,
    align: usize,
}

impl Schema {
    /// Start declaring a schema bound to `stream_id`.
    pub fn builder(stream_id: u32) -> SchemaBuilder {
        SchemaBuilder::new(stream_id)
    }

    /// Compile a declared field list.
    ///
    /// Disabled specs are dropped entirely. Enabled fields are laid out in
    /// declaration order with C alignment rules, and the record size is padded
    /// to the largest field alignment.
    pub fn compile(stream_id: u32, specs: &[FieldSpec]) -> Result<Self> {
        let mut fields = Vec::with_capacity(specs.len());
        let mut seen_ids = HashSet::new();
        let mut seen_names = HashSet::new();
        let mut cursor = 0usize;
        let mut align = 1usize;

        for spec in specs.iter().filter(|spec| spec.enabled) {
            let size = spec.ty.size();
            if size == 0 {
                return Err(SchemaError::InvalidFieldType(format!(
                    "field '{}' has zero size",
                    spec.name
                )));
            }
            if !seen_ids.insert(spec.id) {
                return Err(SchemaError::DuplicateId {
                    id: spec.id,
                    name: spec.name.clone(),
                });
            }
            if !seen_names.insert(spec.name.as_str()) {
                return Err(SchemaError::DuplicateName(spec.name.clone()));
            }

            let field_align = spec.ty.align();
            let offset = align_up(cursor, field_align);
            let overflow = || SchemaError::LayoutOverflow {
                name: spec.name.clone(),
                offset,
                size,
            };
            let descriptor = FieldDescriptor {
                id: spec.id,
                offset: u16::try_from(offset).map_err(|_| overflow())?,
                size: u16::try_from(size).map_err(|_| overflow())?,
            };

            fields.push(FieldLayout {
                name: spec.name.clone(),
                ty: spec.ty,
                descriptor,
            });
            cursor = offset + size;
            align = align.max(field_align);
        }

        let record_size = align_up(cursor, align);
        let table = fields.iter().map(|field| field.descriptor).collect();

        tracing::debug!(
            stream_id,
            fields = fields.len(),
            record_size,
            "compiled schema"
        );

        Ok(Self {
            stream_id,
            fields,
            table,
            record_size,
            align,
        })
    }

    pub fn stream_id(&self) -> u32 {
        self.stream_id
    }

    /// The metadata table, one descriptor per enabled field, in declaration order.
    pub fn table(&self) -> &[FieldDescriptor] {
        &self.table
    }

    /// Number of descriptors written into every frame of this schema.
    pub fn meta_count(&self) -> u32 {
        // Every field occupies at least one byte below offset 65_536, so at most
        // 65_536 descriptors exist and the count always fits in u32.
        self.table.len() as u32
    }

    pub fn fields(&self) -> &[FieldLayout] {
        &self.fields
    }

    /// Size of the record image, padding included.
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Largest alignment of any field (1 for an empty schema).
    pub fn align(&self) -> usize {
        self.align
    }

    /// Find the descriptor for a field id.
    ///
    /// Linear scan over the table; the first match wins.
    pub fn find(&self, id: u32) -> Option<&FieldDescriptor> {
        self.table.iter().find(|desc| desc.id == id)
    }

    /// Find a field's layout by name.
    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Incremental declaration of a schema's field list.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    stream_id: u32,
    specs: Vec<FieldSpec>,
}

impl SchemaBuilder {
    pub fn new(stream_id: u32) -> Self {
        Self {
            stream_id,
            specs: Vec::new(),
        }
    }

    /// Declare an enabled field.
    pub fn field(mut self, id: u32, ty: FieldType, name: impl Into<String>) -> Self {
        self.specs.push(FieldSpec::enabled(id, ty, name));
        self
    }

    /// Declare a field that is compiled out of this schema version.
    pub fn disabled(mut self, id: u32, ty: FieldType, name: impl Into<String>) -> Self {
        self.specs.push(FieldSpec::disabled(id, ty, name));
        self
    }

    pub fn spec(mut self, spec: FieldSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn build(self) -> Result<Schema> {
        Schema::compile(self.stream_id, &self.specs)
    }
}

fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}
