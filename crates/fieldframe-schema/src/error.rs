/// Errors that can occur while compiling or loading schemas.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Two enabled fields share the same numeric id.
    #[error("duplicate field id {id} (field '{name}')")]
    DuplicateId { id: u32, name: String },

    /// Two enabled fields share the same name.
    #[error("duplicate field name '{0}'")]
    DuplicateName(String),

    /// A field offset or size does not fit the 16-bit descriptor slots.
    #[error("field '{name}' does not fit the descriptor layout (offset {offset}, size {size})")]
    LayoutOverflow {
        name: String,
        offset: usize,
        size: usize,
    },

    /// A field type string could not be parsed, or describes an empty field.
    #[error("invalid field type: {0}")]
    InvalidFieldType(String),

    /// A schema file could not be loaded.
    #[error("failed to load schema: {0}")]
    LoadFailed(String),

    /// The schema definition is not valid JSON.
    #[error("schema definition is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A second schema was registered under an existing stream id.
    #[error("stream id {0} is already registered")]
    DuplicateStreamId(u32),

    /// No schema registered for the given stream id.
    #[error("no schema registered for stream id {0}")]
    UnknownStreamId(u32),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
